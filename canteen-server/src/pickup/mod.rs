//! Pickup Verification Flow
//!
//! 取餐核销：买家设备把订单 ID 渲染成二维码，卖家扫码后把解码出的
//! 字符串提交到服务端，服务端完成 `pending → completed` 的一次性流转。
//!
//! 图像解码发生在客户端（外部协作方），服务端只消费解码后的字符串。
//!
//! # 安全性说明
//!
//! 二维码载荷就是订单主键本身，没有另发不可猜测的取餐凭证。能拿到
//! 订单 ID 的人（猜测、截获）就能触发核销。是否改发独立凭证需要
//! 产品侧确认，这里保持与现有客户端的契约一致。

pub mod scan_cache;
pub mod service;

pub use scan_cache::ScanCache;
pub use service::{PickupOutcome, PickupService};
