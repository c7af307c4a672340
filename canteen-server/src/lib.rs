//! Canteen Server - 食堂订餐系统服务端
//!
//! # 架构概述
//!
//! 提供以下核心功能：
//!
//! - **认证** (`auth`): JWT + Argon2 认证体系，统一授权策略
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **订单账本** (`db::repository::order`): 订单状态机与条件更新
//! - **取餐核销** (`pickup`): 扫码去重 + 一次性状态流转
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! canteen-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、授权策略
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (models + repository)
//! ├── pickup/        # 取餐核销流程
//! └── utils/         # 错误类型、日志
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod pickup;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use pickup::{PickupOutcome, PickupService, ScanCache};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv, 日志)
pub fn setup_environment() {
    dotenv::dotenv().ok();
    init_logger();
}

pub fn print_banner() {
    println!(
        r#"
   ______            __
  / ____/___ _____  / /____  ___  ____
 / /   / __ `/ __ \/ __/ _ \/ _ \/ __ \
/ /___/ /_/ / / / / /_/  __/  __/ / / /
\____/\__,_/_/ /_/\__/\___/\___/_/ /_/
    "#
    );
}
