//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册、登录、当前用户
//! - [`products`] - 商品目录接口
//! - [`orders`] - 订单账本接口
//! - [`pickup`] - 取餐核销接口

pub mod auth;
pub mod health;
pub mod orders;
pub mod pickup;
pub mod products;

use axum::{Router, middleware};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

/// 组装完整路由
///
/// 认证中间件覆盖所有 `/api/` 路由 (注册/登录除外)；
/// CORS 放最外层，浏览器客户端跨域访问。
pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(pickup::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
