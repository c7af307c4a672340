//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use surrealdb::RecordId;

use crate::auth::{Action, CurrentUser, Resource, authorize};
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderStatus};
use crate::utils::{AppError, AppResult};

fn buyer_record(user: &CurrentUser) -> AppResult<RecordId> {
    user.id
        .parse()
        .map_err(|_| AppError::internal(format!("Malformed user id in token: {}", user.id)))
}

/// POST /api/orders - 创建订单 (买家)
///
/// 总价服务端重算，不一致直接拒绝
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    authorize(&user, Resource::Ledger { buyer: &user.id }, Action::Create)?;

    let buyer = buyer_record(&user)?;
    let order = state.orders().create(buyer, payload).await?;

    tracing::info!(
        order = ?order.id,
        buyer = %user.username,
        total = %order.total,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders - 订单列表 (按角色划分可见范围，新单在前)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let repo = state.orders();
    let orders = if user.is_seller() {
        repo.find_all().await?
    } else {
        let buyer = buyer_record(&user)?;
        repo.find_for_buyer(&buyer).await?
    };

    Ok(Json(orders))
}

/// GET /api/orders/{id} - 获取单个订单
///
/// 买家只能读自己的订单；卖家可读任意订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

    let buyer = order.buyer.to_string();
    authorize(&user, Resource::Ledger { buyer: &buyer }, Action::Read)?;

    Ok(Json(order))
}

/// PATCH /api/orders/{id} 请求体
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: String,
}

/// PATCH /api/orders/{id} - 状态流转 (卖家)
///
/// 终态订单拒绝再次流转，不做静默覆盖。条件更新保证并发下
/// 只有一个调用方成功。
pub async fn transition(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<TransitionRequest>,
) -> AppResult<Json<Order>> {
    let next: OrderStatus = payload
        .status
        .parse()
        .map_err(|e: String| AppError::validation(e))?;
    if next == OrderStatus::Pending {
        return Err(AppError::validation(
            "orders cannot transition back to pending",
        ));
    }

    // 流转只看角色，不看归属：扫码的卖家并不拥有订单
    authorize(&user, Resource::Ledger { buyer: "" }, Action::Transition)?;

    let repo = state.orders();
    let order_id: RecordId = id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid order ID format: {}", id)))?;

    match repo
        .transition_if(&order_id, OrderStatus::Pending, next)
        .await?
    {
        Some(order) => {
            tracing::info!(
                order_id = %id,
                status = %next,
                seller = %user.username,
                "Order status updated"
            );
            Ok(Json(order))
        }
        // CAS 落空：回读区分 404 与终态冲突
        None => match repo.find_by_record_id(&order_id).await? {
            None => Err(AppError::not_found(format!("Order {} not found", id))),
            Some(order) => Err(AppError::invalid_transition(format!(
                "Order {} is already {}",
                id, order.status
            ))),
        },
    }
}
