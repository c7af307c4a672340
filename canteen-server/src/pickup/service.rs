//! Pickup resolution service

use std::sync::Arc;

use serde::Serialize;
use surrealdb::RecordId;

use super::ScanCache;
use crate::auth::{Action, CurrentUser, Resource, authorize};
use crate::db::models::{Order, OrderId, OrderStatus};
use crate::db::repository::OrderRepository;
use crate::db::repository::order::ORDER_TABLE;
use crate::utils::{AppError, AppResult};

/// Outcome of resolving one scanned payload
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PickupOutcome {
    /// This scan completed the order; details for the serving screen
    NewlyServed { order: Order },
    /// The order was already completed (this session or via the ledger)
    AlreadyServed { order_id: String },
    /// The order cannot be served (cancelled)
    Rejected { order_id: String, status: OrderStatus },
}

/// Parse a scanned payload into an order id
///
/// 接受 "orders:xxx" 或裸 key 两种形式
pub fn parse_payload(payload: &str) -> AppResult<OrderId> {
    let trimmed = payload.trim();
    let key = trimmed.strip_prefix("orders:").unwrap_or(trimmed);
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::validation("Invalid QR payload"));
    }
    Ok(RecordId::from_table_key(ORDER_TABLE, key))
}

/// Resolves scanned QR payloads against the order ledger
#[derive(Clone)]
pub struct PickupService {
    orders: OrderRepository,
    cache: Arc<ScanCache>,
}

impl PickupService {
    pub fn new(orders: OrderRepository, cache: Arc<ScanCache>) -> Self {
        Self { orders, cache }
    }

    /// Resolve one scanned payload for the given seller
    ///
    /// 流程：解析载荷 → 会话内去重 → CAS 流转 `pending → completed`。
    /// CAS 落空时回读账本区分 404 / 已完成 / 已取消。
    pub async fn resolve_scanned_payload(
        &self,
        payload: &str,
        seller: &CurrentUser,
    ) -> AppResult<PickupOutcome> {
        authorize(seller, Resource::Pickup, Action::Transition)?;

        let order_id = parse_payload(payload)?;
        let order_key = order_id.to_string();

        // Session-scoped dedup, no ledger round trip
        if self.cache.contains(&seller.id, &order_key) {
            return Ok(PickupOutcome::AlreadyServed { order_id: order_key });
        }

        match self
            .orders
            .transition_if(&order_id, OrderStatus::Pending, OrderStatus::Completed)
            .await?
        {
            Some(order) => {
                self.cache.mark(&seller.id, &order_key);
                tracing::info!(
                    order_id = %order_key,
                    seller = %seller.username,
                    "Order served at pickup"
                );
                Ok(PickupOutcome::NewlyServed { order })
            }
            None => match self.orders.find_by_record_id(&order_id).await? {
                None => Err(AppError::not_found(format!("Order {} not found", order_key))),
                Some(order) => match order.status {
                    OrderStatus::Completed => {
                        // Completed by an earlier scan or another seller
                        self.cache.mark(&seller.id, &order_key);
                        Ok(PickupOutcome::AlreadyServed { order_id: order_key })
                    }
                    OrderStatus::Cancelled => Ok(PickupOutcome::Rejected {
                        order_id: order_key,
                        status: order.status,
                    }),
                    // Transitions are monotonic: a CAS miss means the stored
                    // status was no longer pending
                    OrderStatus::Pending => Err(AppError::internal(format!(
                        "order {} reverted to pending",
                        order_key
                    ))),
                },
            },
        }
    }
}
