//! Order Model
//!
//! 订单状态机：`pending` 为初始态，`completed` / `cancelled` 为终态。
//! 条目和总价创建后不可变，只有 status 字段可以流转，订单不支持删除。

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type OrderId = RecordId;

/// Order status
///
/// Wire format is lowercase, matching what the buyer/seller views expect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states admit no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Valid transitions: pending → completed | cancelled
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(self, OrderStatus::Pending) && next != OrderStatus::Pending
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// Embedded order line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Denormalized product name, kept as ordered even if the catalog changes
    pub name: String,
    /// Optional reference back to the catalog entry
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub product: Option<RecordId>,
    pub quantity: u32,
    /// Unit price at order time
    pub price: Decimal,
}

impl OrderItem {
    /// quantity × unit price
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<OrderId>,
    /// Record link to the owning buyer
    #[serde(with = "serde_helpers::record_id")]
    pub buyer: RecordId,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    /// Unix micros
    pub created_at: i64,
    /// The rendered QR payload is the order id itself; no separate token is
    /// minted, so this stays empty (kept for schema compatibility)
    #[serde(default)]
    pub qr_payload: Option<String>,
}

impl Order {
    /// Sum of line extensions, computed in decimal arithmetic
    pub fn compute_total(items: &[OrderItem]) -> Decimal {
        items.iter().map(OrderItem::line_total).sum()
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub items: Vec<OrderItem>,
    /// Client-claimed total; the server recomputes and rejects a mismatch
    pub total: Decimal,
}
