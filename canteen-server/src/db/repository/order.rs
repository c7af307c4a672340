//! Order Repository
//!
//! The ledger for the order state machine. Status changes go through a
//! conditional update on the stored status, so concurrent transitions on
//! one order linearize inside the store: exactly one caller wins.

use std::time::Duration;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, OrderCreate, OrderId, OrderStatus};
use rust_decimal::Decimal;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

pub const ORDER_TABLE: &str = "orders";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn with_timeout(db: Surreal<Db>, op_timeout: Duration) -> Self {
        Self {
            base: BaseRepository::with_timeout(db, op_timeout),
        }
    }

    /// Create a pending order bound to the given buyer
    ///
    /// 条目、数量、单价先校验，总价服务端重算；重算结果与客户端声明
    /// 不一致时拒绝，订单永远不会带着错误的总价落库。
    pub async fn create(&self, buyer: RecordId, data: OrderCreate) -> RepoResult<Order> {
        if data.items.is_empty() {
            return Err(RepoError::Validation("items cannot be empty".into()));
        }
        for item in &data.items {
            if item.name.trim().is_empty() {
                return Err(RepoError::Validation("item name cannot be empty".into()));
            }
            if item.quantity < 1 {
                return Err(RepoError::Validation(
                    "item quantity must be at least 1".into(),
                ));
            }
            if item.price < Decimal::ZERO {
                return Err(RepoError::Validation(
                    "item price cannot be negative".into(),
                ));
            }
        }

        let total = Order::compute_total(&data.items);
        if total != data.total {
            return Err(RepoError::Validation(format!(
                "total {} does not match item sum {}",
                data.total, total
            )));
        }

        let items = data.items;
        let created_at = chrono::Utc::now().timestamp_micros();

        // buyer 以原生记录链接落库，列表查询按链接过滤
        let created: Option<Order> = self
            .base
            .run(async {
                self.base
                    .db()
                    .query(
                        r#"CREATE orders SET
                            buyer = $buyer,
                            items = $items,
                            total = $total,
                            status = $status,
                            created_at = $created_at
                        RETURN AFTER"#,
                    )
                    .bind(("buyer", buyer))
                    .bind(("items", items))
                    .bind(("total", total))
                    .bind(("status", OrderStatus::Pending))
                    .bind(("created_at", created_at))
                    .await?
                    .take(0)
            })
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by record id
    pub async fn find_by_record_id(&self, id: &OrderId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.run(self.base.db().select(id.clone())).await?;
        Ok(order)
    }

    /// Find order by "orders:id" string
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        self.find_by_record_id(&thing).await
    }

    /// All orders, newest first (seller view)
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .run(async {
                self.base
                    .db()
                    .query("SELECT * FROM orders ORDER BY created_at DESC, id ASC")
                    .await?
                    .take(0)
            })
            .await?;
        Ok(orders)
    }

    /// Orders owned by one buyer, newest first
    pub async fn find_for_buyer(&self, buyer: &RecordId) -> RepoResult<Vec<Order>> {
        let buyer = buyer.clone();
        let orders: Vec<Order> = self
            .base
            .run(async {
                self.base
                    .db()
                    .query(
                        "SELECT * FROM orders WHERE buyer = $buyer ORDER BY created_at DESC, id ASC",
                    )
                    .bind(("buyer", buyer))
                    .await?
                    .take(0)
            })
            .await?;
        Ok(orders)
    }

    /// Compare-and-swap status transition
    ///
    /// Applies `current → next` as a single conditional update. Returns the
    /// updated order, or `None` when the stored status no longer matches
    /// `current` (the caller lost the race or the order is already terminal).
    pub async fn transition_if(
        &self,
        id: &OrderId,
        current: OrderStatus,
        next: OrderStatus,
    ) -> RepoResult<Option<Order>> {
        // 嵌入引擎用乐观事务，写冲突时整条语句失败；
        // 重试后仍由状态条件裁决，结果语义不变
        const MAX_RETRIES: usize = 3;
        let mut attempt = 0;
        loop {
            match self.try_transition(id, current, next).await {
                Err(RepoError::Database(msg))
                    if attempt < MAX_RETRIES && msg.contains("conflict") =>
                {
                    attempt += 1;
                    tracing::debug!(
                        order = %id,
                        attempt,
                        "Transition retried after write conflict"
                    );
                }
                other => return other,
            }
        }
    }

    async fn try_transition(
        &self,
        id: &OrderId,
        current: OrderStatus,
        next: OrderStatus,
    ) -> RepoResult<Option<Order>> {
        let id = id.clone();
        let updated: Vec<Order> = self
            .base
            .run(async {
                self.base
                    .db()
                    .query(
                        "UPDATE orders SET status = $next WHERE id = $id AND status = $current RETURN AFTER",
                    )
                    .bind(("id", id))
                    .bind(("current", current))
                    .bind(("next", next))
                    .await?
                    .take(0)
            })
            .await?;
        Ok(updated.into_iter().next())
    }
}
