//! 取餐核销并发与边界测试
//!
//! 核销属性：同一个 pending 订单被 N 个并发扫码命中时，
//! 恰好一个 NewlyServed，其余 AlreadyServed，绝不重复生效。

use std::str::FromStr;

use canteen_server::auth::CurrentUser;
use canteen_server::db::models::{OrderCreate, OrderItem, OrderStatus, UserCreate};
use canteen_server::pickup::PickupOutcome;
use canteen_server::utils::AppError;
use canteen_server::{Config, ServerState};
use futures::future::join_all;
use rust_decimal::Decimal;
use shared::Role;
use tempfile::TempDir;

const CONCURRENT_SCANS: usize = 8;

async fn test_state() -> (ServerState, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    let state = ServerState::initialize(&config)
        .await
        .expect("Failed to initialize state");
    (state, dir)
}

async fn register(state: &ServerState, username: &str, role: Role) -> CurrentUser {
    let user = state
        .users()
        .create(UserCreate {
            username: username.to_string(),
            password: "pw123456".to_string(),
            role,
        })
        .await
        .expect("Failed to create user");

    CurrentUser {
        id: user.id.as_ref().expect("user id").to_string(),
        username: user.username.clone(),
        role,
    }
}

/// 建一个 pending 订单，返回其 "orders:xxx" id
async fn pending_order(state: &ServerState, buyer: &CurrentUser) -> String {
    let order = state
        .orders()
        .create(
            buyer.id.parse().unwrap(),
            OrderCreate {
                items: vec![OrderItem {
                    name: "Tea".to_string(),
                    product: None,
                    quantity: 2,
                    price: Decimal::from_str("1.5").unwrap(),
                }],
                total: Decimal::from_str("3.0").unwrap(),
            },
        )
        .await
        .expect("order created");
    order.id.as_ref().unwrap().to_string()
}

#[tokio::test]
async fn test_concurrent_scans_yield_single_newly_served() {
    let (state, _dir) = test_state().await;
    let buyer = register(&state, "alice", Role::Buyer).await;
    let seller = register(&state, "owner1", Role::Seller).await;
    let order_id = pending_order(&state, &buyer).await;

    let tasks: Vec<_> = (0..CONCURRENT_SCANS)
        .map(|_| {
            let pickup = state.pickup();
            let seller = seller.clone();
            let order_id = order_id.clone();
            tokio::spawn(async move { pickup.resolve_scanned_payload(&order_id, &seller).await })
        })
        .collect();

    let mut newly_served = 0;
    let mut already_served = 0;
    for result in join_all(tasks).await {
        match result.expect("task panicked").expect("scan resolves") {
            PickupOutcome::NewlyServed { .. } => newly_served += 1,
            PickupOutcome::AlreadyServed { .. } => already_served += 1,
            PickupOutcome::Rejected { .. } => panic!("pending order must not be rejected"),
        }
    }

    assert_eq!(newly_served, 1);
    assert_eq!(already_served, CONCURRENT_SCANS - 1);

    // 账本侧恰好生效一次
    let stored = state
        .orders()
        .find_by_id(&order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, OrderStatus::Completed);
}

#[tokio::test]
async fn test_second_scan_is_already_served() {
    let (state, _dir) = test_state().await;
    let buyer = register(&state, "alice", Role::Buyer).await;
    let seller = register(&state, "owner1", Role::Seller).await;
    let order_id = pending_order(&state, &buyer).await;

    let first = state
        .pickup()
        .resolve_scanned_payload(&order_id, &seller)
        .await
        .unwrap();
    assert!(matches!(first, PickupOutcome::NewlyServed { .. }));

    let second = state
        .pickup()
        .resolve_scanned_payload(&order_id, &seller)
        .await
        .unwrap();
    assert!(matches!(second, PickupOutcome::AlreadyServed { .. }));
}

#[tokio::test]
async fn test_scan_by_other_seller_sees_ledger_state() {
    let (state, _dir) = test_state().await;
    let buyer = register(&state, "alice", Role::Buyer).await;
    let seller_a = register(&state, "owner1", Role::Seller).await;
    let seller_b = register(&state, "owner2", Role::Seller).await;
    let order_id = pending_order(&state, &buyer).await;

    let first = state
        .pickup()
        .resolve_scanned_payload(&order_id, &seller_a)
        .await
        .unwrap();
    assert!(matches!(first, PickupOutcome::NewlyServed { .. }));

    // seller B 的会话缓存没有这单，但账本状态兜底
    let second = state
        .pickup()
        .resolve_scanned_payload(&order_id, &seller_b)
        .await
        .unwrap();
    assert!(matches!(second, PickupOutcome::AlreadyServed { .. }));
}

#[tokio::test]
async fn test_cancelled_order_is_rejected() {
    let (state, _dir) = test_state().await;
    let buyer = register(&state, "alice", Role::Buyer).await;
    let seller = register(&state, "owner1", Role::Seller).await;
    let order_id = pending_order(&state, &buyer).await;

    let cancelled = state
        .orders()
        .transition_if(
            &order_id.parse().unwrap(),
            OrderStatus::Pending,
            OrderStatus::Cancelled,
        )
        .await
        .unwrap();
    assert!(cancelled.is_some());

    let outcome = state
        .pickup()
        .resolve_scanned_payload(&order_id, &seller)
        .await
        .unwrap();
    match outcome {
        PickupOutcome::Rejected { status, .. } => assert_eq!(status, OrderStatus::Cancelled),
        other => panic!("expected rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let (state, _dir) = test_state().await;
    register(&state, "alice", Role::Buyer).await;
    let seller = register(&state, "owner1", Role::Seller).await;

    let result = state
        .pickup()
        .resolve_scanned_payload("orders:doesnotexist", &seller)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_buyer_cannot_scan() {
    let (state, _dir) = test_state().await;
    let buyer = register(&state, "alice", Role::Buyer).await;
    let order_id = pending_order(&state, &buyer).await;

    let result = state
        .pickup()
        .resolve_scanned_payload(&order_id, &buyer)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    // 订单保持 pending，没有副作用
    let stored = state
        .orders()
        .find_by_id(&order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_malformed_payload_is_rejected() {
    let (state, _dir) = test_state().await;
    register(&state, "alice", Role::Buyer).await;
    let seller = register(&state, "owner1", Role::Seller).await;

    for payload in ["", "   ", "orders:", "not a key!"] {
        let result = state
            .pickup()
            .resolve_scanned_payload(payload, &seller)
            .await;
        assert!(
            matches!(result, Err(AppError::Validation(_))),
            "payload {:?} must be rejected",
            payload
        );
    }
}
