//! 订单全流程测试
//!
//! 使用 ServerState::initialize 完整初始化，直接驱动仓库与核销服务，
//! 覆盖：注册/登录、下单校验、角色可见范围、终态保护。

use std::str::FromStr;

use canteen_server::auth::CurrentUser;
use canteen_server::db::models::{OrderCreate, OrderItem, OrderStatus, UserCreate};
use canteen_server::db::repository::RepoError;
use canteen_server::pickup::PickupOutcome;
use canteen_server::{Config, ServerState};
use rust_decimal::Decimal;
use shared::Role;
use tempfile::TempDir;

/// 每个测试独立的临时工作目录与状态
async fn test_state() -> (ServerState, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    let state = ServerState::initialize(&config)
        .await
        .expect("Failed to initialize state");
    (state, dir)
}

/// 通过仓库注册账号，返回等价于令牌解析结果的用户上下文
async fn register(state: &ServerState, username: &str, password: &str, role: Role) -> CurrentUser {
    let user = state
        .users()
        .create(UserCreate {
            username: username.to_string(),
            password: password.to_string(),
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

fn item(name: &str, quantity: u32, price: &str) -> OrderItem {
    OrderItem {
        name: name.to_string(),
        product: None,
        quantity,
        price: Decimal::from_str(price).expect("decimal"),
    }
}

fn order_payload(items: Vec<OrderItem>, total: &str) -> OrderCreate {
    OrderCreate {
        items,
        total: Decimal::from_str(total).expect("decimal"),
    }
}

#[tokio::test]
async fn test_end_to_end_pickup_scenario() {
    let (state, _dir) = test_state().await;

    // register buyer "alice"/"secret1"
    let alice = register(&state, "alice", "secret1", Role::Buyer).await;
    let seller = register(&state, "owner1", "owner123", Role::Seller).await;

    // login: credential verify + token round trip
    let account = state
        .users()
        .find_by_username("alice")
        .await
        .unwrap()
        .expect("alice exists");
    assert!(account.verify_password("secret1").unwrap());
    assert!(!account.verify_password("secret2").unwrap());

    let jwt = state.get_jwt_service();
    let token = jwt
        .generate_token(&alice.id, &alice.username, alice.role)
        .unwrap();
    let claims = jwt.validate_token(&token).unwrap();
    let from_token = CurrentUser::try_from(claims).unwrap();
    assert_eq!(from_token.id, alice.id);
    assert_eq!(from_token.role, Role::Buyer);

    // order Tea x2 @ 1.5 -> total 3.0, pending
    let buyer_id = alice.id.parse().unwrap();
    let order = state
        .orders()
        .create(buyer_id, order_payload(vec![item("Tea", 2, "1.5")], "3.0"))
        .await
        .expect("order created");

    assert_eq!(order.total, Decimal::from_str("3.0").unwrap());
    assert_eq!(order.status, OrderStatus::Pending);
    let order_id = order.id.as_ref().unwrap().to_string();

    // seller scans the rendered order id
    let outcome = state
        .pickup()
        .resolve_scanned_payload(&order_id, &seller)
        .await
        .expect("scan resolves");
    match outcome {
        PickupOutcome::NewlyServed { order } => {
            assert_eq!(order.status, OrderStatus::Completed);
        }
        other => panic!("expected newly served, got {:?}", other),
    }

    // buyer's order list shows status completed
    let buyer_id = alice.id.parse().unwrap();
    let orders = state.orders().find_for_buyer(&buyer_id).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Completed);
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let (state, _dir) = test_state().await;

    register(&state, "alice", "secret1", Role::Buyer).await;

    let result = state
        .users()
        .create(UserCreate {
            username: "alice".to_string(),
            password: "other".to_string(),
            role: Role::Seller,
        })
        .await;

    assert!(matches!(result, Err(RepoError::Duplicate(_))));
}

#[tokio::test]
async fn test_order_validation_rejects_bad_input() {
    let (state, _dir) = test_state().await;
    let alice = register(&state, "alice", "secret1", Role::Buyer).await;
    let buyer_id: surrealdb::RecordId = alice.id.parse().unwrap();

    // empty items
    let result = state
        .orders()
        .create(buyer_id.clone(), order_payload(vec![], "0"))
        .await;
    assert!(matches!(result, Err(RepoError::Validation(_))));

    // zero quantity
    let result = state
        .orders()
        .create(
            buyer_id.clone(),
            order_payload(vec![item("Tea", 0, "1.5")], "0"),
        )
        .await;
    assert!(matches!(result, Err(RepoError::Validation(_))));

    // negative price
    let result = state
        .orders()
        .create(
            buyer_id.clone(),
            order_payload(vec![item("Tea", 1, "-1.5")], "-1.5"),
        )
        .await;
    assert!(matches!(result, Err(RepoError::Validation(_))));

    // mismatched total is rejected, not silently recomputed
    let result = state
        .orders()
        .create(buyer_id, order_payload(vec![item("Tea", 2, "1.5")], "2.5"))
        .await;
    assert!(matches!(result, Err(RepoError::Validation(_))));
}

#[tokio::test]
async fn test_stored_total_matches_item_sum() {
    let (state, _dir) = test_state().await;
    let alice = register(&state, "alice", "secret1", Role::Buyer).await;
    let buyer_id = alice.id.parse().unwrap();

    let order = state
        .orders()
        .create(
            buyer_id,
            order_payload(
                vec![item("Tea", 2, "1.5"), item("Rice", 3, "0.8"), item("Soup", 1, "2.25")],
                "7.65",
            ),
        )
        .await
        .expect("order created");

    assert_eq!(order.total, Decimal::from_str("7.65").unwrap());
}

#[tokio::test]
async fn test_buyers_only_see_their_own_orders() {
    let (state, _dir) = test_state().await;
    let alice = register(&state, "alice", "secret1", Role::Buyer).await;
    let bob = register(&state, "bob", "secret2", Role::Buyer).await;

    let alice_id: surrealdb::RecordId = alice.id.parse().unwrap();
    let bob_id: surrealdb::RecordId = bob.id.parse().unwrap();

    state
        .orders()
        .create(
            alice_id.clone(),
            order_payload(vec![item("Tea", 1, "1.5")], "1.5"),
        )
        .await
        .unwrap();
    state
        .orders()
        .create(
            bob_id.clone(),
            order_payload(vec![item("Rice", 1, "0.8")], "0.8"),
        )
        .await
        .unwrap();

    let alice_orders = state.orders().find_for_buyer(&alice_id).await.unwrap();
    assert_eq!(alice_orders.len(), 1);
    assert_eq!(alice_orders[0].items[0].name, "Tea");

    let bob_orders = state.orders().find_for_buyer(&bob_id).await.unwrap();
    assert_eq!(bob_orders.len(), 1);
    assert_eq!(bob_orders[0].items[0].name, "Rice");

    // seller view spans everything
    let all = state.orders().find_all().await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_orders_listed_newest_first() {
    let (state, _dir) = test_state().await;
    let alice = register(&state, "alice", "secret1", Role::Buyer).await;
    let buyer_id: surrealdb::RecordId = alice.id.parse().unwrap();

    for name in ["First", "Second", "Third"] {
        state
            .orders()
            .create(
                buyer_id.clone(),
                order_payload(vec![item(name, 1, "1")], "1"),
            )
            .await
            .unwrap();
    }

    let orders = state.orders().find_for_buyer(&buyer_id).await.unwrap();
    assert_eq!(orders.len(), 3);
    assert_eq!(orders[0].items[0].name, "Third");
    assert_eq!(orders[2].items[0].name, "First");
    assert!(orders[0].created_at >= orders[1].created_at);
    assert!(orders[1].created_at >= orders[2].created_at);
}

#[tokio::test]
async fn test_terminal_orders_reject_further_transitions() {
    let (state, _dir) = test_state().await;
    let alice = register(&state, "alice", "secret1", Role::Buyer).await;
    let buyer_id = alice.id.parse().unwrap();

    let order = state
        .orders()
        .create(buyer_id, order_payload(vec![item("Tea", 1, "1.5")], "1.5"))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap();

    // pending -> completed succeeds
    let updated = state
        .orders()
        .transition_if(order_id, OrderStatus::Pending, OrderStatus::Completed)
        .await
        .unwrap();
    assert!(updated.is_some());

    // completed is terminal: the conditional update must not match
    let second = state
        .orders()
        .transition_if(order_id, OrderStatus::Pending, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert!(second.is_none());

    let stored = state
        .orders()
        .find_by_record_id(order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, OrderStatus::Completed);
}
