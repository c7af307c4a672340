//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use surrealdb::RecordId;

use crate::auth::{Action, CurrentUser, Resource, authorize};
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::utils::{AppError, AppResult};

/// 解析商品归属，转成策略可比较的 "user:xxx" 形式
fn owner_of(product: &Product) -> Option<String> {
    product.seller.as_ref().map(|s| s.to_string())
}

/// GET /api/products - 获取商品列表
///
/// 买家只看到上架商品，卖家看到完整目录
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    authorize(&user, Resource::Catalog { owner: None }, Action::Read)?;

    let repo = state.products();
    let products = if user.is_seller() {
        repo.find_all().await?
    } else {
        repo.find_available().await?
    };

    Ok(Json(products))
}

/// GET /api/products/{id} - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    authorize(&user, Resource::Catalog { owner: None }, Action::Read)?;

    let product = state
        .products()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品 (卖家)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<Product>)> {
    authorize(&user, Resource::Catalog { owner: None }, Action::Create)?;

    let seller: RecordId = user
        .id
        .parse()
        .map_err(|_| AppError::internal(format!("Malformed user id in token: {}", user.id)))?;

    let product = state.products().create(seller, payload).await?;

    tracing::info!(
        product = ?product.id,
        seller = %user.username,
        "Product created"
    );

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id} - 更新商品 (归属卖家)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let repo = state.products();
    let existing = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;

    let owner = owner_of(&existing);
    authorize(
        &user,
        Resource::Catalog {
            owner: owner.as_deref(),
        },
        Action::Update,
    )?;

    let product = repo.update(&id, payload).await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} - 删除商品 (归属卖家，硬删除)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = state.products();
    let existing = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;

    let owner = owner_of(&existing);
    authorize(
        &user,
        Resource::Catalog {
            owner: owner.as_deref(),
        },
        Action::Delete,
    )?;

    repo.delete(&id).await?;

    tracing::info!(product_id = %id, seller = %user.username, "Product deleted");

    Ok(Json(true))
}
