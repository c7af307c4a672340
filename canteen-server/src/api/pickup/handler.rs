//! Pickup API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::pickup::PickupOutcome;
use crate::utils::AppResult;

/// POST /api/pickup/scan 请求体
///
/// `payload` 是客户端从二维码图像解码出的字符串
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub payload: String,
}

/// POST /api/pickup/scan - 核销一次扫码 (卖家)
pub async fn scan(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<ScanRequest>,
) -> AppResult<Json<PickupOutcome>> {
    let outcome = state
        .pickup()
        .resolve_scanned_payload(&req.payload, &user)
        .await?;

    Ok(Json(outcome))
}
