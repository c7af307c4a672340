//! Authentication Handlers
//!
//! Handles registration, login and current-user lookup

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::UserCreate;
use crate::utils::{AppError, AppResult};

// Re-use shared DTOs for API consistency
use shared::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/register - 注册新账号
///
/// 返回令牌与账号信息；角色缺省为 buyer，注册后不可变更
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<LoginResponse>)> {
    let username = req.username.trim().to_string();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Username and password are required"));
    }

    let user = state
        .users()
        .create(UserCreate {
            username,
            password: req.password,
            role: req.role.unwrap_or_default(),
        })
        .await?;

    let user_info = user.to_user_info();
    let token = state
        .get_jwt_service()
        .generate_token(&user_info.id, &user_info.username, user_info.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = %user_info.id,
        username = %user_info.username,
        role = %user_info.role,
        "User registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            token,
            user: user_info,
        }),
    ))
}

/// POST /api/login - 登录
///
/// 用户不存在与密码错误返回完全一致的错误，防止用户名枚举
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = state.users().find_by_username(&req.username).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match user {
        Some(u) => {
            let password_valid = u
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                tracing::warn!(username = %req.username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let user_info = user.to_user_info();
    let token = state
        .get_jwt_service()
        .generate_token(&user_info.id, &user_info.username, user_info.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = %user_info.id,
        username = %user_info.username,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        user: user_info,
    }))
}

/// GET /api/auth/me - 当前用户信息
pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<UserInfo>> {
    let account = state
        .users()
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))?;

    Ok(Json(account.to_user_info()))
}
