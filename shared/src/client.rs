//! Client-facing request/response DTOs
//!
//! These types define the JSON contract between the server and the buyer /
//! seller browser views. Keep field names stable: the clients persist
//! `LoginResponse` verbatim in local storage.

use serde::{Deserialize, Serialize};

use crate::types::Role;

/// POST /api/register 请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// 缺省为 buyer
    #[serde(default)]
    pub role: Option<Role>,
}

/// POST /api/login 请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public view of an account (no credential material)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub role: Role,
    /// Unix micros
    pub created_at: i64,
}

/// Login / register response: bearer token plus the account it describes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}
