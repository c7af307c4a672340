//! Shared types for the canteen ordering system
//!
//! Wire-level DTOs and enums used by the server and its clients:
//!
//! - [`client`]: request/response payloads for the HTTP API
//! - [`types`]: the [`Role`] enum and related helpers

pub mod client;
pub mod types;

pub use client::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};
pub use types::{InvalidRole, Role};
