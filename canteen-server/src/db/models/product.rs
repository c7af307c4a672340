//! Product Model

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type ProductId = RecordId;

/// Fallback display image, same placeholder the clients expect
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

/// Product model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<ProductId>,
    pub name: String,
    /// Unit price, non-negative
    pub price: Decimal,
    #[serde(default = "default_image")]
    pub image: String,
    /// Record link to the owning seller; None for seeded catalog entries
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub seller: Option<RecordId>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_image() -> String {
    PLACEHOLDER_IMAGE.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub is_available: Option<bool>,
}
