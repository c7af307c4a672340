//! Database Models

// Serde helpers
pub mod serde_helpers;

// Identity
pub mod user;

// Catalog
pub mod product;

// Orders
pub mod order;

// Re-exports
pub use order::{Order, OrderCreate, OrderId, OrderItem, OrderStatus};
pub use product::{PLACEHOLDER_IMAGE, Product, ProductCreate, ProductId, ProductUpdate};
pub use user::{User, UserCreate, UserId};
