//! Repository Module
//!
//! Provides CRUD operations over the embedded SurrealDB tables.
//! Every store call runs under a bounded timeout; an elapsed deadline
//! surfaces as the retryable [`RepoError::Unavailable`].

// Identity
pub mod user;

// Catalog
pub mod product;

// Orders
pub mod order;

// Re-exports
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

use std::future::IntoFuture;
use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::utils::AppError;

/// Default bound for a single store call
pub const DEFAULT_OP_TIMEOUT_MS: u64 = 5000;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Unavailable(msg) => AppError::Unavailable(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference and per-call deadline
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
    op_timeout: Duration,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self::with_timeout(db, Duration::from_millis(DEFAULT_OP_TIMEOUT_MS))
    }

    pub fn with_timeout(db: Surreal<Db>, op_timeout: Duration) -> Self {
        Self { db, op_timeout }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Run a store call under the configured deadline
    pub async fn run<T, F>(&self, op: F) -> RepoResult<T>
    where
        F: IntoFuture<Output = Result<T, surrealdb::Error>>,
    {
        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(result) => result.map_err(RepoError::from),
            Err(_) => Err(RepoError::Unavailable(format!(
                "store call exceeded {}ms",
                self.op_timeout.as_millis()
            ))),
        }
    }
}
