pub mod cat_repository;
pub mod manager;
pub mod memory;
pub mod user_repository;

pub use manager::{DatabaseError, DatabaseManager, PgStore};
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Cat, PostCat, PostUser, PutCat, PutUser, User};

/// Errors surfaced by a store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    /// Unique violations become conflicts; everything else stays opaque
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict("value already in use".to_string())
            }
            _ => StoreError::Sqlx(err),
        }
    }
}

/// Persistence operations for cats.
///
/// `insert` answers `None` when no row was written. `update` and `delete`
/// answer the number of affected rows. `list` and `get_by_id` resolve the
/// owner to a user projection; `get_by_owner` keeps the bare owner id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Cat>, StoreError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Cat>, StoreError>;
    async fn get_by_owner(&self, owner_id: i64) -> Result<Vec<Cat>, StoreError>;
    async fn insert(&self, cat: &PostCat) -> Result<Option<i64>, StoreError>;
    async fn update(&self, id: i64, changes: &PutCat) -> Result<u64, StoreError>;
    async fn delete(&self, id: i64) -> Result<u64, StoreError>;
}

/// Persistence operations for users. Same result conventions as [`CatStore`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: &PostUser) -> Result<Option<i64>, StoreError>;
    async fn update(&self, id: i64, changes: &PutUser) -> Result<u64, StoreError>;
    async fn delete(&self, id: i64) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;
}
