//! Repository abstractions for domain entities.

use crate::domain::entity::SystemConfig;
use async_trait::async_trait;

/// Query criteria for listing records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Number of items to skip
    pub offset: i64,
    /// Maximum number of items to return
    pub limit: i64,
    /// Substring to look for in the config payload. Empty matches all.
    pub keyword: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    /// Updates need the primary key to address a row.
    #[error("missing primary key")]
    MissingId,

    /// A stored row could not be mapped back to an entity.
    #[error("invalid record {id}: {reason}")]
    InvalidRecord { id: i64, reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage operations for [`SystemConfig`].
#[async_trait]
pub trait SystemConfigRepository: Send + Sync {
    /// Persists a new record and writes the assigned id and timestamps
    /// back into `entity`.
    async fn create(&self, entity: &mut SystemConfig) -> RepositoryResult<()>;

    /// Soft-deletes the record with the given id.
    async fn delete(&self, id: i64) -> RepositoryResult<()>;

    /// Overwrites the stored record addressed by `entity.id` and writes the
    /// new `updated_at` back into `entity`.
    async fn update(&self, entity: &mut SystemConfig) -> RepositoryResult<()>;

    async fn get(&self, id: i64) -> RepositoryResult<SystemConfig>;

    async fn find(&self, query: &Query) -> RepositoryResult<Vec<SystemConfig>>;

    /// Number of live records.
    async fn count(&self) -> RepositoryResult<i64>;
}
