//! Row types mapping domain entities onto database tables.

use crate::domain::{
    entity::{Env, SystemConfig},
    repository::RepositoryError,
};
use chrono::{DateTime, Utc};

/// A row of the `system_config` table.
///
/// Rows are soft-deleted: `deleted_at` is set instead of removing the row,
/// and every read filters on `deleted_at IS NULL`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SystemConfigModel {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub tenant: String,
    /// Stored as text; parsed back into [`Env`]
    pub env: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub config: String,
    pub description: String,
    pub creator: String,
    pub modifier: String,
}

impl SystemConfigModel {
    /// Converts the row into an entity.
    ///
    /// Fails when the stored environment is not one the domain knows.
    pub fn into_entity(self) -> Result<SystemConfig, RepositoryError> {
        let env = self
            .env
            .parse::<Env>()
            .map_err(|e| RepositoryError::InvalidRecord {
                id: self.id,
                reason: format!("failed to parse env: {e}"),
            })?;

        Ok(SystemConfig {
            id: self.id,
            tenant: self.tenant,
            env,
            kind: self.kind,
            config: self.config,
            description: self.description,
            creator: self.creator,
            modifier: self.modifier,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<&SystemConfig> for SystemConfigModel {
    fn from(entity: &SystemConfig) -> Self {
        Self {
            id: entity.id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: None,
            tenant: entity.tenant.clone(),
            env: entity.env.to_string(),
            kind: entity.kind.clone(),
            config: entity.config.clone(),
            description: entity.description.clone(),
            creator: entity.creator.clone(),
            modifier: entity.modifier.clone(),
        }
    }
}
