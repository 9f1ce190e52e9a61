//! Domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Configuration of a system, as seen by the rest of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    /// Unique ID, assigned by the store. Zero until persisted.
    pub id: i64,

    /// Tenant or organization that the system belongs to
    pub tenant: String,

    /// Environment where the system is deployed
    pub env: Env,

    /// Type or category of the system (e.g. cache, message queue)
    #[serde(rename = "type")]
    pub kind: String,

    /// Configuration data in JSON or YAML format
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub config: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Username or ID of the user who created the system
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub creator: String,

    /// Username or ID of the user who last modified the system
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub modifier: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SystemConfig {
    /// Builds an unsaved entity. Timestamps are placeholders until the
    /// store assigns them.
    pub fn new(tenant: impl Into<String>, env: Env, kind: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            tenant: tenant.into(),
            env,
            kind: kind.into(),
            config: String::new(),
            description: String::new(),
            creator: String::new(),
            modifier: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    Pre,
    Gray,
    Prod,
    Dev,
    Test,
    Stable,
}

impl Env {
    pub const ALL: [Env; 6] = [
        Env::Pre,
        Env::Gray,
        Env::Prod,
        Env::Dev,
        Env::Test,
        Env::Stable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Pre => "pre",
            Env::Gray => "gray",
            Env::Prod => "prod",
            Env::Dev => "dev",
            Env::Test => "test",
            Env::Stable => "stable",
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid environment: {0:?}")]
pub struct ParseEnvError(pub String);

impl FromStr for Env {
    type Err = ParseEnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Env::ALL
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| ParseEnvError(s.to_string()))
    }
}
