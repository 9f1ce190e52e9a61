//! Shared state handed to every route handler.

use crate::{db::DbPool, domain::repository::SystemConfigRepository};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub system_configs: Arc<dyn SystemConfigRepository>,

    /// Pool pinged by the readiness check. `None` makes `/readyz` fail.
    pub pool: Option<DbPool>,

    /// Values published on `/debug/vars`
    pub published: Arc<Value>,
}

impl AppState {
    pub fn new(system_configs: Arc<dyn SystemConfigRepository>, pool: Option<DbPool>) -> Self {
        Self {
            system_configs,
            pool,
            published: Arc::new(Value::Null),
        }
    }

    pub fn with_published(mut self, published: Value) -> Self {
        self.published = Arc::new(published);
        self
    }
}
