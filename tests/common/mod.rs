#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::json;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use systemconfig_server::{
    domain::{
        entity::SystemConfig,
        repository::{Query, RepositoryError, RepositoryResult, SystemConfigRepository},
    },
    server::{AppServer, Config},
};

/// Stored record plus its soft-delete flag.
struct Row {
    entity: SystemConfig,
    deleted: bool,
}

/// Keeps records in memory with the same soft-delete semantics as the
/// PostgreSQL repository.
#[derive(Default)]
pub struct InMemoryRepository {
    rows: Mutex<Vec<Row>>,
}

impl InMemoryRepository {
    fn live(rows: &[Row]) -> impl Iterator<Item = &SystemConfig> {
        rows.iter().filter(|r| !r.deleted).map(|r| &r.entity)
    }
}

#[async_trait]
impl SystemConfigRepository for InMemoryRepository {
    async fn create(&self, entity: &mut SystemConfig) -> RepositoryResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        entity.id = rows.len() as i64 + 1;
        entity.created_at = now;
        entity.updated_at = now;
        rows.push(Row {
            entity: entity.clone(),
            deleted: false,
        });
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.entity.id == id && !r.deleted)
            .ok_or(RepositoryError::NotFound)?;
        row.deleted = true;
        Ok(())
    }

    async fn update(&self, entity: &mut SystemConfig) -> RepositoryResult<()> {
        if entity.id == 0 {
            return Err(RepositoryError::MissingId);
        }
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.entity.id == entity.id && !r.deleted)
            .ok_or(RepositoryError::NotFound)?;
        entity.created_at = row.entity.created_at;
        entity.updated_at = Utc::now();
        row.entity = entity.clone();
        Ok(())
    }

    async fn get(&self, id: i64) -> RepositoryResult<SystemConfig> {
        let rows = self.rows.lock().unwrap();
        Self::live(&rows)
            .find(|e| e.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find(&self, query: &Query) -> RepositoryResult<Vec<SystemConfig>> {
        let rows = self.rows.lock().unwrap();
        let matching = Self::live(&rows)
            .filter(|e| e.config.contains(&query.keyword))
            .skip(query.offset.max(0) as usize);
        let found = if query.limit > 0 {
            matching.take(query.limit as usize).cloned().collect()
        } else {
            matching.cloned().collect()
        };
        Ok(found)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(Self::live(&rows).count() as i64)
    }
}

/// Answers `count` only after a delay.
pub struct SlowRepository {
    pub delay: Duration,
}

#[async_trait]
impl SystemConfigRepository for SlowRepository {
    async fn create(&self, _: &mut SystemConfig) -> RepositoryResult<()> {
        Ok(())
    }

    async fn delete(&self, _: i64) -> RepositoryResult<()> {
        Ok(())
    }

    async fn update(&self, _: &mut SystemConfig) -> RepositoryResult<()> {
        Ok(())
    }

    async fn get(&self, _: i64) -> RepositoryResult<SystemConfig> {
        Err(RepositoryError::NotFound)
    }

    async fn find(&self, _: &Query) -> RepositoryResult<Vec<SystemConfig>> {
        Ok(Vec::new())
    }

    async fn count(&self) -> RepositoryResult<i64> {
        tokio::time::sleep(self.delay).await;
        Ok(0)
    }
}

pub fn server_with(config: Config, repository: Arc<dyn SystemConfigRepository>) -> TestServer {
    let app = AppServer::with_repository(config, repository);
    TestServer::new(app.router()).unwrap()
}

pub fn test_server() -> TestServer {
    let config = Config {
        published: json!({ "network": { "port": 8080 } }),
        ..Default::default()
    };
    server_with(config, Arc::new(InMemoryRepository::default()))
}

pub fn create_body(tenant: &str, config: &str) -> serde_json::Value {
    json!({
        "tenant": tenant,
        "env": "prod",
        "type": "cache",
        "config": config,
        "description": "shared cache",
        "creator": "alice"
    })
}
