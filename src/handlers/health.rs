//! Liveness and readiness endpoints for service monitoring.
//!
//! Output follows the Kubernetes health-endpoint convention:
//!
//! ```text
//! [+]Ping ok
//! [-]Database failed
//! health check failed
//! ```

use crate::{db::DbPool, state::AppState};
use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

/// A single named health check.
#[async_trait]
pub trait Check: Send + Sync {
    fn name(&self) -> &str;
    async fn pass(&self) -> bool;
}

/// Always passes; proves the process is serving requests.
pub struct PingCheck;

#[async_trait]
impl Check for PingCheck {
    fn name(&self) -> &str {
        "Ping"
    }

    async fn pass(&self) -> bool {
        true
    }
}

/// Passes when the database answers a trivial query.
pub struct DatabaseCheck {
    pool: Option<DbPool>,
}

impl DatabaseCheck {
    pub fn new(pool: Option<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Check for DatabaseCheck {
    fn name(&self) -> &str {
        "Database"
    }

    async fn pass(&self) -> bool {
        let Some(pool) = &self.pool else {
            return false;
        };
        match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "Database health check failed");
                false
            }
        }
    }
}

/// Outcome of running a list of checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub results: Vec<(String, bool)>,
}

impl Report {
    pub async fn run(checks: &[&dyn Check]) -> Self {
        let mut results = Vec::with_capacity(checks.len());
        for check in checks {
            results.push((check.name().to_string(), check.pass().await));
        }
        Self { results }
    }

    pub fn passed(&self) -> bool {
        self.results.iter().all(|(_, ok)| *ok)
    }

    /// Renders the report as plain text. Non-verbose output is a single word.
    pub fn render(&self, verbose: bool) -> String {
        if !verbose {
            return if self.passed() { "OK" } else { "Fail" }.to_string();
        }

        let mut out = String::new();
        for (name, ok) in &self.results {
            if *ok {
                out.push_str(&format!("[+]{name} ok\n"));
            } else {
                out.push_str(&format!("[-]{name} failed\n"));
            }
        }
        out.push_str(if self.passed() {
            "health check passed"
        } else {
            "health check failed"
        });
        out
    }

    fn respond(self, verbose: bool) -> Response {
        let status = if self.passed() {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, self.render(verbose)).into_response()
    }
}

/// `?verbose` (any value) forces the per-check listing.
#[derive(Debug, Default, Deserialize)]
pub struct HealthParams {
    pub verbose: Option<String>,
}

/// Liveness handler: `GET /livez`.
pub async fn livez(Query(params): Query<HealthParams>) -> Response {
    Report::run(&[&PingCheck])
        .await
        .respond(params.verbose.is_some())
}

/// Readiness handler: `GET /readyz`. Verbose by default.
pub async fn readyz(State(state): State<AppState>) -> Response {
    let database = DatabaseCheck::new(state.pool.clone());
    Report::run(&[&PingCheck, &database]).await.respond(true)
}
