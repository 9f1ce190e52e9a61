//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating and managing a PostgreSQL connection pool
//! - Running the embedded schema migrations
//! - Executing an operator-supplied SQL file at startup

use sqlx::{
    Pool, Postgres,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::path::Path;

/// Type alias for PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the server cannot be reached or authentication fails.
pub async fn create_pool(
    options: PgConnectOptions,
    max_connections: u32,
) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Run the migrations embedded from the `migrations/` directory.
///
/// Applied migrations are tracked in `_sqlx_migrations`, so each runs once.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Splits a SQL script into statements on `;`, dropping blank ones.
pub fn split_statements(script: &str) -> Vec<&str> {
    script
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .collect()
}

/// Execute every statement of a SQL file against the pool.
///
/// A failing statement is logged and skipped; only failing to read the
/// file is an error. Returns the number of statements that succeeded.
pub async fn run_migrate_file(pool: &DbPool, path: &Path) -> std::io::Result<usize> {
    let script = tokio::fs::read_to_string(path).await?;

    let mut applied = 0;
    for stmt in split_statements(&script) {
        match sqlx::raw_sql(stmt).execute(pool).await {
            Ok(_) => applied += 1,
            Err(err) => tracing::warn!(error = %err, statement = stmt, "Failed to exec migrate sql"),
        }
    }

    Ok(applied)
}
