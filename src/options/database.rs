use crate::{db, options::OptionGroup};
use clap::Args;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::postgres::PgConnectOptions;
use std::path::PathBuf;

pub const DEFAULT_DB_HOST: &str = "127.0.0.1";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Replacement for secrets whenever options are serialized.
pub const MASK: &str = "******";

fn mask<S: Serializer>(_: &String, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(MASK)
}

/// PostgreSQL connection and migration settings.
#[derive(Debug, Clone, PartialEq, Eq, Args, Serialize)]
#[command(next_help_heading = "Database flags")]
pub struct DatabaseOptions {
    /// The database name
    #[arg(long, default_value = "")]
    pub db_name: String,

    /// The user name used to access database
    #[arg(long, default_value = "")]
    pub db_user: String,

    /// The user password used to access database
    #[arg(long = "db-pwd", default_value = "")]
    #[serde(serialize_with = "mask")]
    pub db_password: String,

    /// Database host
    #[arg(long, default_value = DEFAULT_DB_HOST)]
    pub db_host: String,

    /// Database port
    #[arg(long, default_value_t = DEFAULT_DB_PORT)]
    pub db_port: u16,

    /// Maximum number of pooled connections
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub db_max_connections: u32,

    /// Apply the embedded schema migrations at startup
    #[arg(long)]
    pub auto_migrate: bool,

    /// Extra SQL file executed statement by statement at startup
    #[arg(long)]
    pub migrate_file: Option<PathBuf>,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            db_name: String::new(),
            db_user: String::new(),
            db_password: String::new(),
            db_host: DEFAULT_DB_HOST.to_string(),
            db_port: DEFAULT_DB_PORT,
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            auto_migrate: false,
            migrate_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabasePatch {
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    #[serde(alias = "db_pwd")]
    pub db_password: Option<String>,
    pub db_host: Option<String>,
    pub db_port: Option<u16>,
    pub db_max_connections: Option<u32>,
    pub auto_migrate: Option<bool>,
    pub migrate_file: Option<PathBuf>,
}

impl DatabaseOptions {
    pub fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .database(&self.db_name);
        if !self.db_password.is_empty() {
            options = options.password(&self.db_password);
        }
        options
    }

    /// Open the connection pool.
    pub async fn install_db(&self) -> Result<db::DbPool, sqlx::Error> {
        db::create_pool(self.connect_options(), self.db_max_connections).await
    }

    /// Run the embedded migrations and then the migrate file, as enabled.
    pub async fn migrate(&self, pool: &db::DbPool) -> anyhow::Result<()> {
        if self.auto_migrate {
            tracing::debug!("Applying embedded schema migrations");
            db::run_migrations(pool).await?;
        }

        if let Some(path) = &self.migrate_file {
            tracing::debug!(file = %path.display(), "Executing migrate file");
            let applied = db::run_migrate_file(pool, path).await.map_err(|e| {
                anyhow::anyhow!("failed to read migrate file {}: {e}", path.display())
            })?;
            tracing::info!(applied, "Migrate file executed");
        }

        Ok(())
    }
}

impl OptionGroup for DatabaseOptions {
    const NAME: &'static str = "database";
    const FIELDS: &'static [&'static str] = &[
        "db_name",
        "db_user",
        "db_password",
        "db_host",
        "db_port",
        "db_max_connections",
        "auto_migrate",
        "migrate_file",
    ];
    type Patch = DatabasePatch;

    fn apply(&mut self, patch: DatabasePatch) {
        if let Some(v) = patch.db_name {
            self.db_name = v;
        }
        if let Some(v) = patch.db_user {
            self.db_user = v;
        }
        if let Some(v) = patch.db_password {
            self.db_password = v;
        }
        if let Some(v) = patch.db_host {
            self.db_host = v;
        }
        if let Some(v) = patch.db_port {
            self.db_port = v;
        }
        if let Some(v) = patch.db_max_connections {
            self.db_max_connections = v;
        }
        if let Some(v) = patch.auto_migrate {
            self.auto_migrate = v;
        }
        if let Some(v) = patch.migrate_file {
            self.migrate_file = Some(v);
        }
    }

    fn validate(&self) -> Vec<String> {
        let mut errs = Vec::new();

        if self.db_host.is_empty() {
            errs.push("--db-host must be specified".to_string());
        }
        if self.db_name.is_empty() {
            errs.push("--db-name must be specified".to_string());
        }
        if self.db_user.is_empty() {
            errs.push("--db-user must be specified".to_string());
        }
        if self.db_port == 0 {
            errs.push("--db-port must be specified".to_string());
        }
        if self.db_max_connections == 0 {
            errs.push("--db-max-connections must be greater than 0".to_string());
        }

        errs
    }
}
