//! Command-line options and their layered resolution.
//!
//! Options are grouped (generic, logging, network, database). Values are
//! resolved in this order, later sources winning:
//!
//! 1. built-in defaults
//! 2. command-line flags
//! 3. the config file given by `--config-file`
//! 4. environment variables `APP_<GROUP>_<FIELD>`

use crate::{config, server, version};
use clap::Parser;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::Path;

pub mod database;
pub mod generic;
pub mod logging;
pub mod network;

pub use database::DatabaseOptions;
pub use generic::GenericOptions;
pub use logging::LoggingOptions;
pub use network::NetworkOptions;

/// Name used for log files and the command.
pub const PROJECT_NAME: &str = "app";

/// An option group that can be overridden from a config file or the
/// environment.
pub trait OptionGroup {
    /// Table name in config files and the `APP_<NAME>_` env prefix.
    const NAME: &'static str;
    /// Field names accepted from config files and the environment.
    const FIELDS: &'static [&'static str];
    type Patch: DeserializeOwned + Default;

    /// Overwrites every value present in `patch`.
    fn apply(&mut self, patch: Self::Patch);

    /// Returns one message per problem found.
    fn validate(&self) -> Vec<String>;
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("failed to load config file: {0}")]
    ConfigFile(#[source] config::ConfigError),

    #[error("failed to load config from environment: {0}")]
    Environment(#[source] config::ConfigError),

    #[error("{}", format_errors(.0))]
    Invalid(Vec<String>),
}

fn format_errors(errs: &[String]) -> String {
    if let [single] = errs {
        return single.clone();
    }
    let mut out = format!("{} errors occurred:", errs.len());
    for err in errs {
        out.push_str("\n\t* ");
        out.push_str(err);
    }
    out
}

/// Shape of a config file: one optional table per group.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    pub logging: Option<logging::LoggingPatch>,
    pub network: Option<network::NetworkPatch>,
    pub database: Option<database::DatabasePatch>,
}

/// Serves the system config API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser, Serialize)]
#[command(
    name = PROJECT_NAME,
    about = "Serves a REST API for managing system configurations",
    disable_version_flag = true
)]
pub struct AppOptions {
    #[command(flatten)]
    pub generic: GenericOptions,
    #[command(flatten)]
    pub logging: LoggingOptions,
    #[command(flatten)]
    pub network: NetworkOptions,
    #[command(flatten)]
    pub database: DatabaseOptions,
}

fn apply_env<G: OptionGroup>(
    group: &mut G,
    vars: &[(String, String)],
) -> Result<(), OptionsError> {
    let patch: G::Patch =
        config::from_env(G::NAME, vars.iter().cloned()).map_err(OptionsError::Environment)?;
    group.apply(patch);
    Ok(())
}

impl AppOptions {
    /// Layers the config file and the process environment over the flags.
    pub fn complete(&mut self) -> Result<(), OptionsError> {
        config::load_dotenv();
        self.complete_with(&config::process_env())
    }

    /// Same as [`AppOptions::complete`] with an explicit environment.
    pub fn complete_with(&mut self, vars: &[(String, String)]) -> Result<(), OptionsError> {
        if let Some(path) = self.generic.config_file.clone() {
            self.load_config_file(&path)?;
        }

        apply_env(&mut self.logging, vars)?;
        apply_env(&mut self.network, vars)?;
        apply_env(&mut self.database, vars)?;

        Ok(())
    }

    pub fn load_config_file(&mut self, path: &Path) -> Result<(), OptionsError> {
        let file: FileOptions = config::from_file(path).map_err(OptionsError::ConfigFile)?;

        if let Some(patch) = file.logging {
            self.logging.apply(patch);
        }
        if let Some(patch) = file.network {
            self.network.apply(patch);
        }
        if let Some(patch) = file.database {
            self.database.apply(patch);
        }

        Ok(())
    }

    /// Checks every group and reports all problems at once.
    ///
    /// Only the generic group is checked when the process will just print
    /// and exit.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let mut errs = self.generic.validate();
        if !self.generic.is_dump_only() {
            errs.extend(self.logging.validate());
            errs.extend(self.network.validate());
            errs.extend(self.database.validate());
        }

        if errs.is_empty() {
            Ok(())
        } else {
            Err(OptionsError::Invalid(errs))
        }
    }

    /// Every environment variable name that can override an option.
    pub fn env_names() -> Vec<String> {
        fn names<G: OptionGroup>() -> impl Iterator<Item = String> {
            G::FIELDS.iter().map(|field| config::env_name(G::NAME, field))
        }

        names::<LoggingOptions>()
            .chain(names::<NetworkOptions>())
            .chain(names::<DatabaseOptions>())
            .collect()
    }

    /// Builds the server config from the non-database groups.
    pub fn config(&self) -> server::Config {
        let mut config = server::Config::default();
        self.logging.apply_to(&mut config);
        self.network.apply_to(&mut config);
        config.published = serde_json::to_value(self).unwrap_or_default();
        config
    }

    pub async fn run(self) -> anyhow::Result<()> {
        if self.generic.dump_version {
            println!("{}", version::info().json());
            return Ok(());
        }

        if self.generic.dump_envs {
            for name in Self::env_names() {
                println!("{name}");
            }
            return Ok(());
        }

        let _guard = crate::logging::init(&self.logging, PROJECT_NAME)?;
        tracing::info!("{PROJECT_NAME} {}", version::info().short_string());

        if self.logging.dump_current_config {
            tracing::info!("Dumping the currently used server configuration ...");
            match serde_json::to_string_pretty(&self) {
                Ok(output) => tracing::info!("{output}"),
                Err(err) => tracing::warn!(error = %err, "Failed to dump configuration"),
            }
        }

        tracing::info!("Start instantiating App Server ...");
        let mut config = self.config();
        let pool = self.database.install_db().await?;
        tracing::info!("Database pool created");
        self.database.migrate(&pool).await?;
        config.pool = Some(pool);

        let server = server::AppServer::new(config)?;
        tracing::info!("Successfully complete instance!");

        tracing::info!("Start executing predecessor tasks ...");
        server.pre_run()?;
        tracing::info!("Successfully complete the predecessor task execution!");

        tracing::info!("Starting the server ...");
        server.run(&format!("0.0.0.0:{}", self.network.port)).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn parse(args: &[&str]) -> AppOptions {
        AppOptions::try_parse_from(std::iter::once(PROJECT_NAME).chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let opts = parse(&[
            "-p",
            "8080",
            "--cors-allowed-origins",
            "https://a.com,https://b.com",
            "-L",
            "debug",
            "--text-pretty",
            "false",
            "--db-pwd",
            "pw",
        ]);
        assert_eq!(opts.network.port, 8080);
        assert_eq!(opts.network.cors_allowed_origins.len(), 2);
        assert_eq!(opts.logging.log_level, "debug");
        assert!(!opts.logging.text_pretty);
        assert!(opts.logging.dump_current_config);
        assert_eq!(opts.database.db_password, "pw");

        assert_eq!(parse(&[]), AppOptions::default());
    }

    #[test]
    fn file_overrides_flags_and_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        std::fs::write(
            &path,
            "[network]\nport = 9000\nrequest_timeout = 5\n\n[logging]\nlog_level = \"warn\"\n",
        )
        .unwrap();

        let mut opts = parse(&["-p", "8080", "-f", path.to_str().unwrap()]);
        opts.complete_with(&vars(&[
            ("APP_NETWORK_PORT", "7070"),
            ("APP_DATABASE_DB_NAME", "configs"),
        ]))
        .unwrap();

        assert_eq!(opts.network.port, 7070);
        assert_eq!(opts.network.request_timeout, 5);
        assert_eq!(opts.logging.log_level, "warn");
        assert_eq!(opts.database.db_name, "configs");
    }

    #[test]
    fn bad_env_value_is_reported() {
        let mut opts = AppOptions::default();
        let err = opts
            .complete_with(&vars(&[("APP_NETWORK_PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, OptionsError::Environment(_)));
    }

    #[test]
    fn validate_collects_every_group() {
        let mut opts = AppOptions::default();
        opts.network.port = 0;
        opts.logging.log_level = "loud".into();

        let OptionsError::Invalid(errs) = opts.validate().unwrap_err() else {
            panic!("expected validation errors");
        };
        // port, level, db name, db user
        assert_eq!(errs.len(), 4, "{errs:?}");

        let message = OptionsError::Invalid(errs).to_string();
        assert!(message.starts_with("4 errors occurred:"), "{message}");
    }

    #[test]
    fn dump_flags_skip_server_validation() {
        let mut opts = AppOptions::default();
        opts.generic.dump_envs = true;
        opts.network.port = 0;
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn env_names_cover_every_field() {
        let names = AppOptions::env_names();
        assert!(names.contains(&"APP_LOGGING_LOG_LEVEL".to_string()));
        assert!(names.contains(&"APP_NETWORK_CORS_ALLOWED_ORIGINS".to_string()));
        assert!(names.contains(&"APP_DATABASE_DB_PASSWORD".to_string()));
        assert_eq!(
            names.len(),
            LoggingOptions::FIELDS.len() + NetworkOptions::FIELDS.len() + DatabaseOptions::FIELDS.len()
        );
    }

    #[test]
    fn every_env_name_deserializes() {
        let mut opts = AppOptions::default();
        let all: Vec<(String, String)> = AppOptions::env_names()
            .into_iter()
            .map(|name| {
                let value = if name.ends_with("PORT")
                    || name.ends_with("TIMEOUT")
                    || name.ends_with("MAX_CONNECTIONS")
                {
                    "9"
                } else if name.contains("_DISABLE_")
                    || name.contains("_PRETTY")
                    || name.contains("_REPORT_")
                    || name.contains("_DUMP_")
                    || name.contains("_ENABLE_")
                    || name.contains("_AUTO_")
                {
                    "true"
                } else {
                    "x"
                };
                (name, value.to_string())
            })
            .collect();

        opts.complete_with(&all).unwrap();
        assert_eq!(opts.network.port, 9);
        assert_eq!(opts.database.db_password, "x");
        assert!(opts.database.auto_migrate);
        assert_eq!(opts.logging.logging_directory, std::path::PathBuf::from("x"));
    }

    #[test]
    fn config_carries_network_and_masked_options() {
        let mut opts = AppOptions::default();
        opts.network.request_timeout = 12;
        opts.database.db_password = "hidden".into();

        let config = opts.config();
        assert_eq!(config.request_timeout, std::time::Duration::from_secs(12));
        assert_eq!(config.published["database"]["db_password"], database::MASK);
    }
}
