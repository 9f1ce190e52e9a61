//! Configuration sources layered over the command-line flags.
//!
//! Two sources are supported:
//! - a config file (`.toml` or `.json`), whose tables mirror the option groups
//! - environment variables named `APP_<GROUP>_<FIELD>`, deserialized by
//!   `envy`; a `.env` file is loaded first when present

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Prefix shared by every environment variable the service reads.
pub const ENV_PREFIX: &str = "APP_";

/// Config file extensions accepted by [`from_file`].
pub const VALID_EXTENSIONS: &[&str] = &["toml", "json"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {}, valid extension: {}", .0.display(), VALID_EXTENSIONS.join(", "))]
    UnsupportedFormat(PathBuf),

    #[error("invalid toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid environment variable under {prefix}*: {source}")]
    Env { prefix: String, source: envy::Error },
}

/// Load a `.env` file into the process environment if one exists.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

pub fn is_valid_config_filename(path: &Path) -> bool {
    extension(path).is_some_and(|ext| VALID_EXTENSIONS.contains(&ext.as_str()))
}

/// Deserialize a config file, choosing the format by extension.
pub fn from_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = extension(path).filter(|ext| VALID_EXTENSIONS.contains(&ext.as_str()));
    let Some(format) = format else {
        return Err(ConfigError::UnsupportedFormat(path.to_path_buf()));
    };

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match format.as_str() {
        "toml" => Ok(toml::from_str(&content)?),
        _ => Ok(serde_json::from_str(&content)?),
    }
}

/// Environment variable prefix of an option group, e.g. `APP_NETWORK_`.
pub fn env_prefix(group: &str) -> String {
    format!("{ENV_PREFIX}{}_", group.to_ascii_uppercase())
}

/// Full environment variable name of a group field, e.g. `APP_NETWORK_PORT`.
pub fn env_name(group: &str, field: &str) -> String {
    format!("{}{}", env_prefix(group), field.to_ascii_uppercase())
}

/// Deserialize one option group from `vars`, keeping only the variables
/// under that group's prefix.
pub fn from_env<T, I>(group: &str, vars: I) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = (String, String)>,
{
    let prefix = env_prefix(group);
    envy::prefixed(prefix.clone())
        .from_iter(vars)
        .map_err(|source| ConfigError::Env { prefix, source })
}

/// The current process environment, skipping entries that are not UTF-8.
pub fn process_env() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        port: Option<u16>,
        origins: Option<Vec<String>>,
    }

    #[test]
    fn env_names_are_upper_snake_case() {
        assert_eq!(env_prefix("network"), "APP_NETWORK_");
        assert_eq!(env_name("logging", "log_level"), "APP_LOGGING_LOG_LEVEL");
    }

    #[test]
    fn from_env_reads_only_group_vars() {
        let vars = vec![
            ("APP_NETWORK_PORT".to_string(), "8080".to_string()),
            ("APP_NETWORK_ORIGINS".to_string(), "a.com,b.com".to_string()),
            ("APP_LOGGING_PORT".to_string(), "1".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ];
        let sample: Sample = from_env("network", vars).unwrap();
        assert_eq!(sample.port, Some(8080));
        assert_eq!(
            sample.origins,
            Some(vec!["a.com".to_string(), "b.com".to_string()])
        );

        let empty: Sample = from_env("database", Vec::new()).unwrap();
        assert_eq!(empty, Sample::default());
    }

    #[test]
    fn from_env_reports_bad_values() {
        let vars = vec![("APP_NETWORK_PORT".to_string(), "eighty".to_string())];
        let err = from_env::<Sample, _>("network", vars).unwrap_err();
        assert!(err.to_string().contains("APP_NETWORK_"), "{err}");
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("app.toml");
        std::fs::File::create(&toml_path)
            .unwrap()
            .write_all(b"port = 9000\norigins = [\"x\"]\n")
            .unwrap();
        let sample: Sample = from_file(&toml_path).unwrap();
        assert_eq!(sample.port, Some(9000));

        let json_path = dir.path().join("app.JSON");
        std::fs::write(&json_path, r#"{"port": 9001}"#).unwrap();
        let sample: Sample = from_file(&json_path).unwrap();
        assert_eq!(sample.port, Some(9001));

        let yaml_path = dir.path().join("app.yaml");
        std::fs::write(&yaml_path, "port: 1").unwrap();
        assert!(matches!(
            from_file::<Sample>(&yaml_path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(!is_valid_config_filename(&yaml_path));
        assert!(is_valid_config_filename(&toml_path));
    }
}
