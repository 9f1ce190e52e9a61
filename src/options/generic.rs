use crate::config;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Options that decide what the process does rather than how it serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args, Serialize)]
#[command(next_help_heading = "Generic flags")]
pub struct GenericOptions {
    /// The path to the configuration file. Valid extension: toml, json
    #[arg(long, short = 'f')]
    pub config_file: Option<PathBuf>,

    /// Print the version information and exit
    #[arg(long = "version", short = 'V')]
    pub dump_version: bool,

    /// Output all the environment variable names that can be set up, and exit
    #[arg(long = "envs", short = 'E')]
    pub dump_envs: bool,
}

impl GenericOptions {
    pub fn validate(&self) -> Vec<String> {
        let mut errs = Vec::new();
        if self.dump_version && self.config_file.is_some() {
            errs.push("--version and --config-file are mutually exclusive".to_string());
        }
        let invalid = self
            .config_file
            .as_deref()
            .filter(|path| !config::is_valid_config_filename(path));
        if let Some(path) = invalid {
            errs.push(format!(
                "invalid config file: {}, valid extension: {}",
                path.display(),
                config::VALID_EXTENSIONS.join(", ")
            ));
        }
        errs
    }

    /// True when the process only prints something and exits.
    pub fn is_dump_only(&self) -> bool {
        self.dump_version || self.dump_envs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_excludes_config_file() {
        let opts = GenericOptions {
            config_file: Some("app.toml".into()),
            dump_version: true,
            dump_envs: false,
        };
        assert_eq!(opts.validate().len(), 1);
        assert!(opts.is_dump_only());
        assert!(GenericOptions::default().validate().is_empty());

        let opts = GenericOptions {
            config_file: Some("app.yaml".into()),
            ..Default::default()
        };
        assert!(opts.validate()[0].contains("valid extension: toml, json"));
    }
}
