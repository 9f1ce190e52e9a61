use crate::{options::OptionGroup, server};
use clap::{ArgAction, Args};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Args, Serialize)]
#[command(next_help_heading = "Logging flags")]
pub struct LoggingOptions {
    /// Log level. Valid values: [trace, debug, info, warn, warning, error, fatal, panic]
    #[arg(long, short = 'L', default_value = "info")]
    pub log_level: String,

    /// Disable text mode and write JSON logs
    #[arg(long)]
    pub disable_text: bool,

    /// Colorize text logs
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    pub text_pretty: bool,

    /// Log the source file and line of each event
    #[arg(long)]
    pub report_caller: bool,

    /// Dump the current configuration at startup
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    pub dump_current_config: bool,

    /// Also write logs to rotating files in --logging-directory
    #[arg(long)]
    pub enable_logging_to_file: bool,

    /// Directory that log files are written to
    #[arg(long, default_value = ".")]
    pub logging_directory: PathBuf,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            disable_text: false,
            text_pretty: true,
            report_caller: false,
            dump_current_config: true,
            enable_logging_to_file: false,
            logging_directory: PathBuf::from("."),
        }
    }
}

/// Values for [`LoggingOptions`] read from a config file or the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingPatch {
    pub log_level: Option<String>,
    pub disable_text: Option<bool>,
    pub text_pretty: Option<bool>,
    pub report_caller: Option<bool>,
    pub dump_current_config: Option<bool>,
    pub enable_logging_to_file: Option<bool>,
    pub logging_directory: Option<PathBuf>,
}

/// Parses a level name, accepting the aliases `warning`, `fatal` and `panic`.
pub fn parse_level(level: &str) -> Result<LevelFilter, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" | "warning" => Ok(LevelFilter::WARN),
        "error" | "fatal" | "panic" => Ok(LevelFilter::ERROR),
        other => Err(format!("not a valid log level: {other:?}")),
    }
}

impl LoggingOptions {
    pub fn level(&self) -> LevelFilter {
        parse_level(&self.log_level).unwrap_or(LevelFilter::INFO)
    }

    /// Apply logging options to the server config.
    pub fn apply_to(&self, config: &mut server::Config) {
        config.logging_directory = self.logging_directory.clone();
    }
}

impl OptionGroup for LoggingOptions {
    const NAME: &'static str = "logging";
    const FIELDS: &'static [&'static str] = &[
        "log_level",
        "disable_text",
        "text_pretty",
        "report_caller",
        "dump_current_config",
        "enable_logging_to_file",
        "logging_directory",
    ];
    type Patch = LoggingPatch;

    fn apply(&mut self, patch: LoggingPatch) {
        if let Some(v) = patch.log_level {
            self.log_level = v;
        }
        if let Some(v) = patch.disable_text {
            self.disable_text = v;
        }
        if let Some(v) = patch.text_pretty {
            self.text_pretty = v;
        }
        if let Some(v) = patch.report_caller {
            self.report_caller = v;
        }
        if let Some(v) = patch.dump_current_config {
            self.dump_current_config = v;
        }
        if let Some(v) = patch.enable_logging_to_file {
            self.enable_logging_to_file = v;
        }
        if let Some(v) = patch.logging_directory {
            self.logging_directory = v;
        }
    }

    fn validate(&self) -> Vec<String> {
        let mut errs = Vec::new();

        if let Err(err) = parse_level(&self.log_level) {
            errs.push(err);
        }
        if self.enable_logging_to_file && self.logging_directory.as_os_str().is_empty() {
            errs.push(
                "--logging-directory must be not empty when --enable-logging-to-file is enabled"
                    .to_string(),
            );
        }
        if self.enable_logging_to_file && self.text_pretty {
            errs.push(
                "--text-pretty cannot be enabled when --enable-logging-to-file is enabled"
                    .to_string(),
            );
        }

        errs
    }
}
