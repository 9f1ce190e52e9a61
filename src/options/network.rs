use crate::{options::OptionGroup, server};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Listener and HTTP behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Args, Serialize)]
#[command(next_help_heading = "Network flags")]
pub struct NetworkOptions {
    /// Port to listen on
    #[arg(long, short = 'p', default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// List of allowed origins for CORS, comma separated. Empty allows any origin
    #[arg(long, value_delimiter = ',')]
    pub cors_allowed_origins: Vec<String>,

    /// Seconds a handler may keep a request open before timing it out
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout: u64,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_allowed_origins: Vec::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkPatch {
    pub port: Option<u16>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub request_timeout: Option<u64>,
}

impl NetworkOptions {
    pub fn apply_to(&self, config: &mut server::Config) {
        config.cors_allowed_origins = self.cors_allowed_origins.clone();
        config.request_timeout = Duration::from_secs(self.request_timeout);
    }
}

impl OptionGroup for NetworkOptions {
    const NAME: &'static str = "network";
    const FIELDS: &'static [&'static str] = &["port", "cors_allowed_origins", "request_timeout"];
    type Patch = NetworkPatch;

    fn apply(&mut self, patch: NetworkPatch) {
        if let Some(v) = patch.port {
            self.port = v;
        }
        if let Some(v) = patch.cors_allowed_origins {
            self.cors_allowed_origins = v;
        }
        if let Some(v) = patch.request_timeout {
            self.request_timeout = v;
        }
    }

    fn validate(&self) -> Vec<String> {
        let mut errs = Vec::new();

        if self.request_timeout == 0 {
            errs.push("--request-timeout must be greater than 0".to_string());
        }
        if self.port == 0 {
            errs.push("--port must be greater than 0".to_string());
        }
        for origin in &self.cors_allowed_origins {
            if origin != "*" && url::Url::parse(origin).is_err() {
                errs.push(format!("--cors-allowed-origins contains an invalid origin: {origin:?}"));
            }
        }

        errs
    }
}
