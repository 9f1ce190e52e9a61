//! Build and release information.
//!
//! Git and toolchain details are read from environment variables at
//! compile time so release pipelines can stamp them in:
//! `GIT_LATEST_TAG`, `GIT_COMMIT`, `GIT_TREE_STATE`, `RUSTC_VERSION`,
//! `BUILD_TIME`.

use serde::Serialize;
use std::sync::OnceLock;

/// Overrides the release version at runtime when set and non-blank.
pub const ENV_SPECIFIED_VERSION: &str = "SPECIFIED_VERSION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// Such as "v1.2.3" or "0.1.0"
    pub release_version: String,
    pub git_info: GitInfo,
    pub build_info: BuildInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitInfo {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub latest_tag: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub commit: String,
    /// "clean" or "dirty"
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tree_state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rust_version: String,
    pub os: String,
    pub arch: String,
    #[serde(rename = "numCPU")]
    pub num_cpu: usize,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub build_time: String,
}

impl Info {
    /// Collects version information from the build stamp and runtime.
    pub fn detect() -> Self {
        let specified = std::env::var(ENV_SPECIFIED_VERSION).unwrap_or_default();
        Self::with_release(&specified)
    }

    fn with_release(specified: &str) -> Self {
        let release_version = if specified.trim().is_empty() {
            env!("CARGO_PKG_VERSION").to_string()
        } else {
            specified.trim().to_string()
        };

        Self {
            release_version,
            git_info: GitInfo {
                latest_tag: option_env!("GIT_LATEST_TAG").unwrap_or_default().to_string(),
                commit: option_env!("GIT_COMMIT").unwrap_or_default().to_string(),
                tree_state: option_env!("GIT_TREE_STATE").unwrap_or_default().to_string(),
            },
            build_info: BuildInfo {
                rust_version: option_env!("RUSTC_VERSION").unwrap_or_default().to_string(),
                os: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
                num_cpu: std::thread::available_parallelism().map_or(1, |n| n.get()),
                build_time: option_env!("BUILD_TIME").unwrap_or_default().to_string(),
            },
        }
    }

    /// `"<release>; git: <commit>; build time: <time>"`
    pub fn short_string(&self) -> String {
        format!(
            "{}; git: {}; build time: {}",
            self.release_version, self.git_info.commit, self.build_info.build_time
        )
    }

    pub fn json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Process-wide version information, detected once.
pub fn info() -> &'static Info {
    static INFO: OnceLock<Info> = OnceLock::new();
    INFO.get_or_init(Info::detect)
}
