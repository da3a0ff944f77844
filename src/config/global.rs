//! User configuration for bldr.
//!
//! The configuration file (`~/.bldr/config.toml`) holds the platform endpoint
//! and packaging defaults. The access token itself is never stored here; the
//! file only names the environment variable that carries it.
//!
//! # Configuration File Location
//!
//! - **Unix/macOS**: `~/.bldr/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\bldr\config.toml`
//!
//! `BLDR_CONFIG` or the `--config` flag point at a different file.
//!
//! # File Format
//!
//! ```toml
//! [platform]
//! base_url = "https://mc-subdomain.rest.marketingcloudapis.com"
//! token_env = "BLDR_ACCESS_TOKEN"
//! timeout_secs = 30
//!
//! [package]
//! on_failure = "keep-partial"   # or "rollback"
//! max_depth = 5
//! output = "bldr.package.json"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_MAX_DEPTH, DEFAULT_PACKAGE_OUTPUT, DEFAULT_PLATFORM_TIMEOUT,
    DEFAULT_TOKEN_ENV,
};
use crate::package::FailurePolicy;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BldrConfig {
    /// Platform endpoint settings
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Package assembly settings
    #[serde(default)]
    pub package: PackageConfig,
}

/// `[platform]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// REST base URL of the source business unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// `[package]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageConfig {
    /// What happens to partially merged state when a pass fails
    #[serde(default)]
    pub on_failure: FailurePolicy,

    /// Transitive assembly rounds after the initial pass
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Where `bldr package` writes its output
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_PLATFORM_TIMEOUT.as_secs()
}

const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_PACKAGE_OUTPUT)
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PlatformConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            on_failure: FailurePolicy::default(),
            max_depth: default_max_depth(),
            output: default_output(),
        }
    }
}

impl BldrConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file yields the default configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Write the configuration as pretty TOML, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Default config file path, honoring `BLDR_CONFIG`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("bldr")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".bldr")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Example configuration written by `bldr config init`.
    #[must_use]
    pub fn init_example() -> Self {
        Self {
            platform: PlatformConfig {
                base_url: Some("https://YOUR_SUBDOMAIN.rest.marketingcloudapis.com".to_string()),
                ..PlatformConfig::default()
            },
            package: PackageConfig::default(),
        }
    }
}
