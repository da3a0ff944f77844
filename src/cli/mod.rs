//! Command-line interface for bldr.
//!
//! # Commands
//!
//! - `package` - gather assets and assemble them into a package
//! - `search` - look up assets and folders on the platform
//! - `scan` - list the references in a local content file
//! - `config` - manage the configuration file
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - errors only, no summaries
//! - `--config` / `-C` - config file (overrides `BLDR_CONFIG`)
//! - `--no-progress` - never show the spinner
//!
//! `RUST_LOG` takes precedence over `--verbose` and `--quiet` when set.
//!
//! # Example
//!
//! ```bash
//! bldr --verbose package asset 12345 --output package.json
//! ```

pub mod config;
pub mod package;
pub mod scan;
pub mod search;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::BldrConfig;
use crate::utils::Spinner;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Default log level. `None` logs errors only; `RUST_LOG` overrides either.
    pub log_level: Option<String>,

    /// Suppress spinners.
    pub no_progress: bool,

    /// Suppress summaries.
    pub quiet: bool,

    /// Config file path from `--config`.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// A subscriber that is already installed is kept.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.default_directive()))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init();
    }

    /// Filter used when `RUST_LOG` is unset.
    fn default_directive(&self) -> String {
        format!("bldr_cli={}", self.log_level.as_deref().unwrap_or("error"))
    }
}

/// State handed to commands that talk to the platform.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Loaded configuration
    pub config: BldrConfig,
    /// Spinners enabled
    pub progress: bool,
    /// Summaries suppressed
    pub quiet: bool,
}

impl RunContext {
    /// A spinner that respects `--no-progress` and `--quiet`.
    #[must_use]
    pub fn spinner(&self) -> Spinner {
        Spinner::new(self.progress && !self.quiet)
    }
}

/// bldr - package Content Builder assets for redeployment
#[derive(Parser)]
#[command(
    name = "bldr",
    about = "Package Content Builder assets with their references resolved",
    version,
    long_about = "Gathers Content Builder assets, finds the content blocks, data extensions \
                  and automations their scripts reference, and writes a self-contained package \
                  with every reference rewritten to a stable package-local id."
)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    command: Commands,

    /// Debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file to use instead of the default location
    #[arg(short = 'C', long, global = true, env = "BLDR_CONFIG")]
    config: Option<PathBuf>,

    /// Disable the progress spinner
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a package from an asset or a folder
    Package(package::PackageCommand),

    /// Search assets and folders
    Search(search::SearchCommand),

    /// List the references in a local file
    Scan(scan::ScanCommand),

    /// Manage the configuration file
    Config(config::ConfigCommand),
}

impl Cli {
    /// Run the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            quiet: self.quiet,
            config_path: self.config.clone(),
        }
    }

    /// Run with an explicit [`CliConfig`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Config(cmd) => cmd.execute(config.config_path).await,
            Commands::Scan(cmd) => cmd.execute().await,
            Commands::Package(cmd) => cmd.execute(&Self::run_context(&config).await?).await,
            Commands::Search(cmd) => cmd.execute(&Self::run_context(&config).await?).await,
        }
    }

    async fn run_context(config: &CliConfig) -> Result<RunContext> {
        Ok(RunContext {
            config: BldrConfig::load_with_optional(config.config_path.clone()).await?,
            progress: !config.no_progress,
            quiet: config.quiet,
        })
    }
}
