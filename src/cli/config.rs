//! Manage the bldr configuration file.
//!
//! ```bash
//! bldr config init            # write an example config
//! bldr config init --force    # overwrite an existing one
//! bldr config show            # print the effective configuration
//! bldr config path            # print where the file lives
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::BldrConfig;

/// `bldr config`
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Create a config file with example values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,

    /// Print the config file location
    Path,
}

impl ConfigCommand {
    /// Run the subcommand against `config_path`, or the default location.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        match self.command {
            Some(ConfigSubcommands::Init { force }) => Self::init(force, config_path).await,
            Some(ConfigSubcommands::Show) | None => Self::show(config_path).await,
            Some(ConfigSubcommands::Path) => Self::show_path(config_path),
        }
    }

    async fn init(force: bool, config_path: Option<PathBuf>) -> Result<()> {
        let config_path = resolve(config_path)?;

        if config_path.exists() && !force {
            println!("❌ Config already exists at: {}", config_path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }

        let config = BldrConfig::init_example();
        config.save_to(&config_path).await?;

        println!("✅ Created config at: {}", config_path.display());
        println!("\n{}", "Example configuration:".bold());
        println!("{}", toml::to_string_pretty(&config)?);
        println!("\n{}", "Next steps:".yellow());
        println!("  1. Set platform.base_url to your business unit's REST endpoint");
        println!("  2. Export the access token as {}", config.platform.token_env.cyan());
        Ok(())
    }

    async fn show(config_path: Option<PathBuf>) -> Result<()> {
        let config_path = resolve(config_path)?;
        let config = BldrConfig::load_with_optional(Some(config_path.clone())).await?;

        println!("{}", "Configuration".bold());
        println!("Location: {}\n", config_path.display());
        if !config_path.exists() {
            println!("No config file found, showing defaults.");
            println!("\n{}", "Tip:".yellow());
            println!("  Run 'bldr config init' to create one\n");
        }
        println!("{}", toml::to_string_pretty(&config)?);
        Ok(())
    }

    fn show_path(config_path: Option<PathBuf>) -> Result<()> {
        println!("{}", resolve(config_path)?.display());
        Ok(())
    }
}

fn resolve(config_path: Option<PathBuf>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path),
        None => BldrConfig::default_path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_path() {
        let temp = TempDir::new().unwrap();
        let result = ConfigCommand::show_path(Some(temp.path().join("config.toml")));
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_config_init() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("nested").join("config.toml");

        ConfigCommand::init(false, Some(config_path.clone())).await.unwrap();
        assert!(config_path.exists());
        let written = BldrConfig::load_from(&config_path).await.unwrap();
        assert_eq!(written, BldrConfig::init_example());

        // Existing file without --force is left alone
        tokio::fs::write(&config_path, "[package]\nmax_depth = 1\n").await.unwrap();
        ConfigCommand::init(false, Some(config_path.clone())).await.unwrap();
        let kept = BldrConfig::load_from(&config_path).await.unwrap();
        assert_eq!(kept.package.max_depth, 1);

        ConfigCommand::init(true, Some(config_path.clone())).await.unwrap();
        let replaced = BldrConfig::load_from(&config_path).await.unwrap();
        assert_eq!(replaced, BldrConfig::init_example());
    }

    #[tokio::test]
    async fn test_config_show_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = ConfigCommand::show(Some(temp.path().join("config.toml"))).await;
        assert!(result.is_ok());
    }
}
