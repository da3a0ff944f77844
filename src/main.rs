//! bldr - package Content Builder assets for redeployment
//!
//! Entry point for the `bldr` binary. Parses arguments, runs the command and
//! turns any error into a colored message with a suggestion before exiting
//! with status 1.

use anyhow::Result;
use bldr_cli::cli;
use bldr_cli::core::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
