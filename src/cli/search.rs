//! Look up assets and folders on the platform.
//!
//! ```bash
//! bldr search assets "Welcome Email"
//! bldr search assets welcome-email-key --key
//! bldr search folders Newsletters --json
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;

use crate::gatherer::{AssetGatherer, AssetSummary, FolderSummary};
use crate::platform::PlatformClient;
use crate::platform::rest::RestClient;

use super::RunContext;

/// `bldr search`
#[derive(Args)]
pub struct SearchCommand {
    #[command(subcommand)]
    target: SearchTarget,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum SearchTarget {
    /// Search Content Builder assets by name
    Assets {
        /// Name (or customer key with --key) to look for
        term: String,

        /// Match the customer key instead of the name
        #[arg(long)]
        key: bool,
    },

    /// Search folders by name
    Folders {
        /// Folder name to look for
        term: String,

        /// Folder content type
        #[arg(long, default_value = "asset")]
        content_type: String,
    },
}

impl SearchCommand {
    /// Run against the platform configured in `ctx`.
    pub async fn execute(self, ctx: &RunContext) -> Result<()> {
        let client = RestClient::from_config(&ctx.config.platform)?;
        self.run(&client).await
    }

    async fn run<C: PlatformClient>(self, client: &C) -> Result<()> {
        let gatherer = AssetGatherer::new(client);
        match self.target {
            SearchTarget::Assets { term, key } => {
                let found = gatherer.search_assets(&term, key).await?;
                if self.json {
                    print_json(&found)
                } else {
                    print_assets(&term, &found);
                    Ok(())
                }
            }
            SearchTarget::Folders { term, content_type } => {
                let found = gatherer.search_folders(&content_type, &term).await?;
                if self.json {
                    print_json(&found)
                } else {
                    print_folders(&term, &found);
                    Ok(())
                }
            }
        }
    }
}

fn print_json<T: Serialize>(rows: &[T]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

fn print_assets(term: &str, assets: &[AssetSummary]) {
    if assets.is_empty() {
        println!("No assets match '{term}'");
        return;
    }
    for asset in assets {
        println!(
            "{:>10}  {}  {} (folder {})",
            asset.id.to_string().cyan(),
            asset.name.bold(),
            asset.asset_type.dimmed(),
            asset.category_id
        );
    }
}

fn print_folders(term: &str, folders: &[FolderSummary]) {
    if folders.is_empty() {
        println!("No folders match '{term}'");
        return;
    }
    for folder in folders {
        let parent = folder.parent_name.as_deref().unwrap_or("-");
        println!("{:>10}  {}  in {}", folder.id.to_string().cyan(), folder.name.bold(), parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::RawFolder;
    use crate::test_utils::{MockPlatform, PlatformCall, raw_asset};

    #[tokio::test]
    async fn test_search_assets_by_key() {
        let client =
            MockPlatform::new().with_asset(raw_asset(7, "Header", "htmlblock", 1, "<h1/>"));
        let cmd = SearchCommand {
            target: SearchTarget::Assets {
                term: "key-7".to_string(),
                key: true,
            },
            json: true,
        };

        cmd.run(&client).await.unwrap();

        assert_eq!(
            client.calls(),
            vec![PlatformCall::SearchAssets {
                search_key: "customerKey".to_string(),
                search_term: "key-7".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_search_folders_rejected_content_type() {
        let client =
            MockPlatform::new().with_folders(vec![RawFolder::new(1, "Content Builder", None)]);
        let cmd = SearchCommand {
            target: SearchTarget::Folders {
                term: "Content".to_string(),
                content_type: "bogus".to_string(),
            },
            json: false,
        };

        let err = cmd.run(&client).await.unwrap_err();
        assert!(err.to_string().contains("not accepted"));
    }
}
