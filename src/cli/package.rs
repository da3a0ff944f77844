//! Build a package from a single asset or a whole folder.
//!
//! ```bash
//! # One asset, with everything it references
//! bldr package asset 12345
//!
//! # Look the id up as a Classic Content id first
//! bldr package asset 678 --legacy
//!
//! # A folder and all of its subfolders, written to stdout
//! bldr package category 4321 --output -
//!
//! # Discard a failing pass instead of keeping what it merged
//! bldr package category 4321 --on-failure rollback --max-depth 2
//! ```
//!
//! The command gathers the starting assets, runs transitive assembly and
//! writes the package as pretty JSON. References that were matched through
//! an escaped name path are listed afterwards for manual review.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

use crate::config::PackageConfig;
use crate::core::BldrError;
use crate::gatherer::AssetGatherer;
use crate::package::{DependencyGraph, FailurePolicy, Package, PackageAssembler, PassReport};
use crate::platform::PlatformClient;
use crate::platform::rest::RestClient;
use crate::utils::Spinner;

use super::RunContext;

/// `bldr package`
#[derive(Args)]
pub struct PackageCommand {
    #[command(subcommand)]
    target: PackageTarget,
}

/// What to start the package from.
#[derive(Debug, Clone, Subcommand)]
pub enum PackageTarget {
    /// Package one asset
    Asset {
        /// Asset id
        id: u64,

        /// Treat the id as a legacy (Classic Content) id first
        #[arg(long)]
        legacy: bool,

        #[command(flatten)]
        options: PackageOptions,
    },

    /// Package every supported asset in a folder and its subfolders
    Category {
        /// Folder (category) id
        id: u64,

        #[command(flatten)]
        options: PackageOptions,
    },
}

impl PackageTarget {
    fn id(&self) -> u64 {
        match self {
            Self::Asset { id, .. } | Self::Category { id, .. } => *id,
        }
    }

    fn required_field(&self) -> &'static str {
        match self {
            Self::Asset { .. } => "assetId",
            Self::Category { .. } => "categoryId",
        }
    }

    fn options(&self) -> &PackageOptions {
        match self {
            Self::Asset { options, .. } | Self::Category { options, .. } => options,
        }
    }
}

/// Flags shared by both package targets. Unset flags fall back to `[package]`.
#[derive(Debug, Clone, Default, Args)]
pub struct PackageOptions {
    /// Output file, or `-` for stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// What to do with a pass that fails: keep-partial or rollback
    #[arg(long, value_name = "POLICY")]
    pub on_failure: Option<FailurePolicy>,

    /// Transitive passes after the first one
    #[arg(long)]
    pub max_depth: Option<usize>,
}

/// Effective packaging settings after merging flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSettings {
    /// Output file, `-` meaning stdout
    pub output: PathBuf,
    /// Failure policy for each pass
    pub on_failure: FailurePolicy,
    /// Transitive pass limit
    pub max_depth: usize,
}

impl PackageSettings {
    /// Flags win over the configured values.
    #[must_use]
    pub fn resolve(options: &PackageOptions, config: &PackageConfig) -> Self {
        Self {
            output: options.output.clone().unwrap_or_else(|| config.output.clone()),
            on_failure: options.on_failure.unwrap_or(config.on_failure),
            max_depth: options.max_depth.unwrap_or(config.max_depth),
        }
    }

    fn writes_to_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }
}

/// Gather `target` and assemble it into a package.
pub async fn build_package<C: PlatformClient>(
    client: &C,
    target: &PackageTarget,
    settings: &PackageSettings,
    progress: &Spinner,
) -> Result<(Package, PassReport)> {
    let gatherer = AssetGatherer::new(client);
    let gathered = match target {
        PackageTarget::Asset { id, legacy, .. } => {
            progress.set_message(format!("Gathering asset {id}"));
            gatherer.gather_asset_by_id(*id, *legacy).await?
        }
        PackageTarget::Category { id, .. } => {
            progress.set_message(format!("Gathering folder {id}"));
            gatherer.gather_assets_by_category_id(*id).await?
        }
    };
    debug!("Gathered {} asset(s) in {} folder(s)", gathered.assets.len(), gathered.folders.len());

    progress.set_message("Resolving references");
    let mut assembler =
        PackageAssembler::new(client, gathered.into_package()).with_policy(settings.on_failure);
    let report = assembler.assemble_transitive(settings.max_depth).await?;
    Ok((assembler.into_package(), report))
}

impl PackageCommand {
    /// Run against the platform configured in `ctx`.
    pub async fn execute(self, ctx: &RunContext) -> Result<()> {
        let target = self.target;
        if target.id() == 0 {
            return Err(BldrError::MissingInput {
                field: target.required_field().to_string(),
            }
            .into());
        }

        let settings = PackageSettings::resolve(target.options(), &ctx.config.package);
        let client = RestClient::from_config(&ctx.config.platform)?;

        let spinner = ctx.spinner();
        spinner.set_prefix("package");
        let result = build_package(&client, &target, &settings, &spinner).await;
        spinner.finish_and_clear();
        let (package, report) = result?;

        log_deploy_order(&package);
        write_package(&package, &settings).await?;

        if !ctx.quiet && !settings.writes_to_stdout() {
            print_summary(&package, &report, &settings);
        }
        Ok(())
    }
}

fn log_deploy_order(package: &Package) {
    let graph = DependencyGraph::from_package(package);
    debug!("{} object(s), {} reference(s)", graph.node_count(), graph.edge_count());
    match graph.deploy_order() {
        Ok(order) => {
            for (position, node) in order.iter().enumerate() {
                debug!(
                    "deploy #{}: {} ({node}), needs {} object(s)",
                    position + 1,
                    graph.label(node),
                    graph.transitive_dependencies(node).len()
                );
            }
        }
        Err(e) => warn!("{e}"),
    }
}

async fn write_package(package: &Package, settings: &PackageSettings) -> Result<()> {
    let json = serde_json::to_string_pretty(package).context("Failed to serialize package")?;

    if settings.writes_to_stdout() {
        println!("{json}");
        return Ok(());
    }

    if let Some(parent) = settings.output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&settings.output, format!("{json}\n"))
        .await
        .with_context(|| format!("Failed to write package to {}", settings.output.display()))
}

fn print_summary(package: &Package, report: &PassReport, settings: &PackageSettings) {
    println!(
        "✅ Packaged {} object(s) to {}",
        package.len(),
        settings.output.display().to_string().cyan()
    );
    for (context, bucket) in package.iter() {
        println!("   {}: {}", context.key().bold(), bucket.len());
    }

    if !report.review.is_empty() {
        println!("\n{}", "Needs review:".yellow());
        for flag in &report.review {
            println!(
                "  {} {}({}) matched {} by escaped path",
                flag.asset_name.bold(),
                flag.reference,
                flag.literal,
                flag.target_bldr_id
            );
        }
    }
}
