//! List the references a local content file makes, without touching the platform.
//!
//! ```bash
//! bldr scan email.html
//! bldr scan snippet.amp --json
//! bldr scan --catalog          # the recognized functions and their patterns
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::core::ContextTag;
use crate::references::{RawMatch, ReferenceCatalog, extract_all};

/// `bldr scan`
#[derive(Args)]
pub struct ScanCommand {
    /// Content file to scan
    #[arg(required_unless_present = "catalog")]
    file: Option<PathBuf>,

    /// Print the reference catalog instead of scanning
    #[arg(long, conflicts_with = "file")]
    catalog: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

/// One reference found in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundReference {
    /// Reference function
    pub function: String,
    /// Bucket the target would land in
    pub context: ContextTag,
    /// Argument without quotes
    pub value: String,
    /// 1-based line of the argument
    pub line: usize,
}

/// One catalog entry as printed by `--catalog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Function name
    pub function: String,
    /// Target bucket
    pub context: ContextTag,
    /// Compiled pattern source
    pub pattern: String,
}

/// References in `content`, grouped by catalog function.
pub fn scan_content(catalog: &ReferenceCatalog, content: &str) -> Vec<FoundReference> {
    extract_all(catalog, content)
        .iter()
        .map(|m: &RawMatch<'_>| FoundReference {
            function: m.function.name.to_string(),
            context: m.function.class.context(),
            value: m.value().to_string(),
            line: content[..m.offset].matches('\n').count() + 1,
        })
        .collect()
}

/// Every catalog function with its pattern.
pub fn catalog_entries(catalog: &ReferenceCatalog) -> Vec<CatalogEntry> {
    catalog
        .iter()
        .map(|function| CatalogEntry {
            function: function.name.to_string(),
            context: function.class.context(),
            pattern: function.pattern.as_str().to_string(),
        })
        .collect()
}

impl ScanCommand {
    /// Scan the file, or print the catalog.
    pub async fn execute(self) -> Result<()> {
        let catalog = ReferenceCatalog::global()?;

        if self.catalog {
            let entries = catalog_entries(catalog);
            if self.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    println!(
                        "{:<24} {:<18} {}",
                        entry.function.bold(),
                        entry.context.key(),
                        entry.pattern.dimmed()
                    );
                }
            }
            return Ok(());
        }

        let Some(path) = self.file else {
            return Ok(());
        };
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let found = scan_content(catalog, &content);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&found)?);
        } else if found.is_empty() {
            println!("No references in {}", path.display());
        } else {
            for reference in &found {
                println!(
                    "{:>5}  {}({}) → {}",
                    reference.line,
                    reference.function.bold(),
                    reference.value.cyan(),
                    reference.context.key()
                );
            }
        }
        Ok(())
    }
}
