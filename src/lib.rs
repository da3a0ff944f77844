//! bldr - package Content Builder assets for redeployment
//!
//! bldr gathers Content Builder assets from a Marketing Cloud business unit,
//! finds every reference their AMPscript and SSJS make to other content
//! blocks, data extensions and automations, and assembles a self-contained
//! package in which each reference is rewritten to a stable package-local
//! `bldrId`.
//!
//! # Architecture
//!
//! - [`references`] - the catalog of reference functions, literal extraction
//!   and in-place rewriting
//! - [`resolver`] - maps a referenced literal to a package identity
//! - [`package`] - package buckets, the assembler and the dependency graph
//! - [`gatherer`] - pulls starting assets and folder trees from the platform
//! - [`folder`] - folder listings turned into paths
//! - [`platform`] - the platform client trait and its REST implementation
//! - [`config`] - the TOML configuration file
//! - [`cli`] - the `bldr` command line
//!
//! # Example
//!
//! ```rust,no_run
//! use bldr_cli::gatherer::AssetGatherer;
//! use bldr_cli::package::PackageAssembler;
//! use bldr_cli::platform::rest::RestClient;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = RestClient::new(
//!     "https://example.rest.marketingcloudapis.com",
//!     "token",
//!     Duration::from_secs(30),
//! )?;
//! let gathered = AssetGatherer::new(&client).gather_asset_by_id(12345, false).await?;
//!
//! let mut assembler = PackageAssembler::new(&client, gathered.into_package());
//! let report = assembler.assemble_transitive(5).await?;
//! println!("{} asset(s) scanned", report.processed);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod folder;
pub mod gatherer;
pub mod package;
pub mod platform;
pub mod references;
pub mod resolver;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
