//! Test utilities for bldr
//!
//! Helpers for unit and integration tests:
//! - [`MockPlatform`] - an in-memory platform client that records its calls
//! - fixtures for raw platform assets and package assets
//! - [`init_test_logging`] for tracing output while debugging a test
//!
//! # Example
//!
//! ```rust,no_run
//! use bldr_cli::gatherer::AssetGatherer;
//! use bldr_cli::platform::RawFolder;
//! use bldr_cli::test_utils::{MockPlatform, raw_asset};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = MockPlatform::new()
//!     .with_folders(vec![RawFolder::new(1, "Content Builder", None)])
//!     .with_asset(raw_asset(10, "Welcome", "htmlemail", 1, "<p>hi</p>"));
//!
//! let gathered = AssetGatherer::new(&client).gather_asset_by_id(10, false).await?;
//! assert_eq!(gathered.assets.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod mock_platform;

pub use fixtures::{NEWSLETTER_HTML, packaged_asset, raw_asset};
pub use mock_platform::{MockPlatform, PlatformCall};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=bldr_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
