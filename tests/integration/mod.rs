//! Integration test suite for bldr
//!
//! End-to-end tests over the library API and the `bldr` binary. Platform
//! access goes through `MockPlatform`; nothing here touches the network.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **assembly**: gathering followed by transitive assembly of realistic content
//! - **category**: folder-based gathering
//! - **cli**: the `bldr` binary via `assert_cmd`
//! - **output**: the serialized package format

use bldr_cli::platform::RawFolder;
use bldr_cli::test_utils::init_test_logging;

mod assembly;
mod category;
mod cli;
mod output;

/// Folder listing shared by the scenarios:
///
/// ```text
/// Content Builder (1)
/// ├── Blocks (2)
/// └── Emails (3)
///     └── Archive (4)
/// ```
pub fn content_builder_folders() -> Vec<RawFolder> {
    init_test_logging(None);
    vec![
        RawFolder::new(1, "Content Builder", None),
        RawFolder::new(2, "Blocks", Some(1)),
        RawFolder::new(3, "Emails", Some(1)),
        RawFolder::new(4, "Archive", Some(3)),
    ]
}
