//! Global constants used throughout the bldr codebase.
//!
//! Path separators, defaults and limits that are shared across modules are
//! defined here so magic values stay discoverable.

use std::time::Duration;

/// Separator used in folder paths written to the package (`category.folderPath`).
pub const FOLDER_PATH_SEPARATOR: &str = "/";

/// Separator the platform uses in name-path references (`Folder\Name`).
pub const NAME_PATH_SEPARATOR: &str = "\\";

/// Doubled name-path separator seen in escaped script strings (`Folder\\Name`).
pub const ESCAPED_NAME_PATH_SEPARATOR: &str = "\\\\";

/// Default timeout for a single platform request (30 seconds).
pub const DEFAULT_PLATFORM_TIMEOUT: Duration = Duration::from_secs(30);

/// Default environment variable holding the platform access token.
pub const DEFAULT_TOKEN_ENV: &str = "BLDR_ACCESS_TOKEN";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "BLDR_CONFIG";

/// Default package output file.
pub const DEFAULT_PACKAGE_OUTPUT: &str = "bldr.package.json";

/// Default number of transitive assembly rounds after the initial pass.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Page size requested from asset listing endpoints.
pub const ASSET_PAGE_SIZE: usize = 250;

/// Number of hex characters kept from the SHA-256 digest for package-local ids.
pub const BLDR_ID_LENGTH: usize = 24;
