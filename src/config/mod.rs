//! Configuration management for bldr
//!
//! A single TOML file configures where the platform lives and how packages are
//! assembled. Command-line flags override file values; the file overrides the
//! built-in defaults.
//!
//! # Modules
//!
//! - `global` - the user configuration file (`~/.bldr/config.toml`)
//!
//! # Security Model
//!
//! Access tokens are never written to the configuration file. The
//! `platform.token_env` setting names the environment variable the token is
//! read from at startup.

mod global;

pub use global::{BldrConfig, PackageConfig, PlatformConfig};
