//! Core types for bldr
//!
//! The foundation shared by every other module:
//!
//! - [`BldrError`] and [`ErrorContext`] - typed errors and their user-facing rendering
//! - [`AssetType`] and [`ContentField`] - the closed set of supported asset types
//!   and where each keeps its content
//! - [`ContextTag`] - the package bucket an object belongs to
//!
//! # Examples
//!
//! ```rust
//! use bldr_cli::core::{BldrError, ContextTag, user_friendly_error};
//!
//! let err = anyhow::Error::from(BldrError::MissingInput { field: "assetId".into() });
//! let friendly = user_friendly_error(err);
//! assert!(friendly.suggestion.is_some());
//! assert_eq!(ContextTag::DataExtension.key(), "dataExtension");
//! ```

pub mod asset;
pub mod context;
pub mod error;

pub use asset::{AssetType, ContentField};
pub use context::ContextTag;
pub use error::{BldrError, ErrorContext, user_friendly_error};
