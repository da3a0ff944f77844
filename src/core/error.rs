//! Error handling for bldr
//!
//! This module provides the error types and user-facing error reporting for the
//! package assembler. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Missing input**: [`BldrError::MissingInput`] fails fast, before any platform call
//! - **Upstream status**: [`BldrError::UpstreamStatus`] carries the platform's status text
//! - **Rejected search**: [`BldrError::RequestNotAccepted`] when a search reports a non-`OK` status
//! - **Empty result**: [`BldrError::EmptyResult`] for listings that must not be empty
//! - **Folder structure**: [`BldrError::InvalidFolderChain`] for cyclic or rootless chains
//! - **Configuration**: [`BldrError::ConfigError`]
//!
//! Name-path references that match nothing are *not* errors; the resolver falls
//! back to treating them as external objects.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bldr_cli::core::{BldrError, ErrorContext, user_friendly_error};
//!
//! fn gather() -> anyhow::Result<()> {
//!     Err(BldrError::MissingInput { field: "assetId".to_string() }.into())
//! }
//!
//! if let Err(e) = gather() {
//!     user_friendly_error(e).display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for bldr operations.
///
/// Each variant names one failure mode of the gather → resolve → package flow.
/// Variants hold plain strings so the type stays `Clone` and can be wrapped in
/// an [`ErrorContext`] after being downcast out of an [`anyhow::Error`].
#[derive(Error, Debug, Clone)]
pub enum BldrError {
    /// A required identifier was absent or falsy.
    ///
    /// Raised before any network call is attempted.
    #[error("{field} is required")]
    MissingInput {
        /// Name of the missing input (e.g. `assetId`)
        field: String,
    },

    /// A platform call returned a non-success status.
    #[error("Platform request '{operation}' failed with status {status}: {status_text}")]
    UpstreamStatus {
        /// The client operation that failed
        operation: String,
        /// HTTP status code
        status: u16,
        /// Status text or response body returned by the platform
        status_text: String,
    },

    /// A platform search answered with a non-`OK` overall status.
    #[error("Platform request '{operation}' was not accepted: {overall_status}")]
    RequestNotAccepted {
        /// The client operation that was rejected
        operation: String,
        /// The overall status reported by the platform
        overall_status: String,
    },

    /// A listing that must return at least one item returned none.
    #[error("No items returned from {operation}")]
    EmptyResult {
        /// The listing operation that came back empty
        operation: String,
    },

    /// A folder's parent chain is cyclic or never reaches a root.
    #[error("Invalid folder chain at folder {folder_id}: {reason}")]
    InvalidFolderChain {
        /// The folder whose path could not be derived
        folder_id: u64,
        /// Why the chain is invalid
        reason: String,
    },

    /// The asset type is outside the supported closed set.
    #[error("Unsupported asset type: {asset_type}")]
    UnsupportedAssetType {
        /// The platform's asset type name
        asset_type: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Network error before a status was received
    #[error("Network error: {operation}")]
    NetworkError {
        /// The network operation that failed
        operation: String,
        /// Reason for the network failure
        reason: String,
    },

    /// The in-progress package is in an inconsistent state.
    #[error("Package error: {reason}")]
    PackageError {
        /// What went wrong
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl From<std::io::Error> for BldrError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for BldrError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonError(error.to_string())
    }
}

/// Error wrapper with a user-facing suggestion and details.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: BldrError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: BldrError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    ///
    /// Error in red, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with suggestions.
///
/// Typed [`BldrError`]s anywhere in the chain get tailored suggestions. Other
/// errors are wrapped with the full context chain as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(bldr_error) = error.chain().find_map(|e| e.downcast_ref::<BldrError>()) {
        let mut context = create_error_context(bldr_error.clone());
        if context.details.is_none() && error.chain().count() > 1 {
            context = context.with_details(format!("{error:#}"));
        }
        return context;
    }

    if let Some(reqwest_error) = error.chain().find_map(|e| e.downcast_ref::<reqwest::Error>()) {
        let reason = reqwest_error.to_string();
        let suggestion = if reqwest_error.is_timeout() {
            "The platform did not answer in time. Raise platform.timeout_secs in the config file or retry"
        } else {
            "Check network connectivity and the platform.base_url setting"
        };
        return ErrorContext::new(BldrError::NetworkError {
            operation: "platform request".to_string(),
            reason: reason.clone(),
        })
        .with_details(reason)
        .with_suggestion(suggestion);
    }

    ErrorContext::new(BldrError::PackageError {
        reason: error.to_string(),
    })
    .with_details(format!("{error:#}"))
}

fn create_error_context(error: BldrError) -> ErrorContext {
    match &error {
        BldrError::MissingInput { field } => {
            let suggestion = format!("Provide a non-zero {field}");
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        BldrError::UpstreamStatus { status, .. } => {
            let suggestion = match status {
                401 | 403 => "Check that the access token is valid and has Content Builder permissions",
                404 => "Check that the requested id exists in the source business unit",
                _ => "The platform rejected the request. Retry once the platform is reachable",
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        BldrError::RequestNotAccepted { .. } => ErrorContext::new(error)
            .with_suggestion("Check the search key and content type passed to the search"),
        BldrError::EmptyResult { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the folder contains assets of a supported type"),
        BldrError::InvalidFolderChain { .. } => ErrorContext::new(error)
            .with_details("Every folder's parent chain must end at a root folder without revisiting a folder")
            .with_suggestion("Re-run the command; if it persists the platform returned an inconsistent folder listing"),
        BldrError::UnsupportedAssetType { .. } => ErrorContext::new(error).with_details(
            "Supported types: webpage, htmlemail, textonlyemail, codesnippetblock, htmlblock, jscoderesource",
        ),
        BldrError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Check ~/.bldr/config.toml or the file named by BLDR_CONFIG"),
        BldrError::NetworkError { reason, .. } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Check network connectivity and the platform.base_url setting")
        }
        BldrError::PackageError { .. } | BldrError::IoError(_) | BldrError::JsonError(_) => {
            ErrorContext::new(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_missing_input_message() {
        let error = BldrError::MissingInput {
            field: "assetId".to_string(),
        };
        assert_eq!(error.to_string(), "assetId is required");
    }

    #[test]
    fn test_upstream_status_carries_status_text() {
        let error = BldrError::UpstreamStatus {
            operation: "getByAssetId".to_string(),
            status: 404,
            status_text: "Not Found".to_string(),
        };
        assert!(error.to_string().contains("Not Found"));
        assert!(error.to_string().contains("404"));
    }

    #[test]
    fn test_user_friendly_error_finds_typed_error_in_chain() {
        let error = anyhow::Error::from(BldrError::UpstreamStatus {
            operation: "getByAssetId".to_string(),
            status: 401,
            status_text: "Unauthorized".to_string(),
        })
        .context("Failed to gather asset 42");

        let context = user_friendly_error(error);
        assert!(matches!(context.error, BldrError::UpstreamStatus { status: 401, .. }));
        assert!(context.suggestion.unwrap().contains("access token"));
        assert!(context.details.unwrap().contains("Failed to gather asset 42"));
    }

    #[test]
    fn test_user_friendly_error_wraps_untyped_errors() {
        let error: anyhow::Error = Err::<(), _>(std::io::Error::other("disk full"))
            .context("Failed to write package")
            .unwrap_err();

        let context = user_friendly_error(error);
        assert!(matches!(context.error, BldrError::PackageError { .. }));
        assert!(context.details.unwrap().contains("disk full"));
    }

    #[test]
    fn test_error_context_display() {
        let context = ErrorContext::new(BldrError::EmptyResult {
            operation: "getAssetsByFolderIds".to_string(),
        })
        .with_details("folder 12 is empty")
        .with_suggestion("pick another folder");

        let rendered = context.to_string();
        assert!(rendered.contains("No items returned from getAssetsByFolderIds"));
        assert!(rendered.contains("Details: folder 12 is empty"));
        assert!(rendered.contains("Suggestion: pick another folder"));
    }
}
