//! Asset type abstractions for bldr
//!
//! Content Builder assets come in many shapes, but only a closed set carries
//! scripting content that can reference other platform objects. Each supported
//! type knows where its content lives on the raw platform payload, so content
//! selection is an exhaustive `match` instead of field probing.
//!
//! # Examples
//!
//! ```rust
//! use bldr_cli::core::{AssetType, ContentField};
//!
//! let kind: AssetType = "htmlemail".parse().unwrap();
//! assert_eq!(kind, AssetType::HtmlEmail);
//! assert_eq!(kind.content_field(), ContentField::HtmlView);
//! assert_eq!(kind.to_string(), "htmlemail");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::BldrError;

/// Supported Content Builder asset types.
///
/// Serialized with the platform's own type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetType {
    /// Landing page
    #[serde(rename = "webpage")]
    Webpage,
    /// HTML email
    #[serde(rename = "htmlemail")]
    HtmlEmail,
    /// Text-only email
    #[serde(rename = "textonlyemail")]
    TextEmail,
    /// Code snippet content block
    #[serde(rename = "codesnippetblock")]
    CodeSnippet,
    /// HTML content block
    #[serde(rename = "htmlblock")]
    HtmlBlock,
    /// JavaScript code resource
    #[serde(rename = "jscoderesource")]
    ScriptResource,
}

/// Location of an asset's scripting content on the raw platform payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentField {
    /// `views.html.content`
    HtmlView,
    /// `views.text.content`
    TextView,
    /// top-level `content`
    Content,
}

impl AssetType {
    /// All supported types, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Webpage,
        Self::HtmlEmail,
        Self::TextEmail,
        Self::CodeSnippet,
        Self::HtmlBlock,
        Self::ScriptResource,
    ];

    /// The platform's name for this type.
    #[must_use]
    pub const fn platform_name(self) -> &'static str {
        match self {
            Self::Webpage => "webpage",
            Self::HtmlEmail => "htmlemail",
            Self::TextEmail => "textonlyemail",
            Self::CodeSnippet => "codesnippetblock",
            Self::HtmlBlock => "htmlblock",
            Self::ScriptResource => "jscoderesource",
        }
    }

    /// Where this type keeps its content.
    #[must_use]
    pub const fn content_field(self) -> ContentField {
        match self {
            Self::Webpage | Self::HtmlEmail => ContentField::HtmlView,
            Self::TextEmail => ContentField::TextView,
            Self::CodeSnippet | Self::HtmlBlock | Self::ScriptResource => ContentField::Content,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.platform_name())
    }
}

impl FromStr for AssetType {
    type Err = BldrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.platform_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| BldrError::UnsupportedAssetType {
                asset_type: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_platform_names() {
        for kind in AssetType::ALL {
            assert_eq!(kind.platform_name().parse::<AssetType>().unwrap(), kind);
        }
        assert_eq!("HTMLEmail".parse::<AssetType>().unwrap(), AssetType::HtmlEmail);
    }

    #[test]
    fn test_unsupported_type_is_rejected() {
        let err = "jpg".parse::<AssetType>().unwrap_err();
        assert!(matches!(err, BldrError::UnsupportedAssetType { ref asset_type } if asset_type == "jpg"));
    }

    #[test]
    fn test_content_field_selection() {
        assert_eq!(AssetType::Webpage.content_field(), ContentField::HtmlView);
        assert_eq!(AssetType::TextEmail.content_field(), ContentField::TextView);
        assert_eq!(AssetType::ScriptResource.content_field(), ContentField::Content);
    }

    #[test]
    fn test_serde_uses_platform_names() {
        let json = serde_json::to_string(&AssetType::CodeSnippet).unwrap();
        assert_eq!(json, "\"codesnippetblock\"");
        let parsed: AssetType = serde_json::from_str("\"textonlyemail\"").unwrap();
        assert_eq!(parsed, AssetType::TextEmail);
    }
}
