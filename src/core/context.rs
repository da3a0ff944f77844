//! Package context tags.
//!
//! A context tag classifies which platform area an object belongs to and,
//! therefore, which package bucket holds it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Package bucket classification for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextTag {
    /// Content Builder assets (emails, blocks, pages)
    ContentBuilder,
    /// Data extensions
    DataExtension,
    /// Automation Studio objects
    AutomationStudio,
}

impl ContextTag {
    /// All contexts in package order.
    pub const ALL: [Self; 3] = [Self::ContentBuilder, Self::DataExtension, Self::AutomationStudio];

    /// Key used for this context in the package output.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ContentBuilder => "contentBuilder",
            Self::DataExtension => "dataExtension",
            Self::AutomationStudio => "automationStudio",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ContentBuilder => "Content Builder",
            Self::DataExtension => "Data Extensions",
            Self::AutomationStudio => "Automation Studio",
        }
    }

    /// Name of the context's root folder on the platform.
    #[must_use]
    pub const fn root_folder_name(self) -> &'static str {
        match self {
            Self::ContentBuilder => "Content Builder",
            Self::DataExtension => "Data Extensions",
            Self::AutomationStudio => "my automations",
        }
    }

    /// Platform content type used in folder queries.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::ContentBuilder => "asset",
            Self::DataExtension => "dataextension",
            Self::AutomationStudio => "automations",
        }
    }
}

impl fmt::Display for ContextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
