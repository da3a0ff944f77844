//! Platform client boundary.
//!
//! The core never talks to the network directly. Everything it needs from the
//! marketing platform goes through [`PlatformClient`], whose methods mirror the
//! platform's asset and folder lookups. [`rest::RestClient`] is the production
//! implementation; tests use an in-memory mock from `test_utils`.
//!
//! The raw types in this module keep the platform's field names (camelCase on
//! the wire) and are normalized by the gatherer before the assembler sees them.

pub mod rest;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::core::{AssetType, BldrError, ContentField};

pub use rest::RestClient;

/// Asset and folder lookups offered by the platform.
///
/// Implementations surface non-2xx responses as [`BldrError::UpstreamStatus`]
/// and must not retry on their own.
pub trait PlatformClient: Send + Sync {
    /// Fetch one asset by its Content Builder id. `None` when it does not exist.
    fn get_by_asset_id(&self, id: u64) -> impl Future<Output = Result<Option<RawAsset>>> + Send;

    /// Fetch assets carrying a legacy (Classic Content) id.
    fn get_by_legacy_id(
        &self,
        legacy_id: u64,
    ) -> impl Future<Output = Result<ItemList<RawAsset>>> + Send;

    /// Search assets by a simple property query.
    fn search_assets(
        &self,
        query: &AssetSearch,
    ) -> impl Future<Output = Result<ItemList<RawAsset>>> + Send;

    /// List every asset stored directly in any of the given folders.
    fn get_assets_by_folder_ids(
        &self,
        ids: &[u64],
    ) -> impl Future<Output = Result<ItemList<RawAsset>>> + Send;

    /// Search folders by name.
    fn search_folders(
        &self,
        query: &FolderSearch,
    ) -> impl Future<Output = Result<FolderSearchResponse>> + Send;

    /// The folder, its ancestors up to the root, and all of its descendants.
    fn get_folders_between(
        &self,
        query: &FolderQuery,
    ) -> impl Future<Output = Result<Vec<RawFolder>>> + Send;

    /// The folder and its ancestors up to the root.
    fn get_ancestor_folders(
        &self,
        query: &FolderQuery,
    ) -> impl Future<Output = Result<Vec<RawFolder>>> + Send;
}

/// Listing envelope returned by asset endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemList<T> {
    /// Returned items
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Total count reported by the platform, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> ItemList<T> {
    /// Wrap items without a platform count.
    pub fn new(items: Vec<T>) -> Self {
        Self { items, count: None }
    }
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Asset search by a single property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSearch {
    /// Property to filter on (`name`, `customerKey`, ...)
    pub search_key: String,
    /// Value the property must match
    pub search_term: String,
}

impl AssetSearch {
    /// Search by asset name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            search_key: "name".to_string(),
            search_term: name.into(),
        }
    }

    /// Search by customer key.
    pub fn by_customer_key(key: impl Into<String>) -> Self {
        Self {
            search_key: "customerKey".to_string(),
            search_term: key.into(),
        }
    }
}

/// Folder search by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSearch {
    /// Platform content type (`asset`, `dataextension`, ...)
    pub content_type: String,
    /// Property to filter on, normally `Name`
    pub search_key: String,
    /// Value to look for
    pub search_term: String,
}

/// Folder listing anchored at one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderQuery {
    /// Platform content type (`asset`, `dataextension`, ...)
    pub content_type: String,
    /// Anchor folder id
    pub category_id: u64,
}

/// Folder search envelope (`OverallStatus` + `Results`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FolderSearchResponse {
    /// `OK` on success
    pub overall_status: String,
    /// Matching folders
    #[serde(default)]
    pub results: Vec<RawFolder>,
}

/// Folder as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFolder {
    /// Folder id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Parent folder id; `None` for a root
    #[serde(default)]
    pub parent_id: Option<u64>,
    /// Parent folder name, when the platform includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    /// Creation timestamp as reported by the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    /// Modification timestamp as reported by the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<String>,
}

impl RawFolder {
    /// Folder with just identity and parent link.
    pub fn new(id: u64, name: impl Into<String>, parent_id: Option<u64>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            parent_name: None,
            created_date: None,
            modified_date: None,
        }
    }
}

/// Asset as returned by the platform.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAsset {
    /// Content Builder id
    pub id: u64,
    /// External key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_key: Option<String>,
    /// Display name
    pub name: String,
    /// Type descriptor
    pub asset_type: RawAssetType,
    /// Containing folder
    #[serde(default)]
    pub category: RawCategory,
    /// Content for block and resource types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Content views for email and page types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<RawViews>,
    /// Creation timestamp as reported by the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    /// Modification timestamp as reported by the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<String>,
}

/// `assetType` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawAssetType {
    /// Numeric type id
    #[serde(default)]
    pub id: u64,
    /// Type name (`htmlemail`, `codesnippetblock`, ...)
    pub name: String,
}

/// `category` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCategory {
    /// Folder id
    #[serde(default)]
    pub id: u64,
    /// Folder name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Parent folder id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
}

/// `views` block of email and page assets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawViews {
    /// HTML view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<RawView>,
    /// Text view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<RawView>,
}

/// One content view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawView {
    /// View content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl RawAsset {
    /// The asset's type, if it is one of the supported ones.
    pub fn kind(&self) -> Result<AssetType, BldrError> {
        self.asset_type.name.parse()
    }

    /// Content stored in the field selected by `kind`.
    #[must_use]
    pub fn content_for(&self, kind: AssetType) -> Option<&str> {
        let views = self.views.as_ref();
        match kind.content_field() {
            ContentField::HtmlView => views?.html.as_ref()?.content.as_deref(),
            ContentField::TextView => views?.text.as_ref()?.content.as_deref(),
            ContentField::Content => self.content.as_deref(),
        }
    }
}
