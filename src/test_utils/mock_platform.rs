//! In-memory [`PlatformClient`] for tests.
//!
//! Serves assets and folders registered up front and records every call, so
//! tests can assert both on results and on which lookups were made.

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::core::BldrError;
use crate::platform::{
    AssetSearch, FolderQuery, FolderSearch, FolderSearchResponse, ItemList, PlatformClient,
    RawAsset, RawFolder,
};

/// A recorded platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    /// `get_by_asset_id`
    GetByAssetId(u64),
    /// `get_by_legacy_id`
    GetByLegacyId(u64),
    /// `search_assets`
    SearchAssets {
        /// Property searched
        search_key: String,
        /// Value searched for
        search_term: String,
    },
    /// `get_assets_by_folder_ids`
    GetAssetsByFolderIds(Vec<u64>),
    /// `search_folders`
    SearchFolders {
        /// Content type searched
        content_type: String,
        /// Value searched for
        search_term: String,
    },
    /// `get_folders_between`
    GetFoldersBetween(u64),
    /// `get_ancestor_folders`
    GetAncestorFolders(u64),
}

impl PlatformCall {
    fn operation(&self) -> &'static str {
        match self {
            Self::GetByAssetId(_) => "getByAssetId",
            Self::GetByLegacyId(_) => "getByLegacyId",
            Self::SearchAssets { .. } => "searchAssets",
            Self::GetAssetsByFolderIds(_) => "getAssetsByFolderIds",
            Self::SearchFolders { .. } => "searchFolders",
            Self::GetFoldersBetween(_) => "getFoldersBetween",
            Self::GetAncestorFolders(_) => "getAncestorFolders",
        }
    }
}

/// Platform double backed by in-memory assets and folders.
#[derive(Debug, Default)]
pub struct MockPlatform {
    assets: Vec<RawAsset>,
    folders: Vec<RawFolder>,
    legacy_ids: HashMap<u64, u64>,
    failures: HashMap<&'static str, u16>,
    calls: Mutex<Vec<PlatformCall>>,
}

impl MockPlatform {
    /// An empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset.
    #[must_use]
    pub fn with_asset(mut self, asset: RawAsset) -> Self {
        self.assets.push(asset);
        self
    }

    /// Register folders, after any already registered.
    #[must_use]
    pub fn with_folders(mut self, folders: Vec<RawFolder>) -> Self {
        self.folders.extend(folders);
        self
    }

    /// Make `legacy_id` resolve to the asset with id `asset_id`.
    #[must_use]
    pub fn with_legacy_id(mut self, legacy_id: u64, asset_id: u64) -> Self {
        self.legacy_ids.insert(legacy_id, asset_id);
        self
    }

    /// Make every call of `operation` fail with HTTP `status`.
    #[must_use]
    pub fn with_failure(mut self, operation: &'static str, status: u16) -> Self {
        self.failures.insert(operation, status);
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: PlatformCall) -> Result<()> {
        let operation = call.operation();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match self.failures.get(operation) {
            Some(&status) => Err(BldrError::UpstreamStatus {
                operation: operation.to_string(),
                status,
                status_text: "injected failure".to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }

    fn folder(&self, id: u64) -> Option<&RawFolder> {
        self.folders.iter().find(|f| f.id == id)
    }

    fn ancestors(&self, id: u64) -> Vec<RawFolder> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(id);
        while let Some(current) = next {
            let Some(folder) = self.folder(current) else {
                break;
            };
            if !seen.insert(current) {
                break;
            }
            chain.push(folder.clone());
            next = folder.parent_id;
        }
        chain
    }

    fn is_below(&self, folder: &RawFolder, ancestor: u64) -> bool {
        self.ancestors(folder.id).iter().skip(1).any(|f| f.id == ancestor)
    }
}

impl PlatformClient for MockPlatform {
    async fn get_by_asset_id(&self, id: u64) -> Result<Option<RawAsset>> {
        self.record(PlatformCall::GetByAssetId(id))?;
        Ok(self.assets.iter().find(|a| a.id == id).cloned())
    }

    async fn get_by_legacy_id(&self, legacy_id: u64) -> Result<ItemList<RawAsset>> {
        self.record(PlatformCall::GetByLegacyId(legacy_id))?;
        let items = self
            .legacy_ids
            .get(&legacy_id)
            .and_then(|id| self.assets.iter().find(|a| a.id == *id))
            .cloned()
            .into_iter()
            .collect();
        Ok(ItemList::new(items))
    }

    async fn search_assets(&self, query: &AssetSearch) -> Result<ItemList<RawAsset>> {
        self.record(PlatformCall::SearchAssets {
            search_key: query.search_key.clone(),
            search_term: query.search_term.clone(),
        })?;
        let items = self
            .assets
            .iter()
            .filter(|a| match query.search_key.as_str() {
                "name" => a.name == query.search_term,
                "customerKey" => a.customer_key.as_deref() == Some(query.search_term.as_str()),
                _ => false,
            })
            .cloned()
            .collect();
        Ok(ItemList::new(items))
    }

    async fn get_assets_by_folder_ids(&self, ids: &[u64]) -> Result<ItemList<RawAsset>> {
        self.record(PlatformCall::GetAssetsByFolderIds(ids.to_vec()))?;
        let items = self.assets.iter().filter(|a| ids.contains(&a.category.id)).cloned().collect();
        Ok(ItemList::new(items))
    }

    async fn search_folders(&self, query: &FolderSearch) -> Result<FolderSearchResponse> {
        self.record(PlatformCall::SearchFolders {
            content_type: query.content_type.clone(),
            search_term: query.search_term.clone(),
        })?;
        if query.content_type != "asset" {
            return Ok(FolderSearchResponse {
                overall_status: format!("Error: unknown content type {}", query.content_type),
                results: Vec::new(),
            });
        }

        let results = self
            .folders
            .iter()
            .filter(|f| f.name.contains(&query.search_term))
            .map(|f| {
                let mut found = f.clone();
                found.parent_name = f.parent_id.and_then(|p| self.folder(p)).map(|p| p.name.clone());
                found
            })
            .collect();
        Ok(FolderSearchResponse {
            overall_status: "OK".to_string(),
            results,
        })
    }

    async fn get_folders_between(&self, query: &FolderQuery) -> Result<Vec<RawFolder>> {
        self.record(PlatformCall::GetFoldersBetween(query.category_id))?;
        let mut listing = self.ancestors(query.category_id);
        listing.reverse();
        listing.extend(self.folders.iter().filter(|f| self.is_below(f, query.category_id)).cloned());
        Ok(listing)
    }

    async fn get_ancestor_folders(&self, query: &FolderQuery) -> Result<Vec<RawFolder>> {
        self.record(PlatformCall::GetAncestorFolders(query.category_id))?;
        Ok(self.ancestors(query.category_id))
    }
}
