//! Asset gathering.
//!
//! Fetches raw assets and their folders through a [`PlatformClient`] and
//! normalizes them into [`PackageAsset`]s: the content is pulled out of the
//! field that belongs to the asset's type and the folder id is replaced by the
//! full folder path.
//!
//! Missing identifiers fail with [`BldrError::MissingInput`] before any
//! platform call is made.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::{BldrError, ContextTag};
use crate::folder::FolderTree;
use crate::package::{Category, Package, PackageAsset, bldr_id};
use crate::platform::{AssetSearch, FolderQuery, FolderSearch, PlatformClient, RawAsset};

/// Assets gathered in one call, with the folders they were placed in.
#[derive(Debug, Clone, Default)]
pub struct GatheredAssets {
    /// Folders covering every gathered asset
    pub folders: FolderTree,
    /// Normalized assets, in platform order
    pub assets: Vec<PackageAsset>,
}

impl GatheredAssets {
    /// A package whose Content Builder bucket holds the gathered assets.
    #[must_use]
    pub fn into_package(self) -> Package {
        Package::from_assets(self.assets)
    }
}

/// Row of `bldr search assets` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssetSummary {
    /// Asset id
    #[serde(rename = "ID")]
    pub id: u64,
    /// Asset name
    pub name: String,
    /// External key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_key: Option<String>,
    /// Platform type name
    pub asset_type: String,
    /// Containing folder id
    #[serde(rename = "CategoryID")]
    pub category_id: u64,
}

impl From<&RawAsset> for AssetSummary {
    fn from(raw: &RawAsset) -> Self {
        Self {
            id: raw.id,
            name: raw.name.clone(),
            customer_key: raw.customer_key.clone(),
            asset_type: raw.asset_type.name.clone(),
            category_id: raw.category.id,
        }
    }
}

/// Row of `bldr search folders` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FolderSummary {
    /// Folder id
    #[serde(rename = "ID")]
    pub id: u64,
    /// Folder name
    pub name: String,
    /// Parent folder id
    #[serde(rename = "ParentID", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    /// Parent folder name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
}

/// Turn a raw asset into a package asset, deriving its folder path from `folders`.
///
/// Fails with [`BldrError::UnsupportedAssetType`] for types outside the
/// supported set and [`BldrError::InvalidFolderChain`] when the asset's folder
/// is missing from `folders`.
pub fn normalize_asset(raw: RawAsset, folders: &FolderTree) -> Result<PackageAsset, BldrError> {
    let kind = raw.kind()?;
    let folder = folders.get(raw.category.id).ok_or_else(|| BldrError::InvalidFolderChain {
        folder_id: raw.category.id,
        reason: format!("folder of asset {} is not part of the listing", raw.id),
    })?;
    let content = raw.content_for(kind).unwrap_or_default().to_string();

    Ok(PackageAsset {
        id: Some(raw.id),
        bldr_id: bldr_id(ContextTag::ContentBuilder, &format!("id:{}", raw.id)),
        name: raw.name,
        customer_key: raw.customer_key,
        asset_type: Some(kind),
        category: Some(Category::new(folder.folder_path())),
        content: Some(content),
        dependencies: Vec::new(),
    })
}

/// Gathers assets and folders through a platform client.
pub struct AssetGatherer<'c, C> {
    client: &'c C,
}

impl<'c, C: PlatformClient> AssetGatherer<'c, C> {
    /// Gatherer backed by `client`.
    pub const fn new(client: &'c C) -> Self {
        Self { client }
    }

    /// Fetch one asset by id.
    ///
    /// With `legacy`, `id` is first looked up as a legacy (Classic Content) id
    /// and then, if nothing matches, as an asset id.
    pub async fn gather_asset_by_id(&self, id: u64, legacy: bool) -> Result<GatheredAssets> {
        if id == 0 {
            return Err(BldrError::MissingInput {
                field: "assetId".to_string(),
            }
            .into());
        }

        let mut raw = None;
        if legacy {
            let found = self
                .client
                .get_by_legacy_id(id)
                .await
                .with_context(|| format!("Failed to look up legacy id {id}"))?;
            raw = found.items.into_iter().next();
            if raw.is_none() {
                debug!("No asset carries legacy id {id}, trying it as an asset id");
            }
        }
        if raw.is_none() {
            raw = self
                .client
                .get_by_asset_id(id)
                .await
                .with_context(|| format!("Failed to fetch asset {id}"))?;
        }
        let raw = raw.ok_or_else(|| BldrError::EmptyResult {
            operation: "getByAssetId".to_string(),
        })?;

        let folders = self.ancestor_tree(raw.category.id).await?;
        let asset = normalize_asset(raw, &folders)?;
        info!("Gathered asset {} ({})", asset.name, id);

        Ok(GatheredAssets {
            folders,
            assets: vec![asset],
        })
    }

    /// Fetch every supported asset in a folder and its subfolders.
    ///
    /// The Content Builder root itself is never listed, so passing the root
    /// gathers everything below it. Assets of unsupported types are skipped.
    pub async fn gather_assets_by_category_id(&self, category_id: u64) -> Result<GatheredAssets> {
        if category_id == 0 {
            return Err(BldrError::MissingInput {
                field: "categoryId".to_string(),
            }
            .into());
        }

        let context = ContextTag::ContentBuilder;
        let raw_folders = self
            .client
            .get_folders_between(&FolderQuery {
                content_type: context.content_type().to_string(),
                category_id,
            })
            .await
            .with_context(|| format!("Failed to list folders around {category_id}"))?;
        let folders = FolderTree::build(raw_folders)?;

        let folder_ids: Vec<u64> = folders
            .subtree_ids(category_id)
            .into_iter()
            .filter(|&id| {
                folders
                    .get(id)
                    .is_some_and(|f| !(f.is_root() && f.name == context.root_folder_name()))
            })
            .collect();
        debug!("Listing assets in {} folder(s) under {category_id}", folder_ids.len());

        let listing = self
            .client
            .get_assets_by_folder_ids(&folder_ids)
            .await
            .with_context(|| format!("Failed to list assets under folder {category_id}"))?;
        if listing.items.is_empty() {
            return Err(BldrError::EmptyResult {
                operation: "getAssetsByFolderIds".to_string(),
            }
            .into());
        }

        let mut assets = Vec::with_capacity(listing.items.len());
        for raw in listing.items {
            match normalize_asset(raw, &folders) {
                Ok(asset) => assets.push(asset),
                Err(BldrError::UnsupportedAssetType { asset_type }) => {
                    warn!("Skipping asset of unsupported type {asset_type}");
                }
                Err(e) => return Err(e.into()),
            }
        }
        info!("Gathered {} asset(s) under folder {category_id}", assets.len());

        Ok(GatheredAssets { folders, assets })
    }

    /// One asset by id, normalized, or `None` when the platform has no such
    /// asset or its type is unsupported.
    pub async fn fetch_asset(&self, id: u64) -> Result<Option<PackageAsset>> {
        let Some(raw) = self
            .client
            .get_by_asset_id(id)
            .await
            .with_context(|| format!("Failed to fetch asset {id}"))?
        else {
            return Ok(None);
        };
        self.normalize_supported(raw).await
    }

    /// Normalize `raw` after fetching its folder chain; `None` for unsupported types.
    pub async fn normalize_supported(&self, raw: RawAsset) -> Result<Option<PackageAsset>> {
        if let Err(e) = raw.kind() {
            debug!("Not packaging asset {}: {e}", raw.id);
            return Ok(None);
        }
        let folders = self.ancestor_tree(raw.category.id).await?;
        Ok(Some(normalize_asset(raw, &folders)?))
    }

    /// Raw search by name, or by customer key with `by_key`.
    pub async fn search_raw(&self, term: &str, by_key: bool) -> Result<Vec<RawAsset>> {
        let query = if by_key {
            AssetSearch::by_customer_key(term)
        } else {
            AssetSearch::by_name(term)
        };
        let found = self
            .client
            .search_assets(&query)
            .await
            .with_context(|| format!("Failed to search assets for '{term}'"))?;
        Ok(found.items)
    }

    /// Search assets by name, or by customer key with `by_key`.
    pub async fn search_assets(&self, term: &str, by_key: bool) -> Result<Vec<AssetSummary>> {
        let found = self.search_raw(term, by_key).await?;
        Ok(found.iter().map(AssetSummary::from).collect())
    }

    /// Search folders of `content_type` by name.
    pub async fn search_folders(&self, content_type: &str, term: &str) -> Result<Vec<FolderSummary>> {
        let response = self
            .client
            .search_folders(&FolderSearch {
                content_type: content_type.to_string(),
                search_key: "Name".to_string(),
                search_term: term.to_string(),
            })
            .await
            .with_context(|| format!("Failed to search folders for '{term}'"))?;

        if response.overall_status != "OK" {
            return Err(BldrError::RequestNotAccepted {
                operation: "searchFolders".to_string(),
                overall_status: response.overall_status,
            }
            .into());
        }

        Ok(response
            .results
            .into_iter()
            .map(|folder| FolderSummary {
                id: folder.id,
                name: folder.name,
                parent_id: folder.parent_id,
                parent_name: folder.parent_name,
            })
            .collect())
    }

    async fn ancestor_tree(&self, category_id: u64) -> Result<FolderTree> {
        let raw = self
            .client
            .get_ancestor_folders(&FolderQuery {
                content_type: ContextTag::ContentBuilder.content_type().to_string(),
                category_id,
            })
            .await
            .with_context(|| format!("Failed to fetch folder chain of {category_id}"))?;
        Ok(FolderTree::build(raw)?)
    }
}
