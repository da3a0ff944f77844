//! REST implementation of [`PlatformClient`].
//!
//! Talks to the platform's Content Builder asset and category endpoints with a
//! pre-issued bearer token. Folder lookups are served from the categories
//! endpoint, so only the `asset` content type is supported for folder search.
//! Requests are never retried here; a failure is reported once and the caller
//! decides what to do.

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tracing::debug;

use super::{
    AssetSearch, FolderQuery, FolderSearch, FolderSearchResponse, ItemList, PlatformClient,
    RawAsset, RawFolder,
};
use crate::config::PlatformConfig;
use crate::constants::ASSET_PAGE_SIZE;
use crate::core::BldrError;

const ASSETS_PATH: &str = "asset/v1/content/assets";
const ASSET_QUERY_PATH: &str = "asset/v1/content/assets/query";
const CATEGORIES_PATH: &str = "asset/v1/content/categories";

/// Platform client over the REST API.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryDto {
    id: u64,
    name: String,
    #[serde(default)]
    parent_id: u64,
}

impl From<CategoryDto> for RawFolder {
    fn from(dto: CategoryDto) -> Self {
        // The categories endpoint marks roots with parentId 0
        let parent_id = (dto.parent_id != 0).then_some(dto.parent_id);
        RawFolder::new(dto.id, dto.name, parent_id)
    }
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    count: Option<usize>,
}

impl RestClient {
    /// Create a client for `base_url` authenticating with `token`.
    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Create a client from the `[platform]` config section.
    ///
    /// The token is read from the environment variable named by `token_env`.
    pub fn from_config(config: &PlatformConfig) -> Result<Self> {
        let base_url = config.base_url.as_deref().ok_or_else(|| BldrError::ConfigError {
            message: "platform.base_url is not set".to_string(),
        })?;
        let token = std::env::var(&config.token_env).map_err(|_| BldrError::ConfigError {
            message: format!("environment variable {} is not set", config.token_env),
        })?;

        Self::new(base_url, token, config.timeout())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn check(operation: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let status_text = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown status").to_string()
        } else {
            body
        };

        Err(BldrError::UpstreamStatus {
            operation: operation.to_string(),
            status: status.as_u16(),
            status_text,
        }
        .into())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        debug!("GET {path} ({operation})");
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send {operation} request"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check(operation, response).await?;
        let body = response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode {operation} response"))?;
        Ok(Some(body))
    }

    async fn query_assets(&self, operation: &str, query: Value) -> Result<ItemList<RawAsset>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            debug!("POST {ASSET_QUERY_PATH} ({operation}) page {page}");
            let body = json!({
                "page": { "page": page, "pageSize": ASSET_PAGE_SIZE },
                "query": query,
            });
            let response = self
                .http
                .post(self.url(ASSET_QUERY_PATH))
                .bearer_auth(&self.token)
                .json(&body)
                .send()
                .await
                .with_context(|| format!("Failed to send {operation} request"))?;
            let response = Self::check(operation, response).await?;
            let batch: Page<RawAsset> = response
                .json()
                .await
                .with_context(|| format!("Failed to decode {operation} response"))?;

            let received = batch.items.len();
            items.extend(batch.items);

            let total = batch.count.unwrap_or(items.len());
            if received < ASSET_PAGE_SIZE || items.len() >= total {
                return Ok(ItemList {
                    count: Some(items.len()),
                    items,
                });
            }
            page += 1;
        }
    }

    async fn get_category(&self, id: u64) -> Result<Option<RawFolder>> {
        let path = format!("{CATEGORIES_PATH}/{id}");
        let category: Option<CategoryDto> = self.get_json("getCategory", &path, &[]).await?;
        Ok(category.map(RawFolder::from))
    }

    async fn list_categories(&self, operation: &str, filter: String) -> Result<Vec<RawFolder>> {
        let mut folders = Vec::new();
        let mut page = 1;

        loop {
            let query = [
                ("$filter", filter.clone()),
                ("$page", page.to_string()),
                ("$pagesize", ASSET_PAGE_SIZE.to_string()),
            ];
            let batch: Page<CategoryDto> = self
                .get_json(operation, CATEGORIES_PATH, &query)
                .await?
                .unwrap_or(Page {
                    items: Vec::new(),
                    count: Some(0),
                });

            let received = batch.items.len();
            folders.extend(batch.items.into_iter().map(RawFolder::from));

            let total = batch.count.unwrap_or(folders.len());
            if received < ASSET_PAGE_SIZE || folders.len() >= total {
                return Ok(folders);
            }
            page += 1;
        }
    }

    async fn ancestors(&self, category_id: u64) -> Result<Vec<RawFolder>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(category_id);

        while let Some(id) = next {
            if !seen.insert(id) {
                return Err(BldrError::InvalidFolderChain {
                    folder_id: category_id,
                    reason: format!("folder {id} appears twice in its own ancestry"),
                }
                .into());
            }
            let folder = self.get_category(id).await?.ok_or_else(|| BldrError::UpstreamStatus {
                operation: "getCategory".to_string(),
                status: StatusCode::NOT_FOUND.as_u16(),
                status_text: format!("folder {id} not found"),
            })?;
            next = folder.parent_id;
            chain.push(folder);
        }

        Ok(chain)
    }
}

impl PlatformClient for RestClient {
    async fn get_by_asset_id(&self, id: u64) -> Result<Option<RawAsset>> {
        let path = format!("{ASSETS_PATH}/{id}");
        self.get_json("getByAssetId", &path, &[]).await
    }

    async fn get_by_legacy_id(&self, legacy_id: u64) -> Result<ItemList<RawAsset>> {
        let query = json!({
            "property": "data.email.legacy.legacyId",
            "simpleOperator": "equal",
            "value": legacy_id,
        });
        self.query_assets("getByLegacyId", query).await
    }

    async fn search_assets(&self, search: &AssetSearch) -> Result<ItemList<RawAsset>> {
        let query = json!({
            "property": search.search_key,
            "simpleOperator": "equal",
            "value": search.search_term,
        });
        self.query_assets("searchAssets", query).await
    }

    async fn get_assets_by_folder_ids(&self, ids: &[u64]) -> Result<ItemList<RawAsset>> {
        if ids.is_empty() {
            return Ok(ItemList::default());
        }
        let query = json!({
            "property": "category.id",
            "simpleOperator": "in",
            "value": ids,
        });
        self.query_assets("getAssetsByFolderIds", query).await
    }

    async fn search_folders(&self, search: &FolderSearch) -> Result<FolderSearchResponse> {
        if search.content_type != "asset" {
            return Ok(FolderSearchResponse {
                overall_status: format!(
                    "Error: content type '{}' is not served by the categories endpoint",
                    search.content_type
                ),
                results: Vec::new(),
            });
        }

        let term = search.search_term.replace('\'', "''");
        let filter = format!("{} like '{}'", search.search_key.to_lowercase(), term);
        let mut results = self.list_categories("searchFolders", filter).await?;

        // Fill in parent names so callers can show where each match lives
        for folder in &mut results {
            if let Some(parent_id) = folder.parent_id {
                folder.parent_name = self.get_category(parent_id).await?.map(|parent| parent.name);
            }
        }

        Ok(FolderSearchResponse {
            overall_status: "OK".to_string(),
            results,
        })
    }

    async fn get_folders_between(&self, query: &FolderQuery) -> Result<Vec<RawFolder>> {
        let mut folders = self.ancestors(query.category_id).await?;
        let mut seen: HashSet<u64> = folders.iter().map(|f| f.id).collect();
        let mut queue = VecDeque::from([query.category_id]);

        while let Some(parent_id) = queue.pop_front() {
            let children = self
                .list_categories("getFoldersBetween", format!("parentId eq {parent_id}"))
                .await?;
            for child in children {
                if seen.insert(child.id) {
                    queue.push_back(child.id);
                    folders.push(child);
                }
            }
        }

        Ok(folders)
    }

    async fn get_ancestor_folders(&self, query: &FolderQuery) -> Result<Vec<RawFolder>> {
        self.ancestors(query.category_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_category_has_no_parent() {
        let root: RawFolder = CategoryDto {
            id: 1,
            name: "Content Builder".to_string(),
            parent_id: 0,
        }
        .into();
        assert_eq!(root.parent_id, None);

        let child: RawFolder = CategoryDto {
            id: 2,
            name: "Emails".to_string(),
            parent_id: 1,
        }
        .into();
        assert_eq!(child.parent_id, Some(1));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client =
            RestClient::new("https://example.rest.invalid/", "token", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            client.url(ASSETS_PATH),
            "https://example.rest.invalid/asset/v1/content/assets"
        );
    }

    #[test]
    fn test_from_config_requires_base_url() {
        let config = PlatformConfig::default();
        let err = RestClient::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("platform.base_url"));
    }
}
