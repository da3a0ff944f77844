//! The in-progress package.
//!
//! A [`Package`] maps each [`ContextTag`] to a [`Bucket`] of objects. Content
//! Builder buckets hold fully gathered assets; data extension and automation
//! buckets hold the minimal payloads the resolver builds for objects that live
//! outside Content Builder.
//!
//! Every object carries a package-local id (`bldrId`) derived from its context
//! and external identity, so the same platform object always gets the same id
//! and inserting it twice is a no-op.
//!
//! # Output Format
//!
//! ```json
//! {
//!   "contentBuilder": {
//!     "assets": [
//!       {
//!         "id": 12345,
//!         "bldrId": "3f1c0a9d8e7b6a5f4e3d2c1b",
//!         "name": "Header",
//!         "assetType": "htmlblock",
//!         "category": { "folderPath": "Content Builder/Blocks" },
//!         "content": "%%=ContentBlockByID(\"9b8a7c6d5e4f3a2b1c0d9e8f\")=%%",
//!         "dependencies": [
//!           { "bldrId": "9b8a7c6d5e4f3a2b1c0d9e8f", "context": "contentBuilder", "reference": "ContentBlockByID" }
//!         ]
//!       }
//!     ]
//!   },
//!   "dataExtension": { "assets": [ { "bldrId": "...", "name": "Orders", "dependencies": [] } ] }
//! }
//! ```

pub mod assembler;
pub mod graph;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

use crate::constants::{
    BLDR_ID_LENGTH, ESCAPED_NAME_PATH_SEPARATOR, FOLDER_PATH_SEPARATOR, NAME_PATH_SEPARATOR,
};
use crate::core::{AssetType, ContextTag};

pub use assembler::{FailurePolicy, PackageAssembler, PassReport, ReviewFlag};
pub use graph::DependencyGraph;

/// Package-local id for the object identified by `identity` in `context`.
///
/// Stable across runs: the first [`BLDR_ID_LENGTH`] hex digits of
/// `sha256("<context>:<identity>")`.
#[must_use]
pub fn bldr_id(context: ContextTag, identity: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(context.key().as_bytes());
    hasher.update(b":");
    hasher.update(identity.as_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(BLDR_ID_LENGTH);
    id
}

/// Folder an asset lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Root-to-leaf folder names joined with `/`
    pub folder_path: String,
}

impl Category {
    /// Category for a `/`-joined folder path.
    pub fn new(folder_path: impl Into<String>) -> Self {
        Self {
            folder_path: folder_path.into(),
        }
    }
}

/// One outgoing reference of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    /// Package-local id of the target
    pub bldr_id: String,
    /// Bucket the target lives in
    pub context: ContextTag,
    /// The reference function that produced the edge
    pub reference: String,
}

/// An object in the package.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageAsset {
    /// Platform id, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Package-local id
    pub bldr_id: String,
    /// Display name
    pub name: String,
    /// External key, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_key: Option<String>,
    /// Asset type; absent for data extensions, automations and placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<AssetType>,
    /// Containing folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Scripting content; rewritten in place by the assembler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Outgoing references, in discovery order
    #[serde(default)]
    pub dependencies: Vec<DependencyEdge>,
}

impl PackageAsset {
    /// Minimal payload for an object known only by how it was referenced.
    pub fn placeholder(bldr_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bldr_id: bldr_id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// `Folder\Sub\Name` path using `separator` between segments.
    ///
    /// `None` when the asset has no category.
    #[must_use]
    pub fn name_path(&self, separator: &str) -> Option<String> {
        let category = self.category.as_ref()?;
        let folders = category.folder_path.replace(FOLDER_PATH_SEPARATOR, separator);
        if folders.is_empty() {
            return Some(self.name.clone());
        }
        Some(format!("{folders}{separator}{}", self.name))
    }
}

/// How a name path matched an indexed asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatch {
    /// Matched with single `\` separators
    Single,
    /// Matched only with doubled `\\` separators
    Escaped,
}

/// Objects of one context with lookup indexes.
///
/// Indexes are maintained on insert; the first object to claim a platform id,
/// customer key or path keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    assets: Vec<PackageAsset>,
    by_bldr_id: HashMap<String, usize>,
    by_platform_id: HashMap<u64, usize>,
    by_customer_key: HashMap<String, usize>,
    by_name_path: HashMap<String, usize>,
    by_escaped_name_path: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct BucketRepr {
    #[serde(default)]
    assets: Vec<PackageAsset>,
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Bucket", 1)?;
        state.serialize_field("assets", &self.assets)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Bucket {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = BucketRepr::deserialize(deserializer)?;
        let mut bucket = Self::default();
        for asset in repr.assets {
            bucket.insert(asset);
        }
        Ok(bucket)
    }
}

impl Bucket {
    /// Insert `asset` unless an object with the same `bldrId` is present.
    ///
    /// Returns whether the asset was added.
    pub fn insert(&mut self, asset: PackageAsset) -> bool {
        if self.by_bldr_id.contains_key(&asset.bldr_id) {
            return false;
        }

        let index = self.assets.len();
        self.by_bldr_id.insert(asset.bldr_id.clone(), index);
        if let Some(id) = asset.id {
            self.by_platform_id.entry(id).or_insert(index);
        }
        if let Some(key) = &asset.customer_key {
            self.by_customer_key.entry(key.clone()).or_insert(index);
        }
        if let Some(path) = asset.name_path(NAME_PATH_SEPARATOR) {
            self.by_name_path.entry(path).or_insert(index);
        }
        if let Some(path) = asset.name_path(ESCAPED_NAME_PATH_SEPARATOR) {
            self.by_escaped_name_path.entry(path).or_insert(index);
        }
        self.assets.push(asset);
        true
    }

    /// Objects in insertion order.
    #[must_use]
    pub fn assets(&self) -> &[PackageAsset] {
        &self.assets
    }

    /// Object at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PackageAsset> {
        self.assets.get(index)
    }

    /// Object by package-local id.
    #[must_use]
    pub fn find_by_bldr_id(&self, bldr_id: &str) -> Option<&PackageAsset> {
        self.by_bldr_id.get(bldr_id).map(|&i| &self.assets[i])
    }

    /// Object by platform id.
    #[must_use]
    pub fn find_by_platform_id(&self, id: u64) -> Option<&PackageAsset> {
        self.by_platform_id.get(&id).map(|&i| &self.assets[i])
    }

    /// Object by customer key.
    #[must_use]
    pub fn find_by_customer_key(&self, key: &str) -> Option<&PackageAsset> {
        self.by_customer_key.get(key).map(|&i| &self.assets[i])
    }

    /// Object by `Folder\Name` path, falling back to `Folder\\Name`.
    #[must_use]
    pub fn find_by_name_path(&self, path: &str) -> Option<(&PackageAsset, PathMatch)> {
        if let Some(&i) = self.by_name_path.get(path) {
            return Some((&self.assets[i], PathMatch::Single));
        }
        self.by_escaped_name_path.get(path).map(|&i| (&self.assets[i], PathMatch::Escaped))
    }

    /// Replace the content and dependency list of the object at `index`.
    ///
    /// Indexed fields are untouched, so the indexes stay valid.
    pub fn set_resolution(
        &mut self,
        index: usize,
        content: Option<String>,
        dependencies: Vec<DependencyEdge>,
    ) -> bool {
        match self.assets.get_mut(index) {
            Some(asset) => {
                asset.content = content;
                asset.dependencies = dependencies;
                true
            }
            None => false,
        }
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Context tag → bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Package {
    buckets: BTreeMap<ContextTag, Bucket>,
}

impl Package {
    /// An empty package.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A package whose Content Builder bucket holds `assets`.
    pub fn from_assets(assets: impl IntoIterator<Item = PackageAsset>) -> Self {
        let mut package = Self::new();
        for asset in assets {
            package.insert(ContextTag::ContentBuilder, asset);
        }
        package
    }

    /// Bucket for `context`, if anything was ever inserted there.
    #[must_use]
    pub fn bucket(&self, context: ContextTag) -> Option<&Bucket> {
        self.buckets.get(&context)
    }

    /// Bucket for `context`, created on demand.
    pub fn bucket_mut(&mut self, context: ContextTag) -> &mut Bucket {
        self.buckets.entry(context).or_default()
    }

    /// Objects of `context`, empty when the bucket does not exist.
    #[must_use]
    pub fn assets(&self, context: ContextTag) -> &[PackageAsset] {
        self.bucket(context).map(Bucket::assets).unwrap_or_default()
    }

    /// Insert into the bucket for `context`. See [`Bucket::insert`].
    pub fn insert(&mut self, context: ContextTag, asset: PackageAsset) -> bool {
        self.bucket_mut(context).insert(asset)
    }

    /// Whether `bldr_id` is present in the bucket for `context`.
    #[must_use]
    pub fn contains(&self, context: ContextTag, bldr_id: &str) -> bool {
        self.bucket(context).is_some_and(|b| b.find_by_bldr_id(bldr_id).is_some())
    }

    /// Non-empty buckets in context order.
    pub fn iter(&self) -> impl Iterator<Item = (ContextTag, &Bucket)> {
        self.buckets
            .iter()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(&context, bucket)| (context, bucket))
    }

    /// Total number of objects across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Bucket::len).sum()
    }

    /// Whether every bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: u64, name: &str, folder_path: &str) -> PackageAsset {
        PackageAsset {
            id: Some(id),
            bldr_id: bldr_id(ContextTag::ContentBuilder, &format!("id:{id}")),
            name: name.to_string(),
            customer_key: Some(format!("key-{id}")),
            asset_type: Some(AssetType::HtmlBlock),
            category: Some(Category::new(folder_path)),
            content: Some(String::new()),
            dependencies: Vec::new(),
        }
    }

    #[test]
    fn test_bldr_id_is_deterministic_and_context_scoped() {
        let first = bldr_id(ContextTag::DataExtension, "name:Orders");
        let second = bldr_id(ContextTag::DataExtension, "name:Orders");
        let other = bldr_id(ContextTag::AutomationStudio, "name:Orders");

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.len(), BLDR_ID_LENGTH);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut package = Package::new();
        assert!(package.insert(ContextTag::ContentBuilder, asset(1, "A", "Content Builder")));
        assert!(!package.insert(ContextTag::ContentBuilder, asset(1, "A", "Content Builder")));

        assert_eq!(package.assets(ContextTag::ContentBuilder).len(), 1);
        assert_eq!(package.len(), 1);
    }

    #[test]
    fn test_indexes() {
        let mut bucket = Bucket::default();
        bucket.insert(asset(7, "Header", "Content Builder/Blocks"));

        assert_eq!(bucket.find_by_platform_id(7).unwrap().name, "Header");
        assert_eq!(bucket.find_by_customer_key("key-7").unwrap().id, Some(7));
        let expected = bucket.get(0).unwrap().bldr_id.clone();
        assert!(bucket.find_by_bldr_id(&expected).is_some());
        assert!(bucket.find_by_platform_id(8).is_none());
    }

    #[test]
    fn test_name_path_single_then_escaped() {
        let mut bucket = Bucket::default();
        bucket.insert(asset(1, "AssetName", "Folder1/Folder2"));

        let (_, how) = bucket.find_by_name_path(r"Folder1\Folder2\AssetName").unwrap();
        assert_eq!(how, PathMatch::Single);

        let (found, how) = bucket.find_by_name_path(r"Folder1\\Folder2\\AssetName").unwrap();
        assert_eq!(how, PathMatch::Escaped);
        assert_eq!(found.id, Some(1));

        assert!(bucket.find_by_name_path(r"Folder1\AssetName").is_none());
    }

    #[test]
    fn test_set_resolution_keeps_indexes() {
        let mut bucket = Bucket::default();
        bucket.insert(asset(3, "Email", "Content Builder"));

        let edge = DependencyEdge {
            bldr_id: "abc".to_string(),
            context: ContextTag::DataExtension,
            reference: "Lookup".to_string(),
        };
        assert!(bucket.set_resolution(0, Some("rewritten".to_string()), vec![edge.clone()]));
        assert!(!bucket.set_resolution(5, None, Vec::new()));

        let stored = bucket.find_by_platform_id(3).unwrap();
        assert_eq!(stored.content.as_deref(), Some("rewritten"));
        assert_eq!(stored.dependencies, vec![edge]);
    }

    #[test]
    fn test_json_shape() {
        let mut package = Package::from_assets([asset(5, "Block", "Content Builder")]);
        package.insert(
            ContextTag::DataExtension,
            PackageAsset::placeholder("de-1", "Orders"),
        );

        let value = serde_json::to_value(&package).unwrap();
        let block = &value["contentBuilder"]["assets"][0];
        assert_eq!(block["id"], 5);
        assert_eq!(block["assetType"], "htmlblock");
        assert_eq!(block["category"]["folderPath"], "Content Builder");
        assert_eq!(value["dataExtension"]["assets"][0]["name"], "Orders");
        assert!(value["dataExtension"]["assets"][0].get("content").is_none());

        let restored: Package = serde_json::from_value(value).unwrap();
        assert_eq!(restored, package);
        assert!(restored.bucket(ContextTag::ContentBuilder).unwrap().find_by_platform_id(5).is_some());
    }
}
