//! Identity resolution for extracted references.
//!
//! Decides what a reference argument points at. A reference either names an
//! object already in the package (`exists`) or an external object, in which
//! case the resolver hands back a payload for the assembler to merge.
//!
//! # Lookup Order
//!
//! | Class | Order |
//! |---|---|
//! | asset by id | packaged platform id → packaged `bldrId` → platform fetch → placeholder |
//! | asset by name path | packaged `A\B\Name` → packaged `A\\B\\Name` → platform search → placeholder |
//! | asset by customer key | packaged key → platform search → placeholder |
//! | data extension, automation | placeholder |
//!
//! A name path that only matches with doubled separators is accepted but
//! flagged for review, unless the match is a placeholder from an earlier
//! unresolved reference. An argument that is already the `bldrId` of an object
//! in the target bucket (content rewritten by an earlier run) resolves to that
//! object, which keeps repeated runs from adding entries.
//!
//! Platform failures propagate; the resolver never invents an identity for a
//! reference it could not look up.

use anyhow::Result;
use tracing::debug;

use crate::constants::{ESCAPED_NAME_PATH_SEPARATOR, FOLDER_PATH_SEPARATOR, NAME_PATH_SEPARATOR};
use crate::core::ContextTag;
use crate::gatherer::AssetGatherer;
use crate::package::{Category, Package, PackageAsset, PathMatch, bldr_id};
use crate::platform::PlatformClient;
use crate::references::{RawMatch, ReferenceClass};

/// Outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Bucket the target lives in
    pub context: ContextTag,
    /// Package-local id to write into the content
    pub bldr_id: String,
    /// The object to merge, for external targets
    pub payload: Option<PackageAsset>,
    /// The match relied on doubled separators
    pub needs_review: bool,
}

impl Resolution {
    fn existing(context: ContextTag, asset: &PackageAsset) -> Self {
        Self {
            context,
            bldr_id: asset.bldr_id.clone(),
            payload: None,
            needs_review: false,
        }
    }

    fn external(context: ContextTag, asset: PackageAsset) -> Self {
        Self {
            context,
            bldr_id: asset.bldr_id.clone(),
            payload: Some(asset),
            needs_review: false,
        }
    }

    fn flagged(mut self, needs_review: bool) -> Self {
        self.needs_review = needs_review;
        self
    }

    /// Whether the target was already in the package.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.payload.is_none()
    }
}

/// Resolves references against a package and the platform.
pub struct IdentityResolver<'c, C> {
    gatherer: AssetGatherer<'c, C>,
}

impl<'c, C: PlatformClient> IdentityResolver<'c, C> {
    /// Resolver backed by `client`.
    pub const fn new(client: &'c C) -> Self {
        Self {
            gatherer: AssetGatherer::new(client),
        }
    }

    /// Resolve `m`, found in `owner`'s content, against `package`.
    pub async fn resolve(
        &self,
        m: &RawMatch<'_>,
        owner: &PackageAsset,
        package: &Package,
    ) -> Result<Resolution> {
        let class = m.function.class;
        let context = class.context();
        let value = m.value();

        if let Some(asset) = package.bucket(context).and_then(|b| b.find_by_bldr_id(value)) {
            debug!("{} in '{}' already carries package id {value}", m.function.name, owner.name);
            return Ok(Resolution::existing(context, asset));
        }

        let resolution = match class {
            ReferenceClass::AssetById => self.resolve_by_id(value, package).await?,
            ReferenceClass::AssetByName => self.resolve_by_name(value, package).await?,
            ReferenceClass::AssetByKey => self.resolve_by_key(value, package).await?,
            ReferenceClass::DataExtensionByName => Resolution::external(
                context,
                PackageAsset::placeholder(bldr_id(context, &format!("name:{value}")), value),
            ),
            ReferenceClass::DataExtensionByKey | ReferenceClass::AutomationByKey => {
                let mut payload =
                    PackageAsset::placeholder(bldr_id(context, &format!("key:{value}")), value);
                payload.customer_key = Some(value.to_string());
                Resolution::external(context, payload)
            }
        };

        debug!(
            "{}({}) in '{}' → {} {} ({})",
            m.function.name,
            m.literal,
            owner.name,
            context,
            resolution.bldr_id,
            if resolution.exists() { "packaged" } else { "external" }
        );
        Ok(resolution)
    }

    async fn resolve_by_id(&self, value: &str, package: &Package) -> Result<Resolution> {
        let context = ContextTag::ContentBuilder;
        let bucket = package.bucket(context);

        let Ok(id) = value.trim().parse::<u64>() else {
            return Ok(Resolution::external(
                context,
                PackageAsset::placeholder(bldr_id(context, &format!("id:{value}")), value),
            ));
        };

        if let Some(asset) = bucket.and_then(|b| b.find_by_platform_id(id)) {
            return Ok(Resolution::existing(context, asset));
        }

        if let Some(asset) = self.gatherer.fetch_asset(id).await? {
            return Ok(Resolution::external(context, asset));
        }

        let mut payload = PackageAsset::placeholder(bldr_id(context, &format!("id:{id}")), value);
        payload.id = Some(id);
        Ok(Resolution::external(context, payload))
    }

    async fn resolve_by_name(&self, value: &str, package: &Package) -> Result<Resolution> {
        let context = ContextTag::ContentBuilder;

        if let Some((asset, how)) =
            package.bucket(context).and_then(|b| b.find_by_name_path(value))
        {
            // Placeholders carry the literal's own folders, so they never need review.
            let needs_review = how == PathMatch::Escaped && asset.id.is_some();
            return Ok(Resolution::existing(context, asset).flagged(needs_review));
        }

        let segments: Vec<&str> =
            value.split(NAME_PATH_SEPARATOR).filter(|s| !s.is_empty()).collect();
        let Some((&name, folders)) = segments.split_last() else {
            return Ok(Resolution::external(
                context,
                PackageAsset::placeholder(bldr_id(context, &format!("path:{value}")), value),
            ));
        };

        for raw in self.gatherer.search_raw(name, false).await? {
            let Some(candidate) = self.gatherer.normalize_supported(raw).await? else {
                continue;
            };
            let how = if candidate.name_path(NAME_PATH_SEPARATOR).as_deref() == Some(value) {
                PathMatch::Single
            } else if candidate.name_path(ESCAPED_NAME_PATH_SEPARATOR).as_deref() == Some(value) {
                PathMatch::Escaped
            } else {
                continue;
            };
            let needs_review = how == PathMatch::Escaped;

            if let Some(asset) = package.bucket(context).and_then(|b| b.find_by_bldr_id(&candidate.bldr_id)) {
                return Ok(Resolution::existing(context, asset).flagged(needs_review));
            }
            return Ok(Resolution::external(context, candidate).flagged(needs_review));
        }

        let mut payload = PackageAsset::placeholder(bldr_id(context, &format!("path:{value}")), name);
        if !folders.is_empty() {
            payload.category = Some(Category::new(folders.join(FOLDER_PATH_SEPARATOR)));
        }
        Ok(Resolution::external(context, payload))
    }

    async fn resolve_by_key(&self, value: &str, package: &Package) -> Result<Resolution> {
        let context = ContextTag::ContentBuilder;

        if let Some(asset) = package.bucket(context).and_then(|b| b.find_by_customer_key(value)) {
            return Ok(Resolution::existing(context, asset));
        }

        for raw in self.gatherer.search_raw(value, true).await? {
            if raw.customer_key.as_deref() != Some(value) {
                continue;
            }
            let Some(candidate) = self.gatherer.normalize_supported(raw).await? else {
                continue;
            };
            if let Some(asset) = package.bucket(context).and_then(|b| b.find_by_bldr_id(&candidate.bldr_id)) {
                return Ok(Resolution::existing(context, asset));
            }
            return Ok(Resolution::external(context, candidate));
        }

        let mut payload = PackageAsset::placeholder(bldr_id(context, &format!("key:{value}")), value);
        payload.customer_key = Some(value.to_string());
        Ok(Resolution::external(context, payload))
    }
}
