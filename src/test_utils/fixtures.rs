//! Test fixtures for platform payloads and package assets.

use crate::core::{AssetType, ContentField, ContextTag};
use crate::package::{Category, PackageAsset, bldr_id};
use crate::platform::{RawAsset, RawAssetType, RawCategory, RawView, RawViews};

/// A raw platform asset of type `kind` in folder `category_id`.
///
/// `content` lands in the field the type keeps its content in; unknown types
/// get it in the top-level `content` field. The customer key is `key-<id>`.
pub fn raw_asset(id: u64, name: &str, kind: &str, category_id: u64, content: &str) -> RawAsset {
    let mut asset = RawAsset {
        id,
        customer_key: Some(format!("key-{id}")),
        name: name.to_string(),
        asset_type: RawAssetType {
            id: 0,
            name: kind.to_string(),
        },
        category: RawCategory {
            id: category_id,
            name: None,
            parent_id: None,
        },
        ..RawAsset::default()
    };

    match kind.parse::<AssetType>().map(AssetType::content_field) {
        Ok(ContentField::HtmlView) => {
            asset.views = Some(RawViews {
                html: Some(RawView {
                    content: Some(content.to_string()),
                }),
                text: None,
            });
        }
        Ok(ContentField::TextView) => {
            asset.views = Some(RawViews {
                html: None,
                text: Some(RawView {
                    content: Some(content.to_string()),
                }),
            });
        }
        Ok(ContentField::Content) | Err(_) => asset.content = Some(content.to_string()),
    }
    asset
}

/// A gathered Content Builder asset with a deterministic `bldrId`.
pub fn packaged_asset(id: u64, name: &str, folder_path: &str, content: &str) -> PackageAsset {
    PackageAsset {
        id: Some(id),
        bldr_id: bldr_id(ContextTag::ContentBuilder, &format!("id:{id}")),
        name: name.to_string(),
        customer_key: Some(format!("key-{id}")),
        asset_type: Some(AssetType::HtmlBlock),
        category: Some(Category::new(folder_path)),
        content: Some(content.to_string()),
        dependencies: Vec::new(),
    }
}

/// An HTML email mixing block, data extension and automation references.
pub const NEWSLETTER_HTML: &str = r#"<html><body>
%%=ContentBlockByName("Content Builder\Blocks\Header")=%%
%%[
  SET @rows = LookupRows("Subscribers", "Status", "Active")
  SET @count = DataExtensionRowCount("Subscribers")
]%%
<script runat="server">
  var qd = QueryDefinition.Init("refresh-subscribers");
</script>
%%=ContentBlockByID("501")=%%
</body></html>"#;
