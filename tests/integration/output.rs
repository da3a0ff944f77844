use bldr_cli::core::ContextTag;
use bldr_cli::gatherer::AssetGatherer;
use bldr_cli::package::{Package, PackageAssembler, bldr_id};
use bldr_cli::test_utils::{MockPlatform, raw_asset};
use serde_json::{Value, json};

use super::content_builder_folders;

async fn assembled() -> Package {
    let client = MockPlatform::new()
        .with_folders(content_builder_folders())
        .with_asset(raw_asset(
            10,
            "Welcome",
            "htmlemail",
            3,
            r#"%%[ SET @n = Lookup("Members", "Name", "Id", @id) ]%%"#,
        ));
    let gathered = AssetGatherer::new(&client).gather_asset_by_id(10, false).await.unwrap();
    let mut assembler = PackageAssembler::new(&client, gathered.into_package());
    assembler.assemble_transitive(1).await.unwrap();
    assembler.into_package()
}

#[tokio::test]
async fn test_package_json_shape() {
    let package = assembled().await;
    let value = serde_json::to_value(&package).unwrap();

    let members = bldr_id(ContextTag::DataExtension, "name:Members");
    let welcome = &value["contentBuilder"]["assets"][0];
    assert_eq!(welcome["id"], 10);
    assert_eq!(welcome["name"], "Welcome");
    assert_eq!(welcome["assetType"], "htmlemail");
    assert_eq!(welcome["category"], json!({ "folderPath": "Content Builder/Emails" }));
    assert_eq!(
        welcome["dependencies"],
        json!([{ "bldrId": members, "context": "dataExtension", "reference": "Lookup" }])
    );

    let data_extension = &value["dataExtension"]["assets"][0];
    assert_eq!(data_extension["bldrId"], members.as_str());
    assert_eq!(data_extension["name"], "Members");
    assert!(data_extension.get("content").is_none());
    assert!(value.get("automationStudio").is_none());
}

#[tokio::test]
async fn test_asset_without_references_keeps_empty_dependencies() {
    let client = MockPlatform::new()
        .with_folders(content_builder_folders())
        .with_asset(raw_asset(11, "Plain", "htmlemail", 3, "<p>hi</p>"));
    let gathered = AssetGatherer::new(&client).gather_asset_by_id(11, false).await.unwrap();
    let mut assembler = PackageAssembler::new(&client, gathered.into_package());
    assembler.assemble_transitive(1).await.unwrap();

    let value = serde_json::to_value(assembler.package()).unwrap();
    let plain = &value["contentBuilder"]["assets"][0];

    assert_eq!(plain["content"], "<p>hi</p>");
    assert_eq!(plain["dependencies"], json!([]));
}

#[tokio::test]
async fn test_package_reloads_with_indexes() {
    let package = assembled().await;
    let text = serde_json::to_string_pretty(&package).unwrap();

    let reloaded: Package = serde_json::from_str(&text).unwrap();

    assert_eq!(reloaded, package);
    let bucket = reloaded.bucket(ContextTag::ContentBuilder).unwrap();
    assert!(bucket.find_by_platform_id(10).is_some());
    assert!(bucket.find_by_customer_key("key-10").is_some());

    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert!(parsed.as_object().unwrap().keys().all(|key| key != "buckets"));
}
