use bldr_cli::core::ContextTag;
use bldr_cli::gatherer::AssetGatherer;
use bldr_cli::package::PackageAssembler;
use bldr_cli::test_utils::{MockPlatform, PlatformCall, raw_asset};

use super::content_builder_folders;

#[tokio::test]
async fn test_category_gathers_subfolders_only() {
    let client = MockPlatform::new()
        .with_folders(content_builder_folders())
        .with_asset(raw_asset(10, "Spring", "htmlemail", 3, "spring"))
        .with_asset(raw_asset(11, "Winter", "textonlyemail", 4, "winter"))
        .with_asset(raw_asset(12, "Logo", "png", 3, ""))
        .with_asset(raw_asset(20, "Header", "htmlblock", 2, "header"));

    let gathered = AssetGatherer::new(&client).gather_assets_by_category_id(3).await.unwrap();

    let names: Vec<&str> = gathered.assets.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Spring", "Winter"]);
    let paths: Vec<&str> = gathered
        .assets
        .iter()
        .map(|a| a.category.as_ref().unwrap().folder_path.as_str())
        .collect();
    assert_eq!(paths, ["Content Builder/Emails", "Content Builder/Emails/Archive"]);
    assert!(client.calls().contains(&PlatformCall::GetAssetsByFolderIds(vec![3, 4])));
}

#[tokio::test]
async fn test_root_category_skips_root_folder_listing() {
    let client = MockPlatform::new()
        .with_folders(content_builder_folders())
        .with_asset(raw_asset(20, "Header", "htmlblock", 2, "header"));

    let gathered = AssetGatherer::new(&client).gather_assets_by_category_id(1).await.unwrap();

    assert_eq!(gathered.assets.len(), 1);
    assert!(client.calls().contains(&PlatformCall::GetAssetsByFolderIds(vec![2, 3, 4])));
}

#[tokio::test]
async fn test_sibling_emails_share_one_block() {
    let client = MockPlatform::new()
        .with_folders(content_builder_folders())
        .with_asset(raw_asset(10, "Spring", "htmlemail", 3, r#"%%=ContentBlockByID("20")=%%"#))
        .with_asset(raw_asset(11, "Summer", "htmlemail", 3, r#"%%=ContentBlockById('20')=%%"#))
        .with_asset(raw_asset(20, "Header", "htmlblock", 2, "header"));

    let gathered = AssetGatherer::new(&client).gather_assets_by_category_id(3).await.unwrap();
    let mut assembler = PackageAssembler::new(&client, gathered.into_package());
    let report = assembler.assemble_transitive(3).await.unwrap();

    let package = assembler.package();
    assert_eq!(package.assets(ContextTag::ContentBuilder).len(), 3);
    assert_eq!(report.new_dependencies.len(), 1);

    let fetches = client
        .calls()
        .iter()
        .filter(|call| matches!(call, PlatformCall::GetByAssetId(20)))
        .count();
    assert_eq!(fetches, 1);

    let header_id = &package.assets(ContextTag::ContentBuilder)[2].bldr_id;
    let summer = &package.assets(ContextTag::ContentBuilder)[1];
    assert_eq!(
        summer.content.as_deref(),
        Some(format!("%%=ContentBlockById('{header_id}')=%%").as_str())
    );
}

#[tokio::test]
async fn test_empty_folder_is_an_error() {
    let client = MockPlatform::new().with_folders(content_builder_folders());

    let err = AssetGatherer::new(&client).gather_assets_by_category_id(4).await.unwrap_err();

    assert!(err.to_string().contains("No items returned from getAssetsByFolderIds"));
}
