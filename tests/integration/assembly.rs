use bldr_cli::core::ContextTag;
use bldr_cli::gatherer::AssetGatherer;
use bldr_cli::package::{DependencyGraph, FailurePolicy, PackageAssembler, bldr_id};
use bldr_cli::test_utils::{MockPlatform, NEWSLETTER_HTML, PlatformCall, raw_asset};
use std::collections::HashSet;

use super::content_builder_folders;

fn newsletter_platform() -> MockPlatform {
    MockPlatform::new()
        .with_folders(content_builder_folders())
        .with_asset(raw_asset(100, "Newsletter", "htmlemail", 3, NEWSLETTER_HTML))
        .with_asset(raw_asset(200, "Header", "htmlblock", 2, r#"%%=ContentBlockByKey("key-501")=%%"#))
        .with_asset(raw_asset(501, "Footer", "htmlblock", 2, "<footer/>"))
}

#[tokio::test]
async fn test_newsletter_resolves_every_reference() {
    let client = newsletter_platform();
    let gathered = AssetGatherer::new(&client).gather_asset_by_id(100, false).await.unwrap();

    let mut assembler = PackageAssembler::new(&client, gathered.into_package());
    let report = assembler.assemble_transitive(5).await.unwrap();
    let package = assembler.into_package();

    let header = bldr_id(ContextTag::ContentBuilder, "id:200");
    let footer = bldr_id(ContextTag::ContentBuilder, "id:501");
    let subscribers = bldr_id(ContextTag::DataExtension, "name:Subscribers");
    let refresh = bldr_id(ContextTag::AutomationStudio, "key:refresh-subscribers");

    // Newsletter, Footer and Header; the Header's key reference finds the
    // already merged Footer instead of adding a second copy.
    assert_eq!(package.assets(ContextTag::ContentBuilder).len(), 3);
    assert_eq!(package.assets(ContextTag::DataExtension).len(), 1);
    assert_eq!(package.assets(ContextTag::AutomationStudio).len(), 1);
    assert_eq!(report.processed, 3);
    assert!(report.review.is_empty());

    let newsletter = &package.assets(ContextTag::ContentBuilder)[0];
    let content = newsletter.content.as_deref().unwrap();
    assert!(content.contains(&format!(r#"ContentBlockByName("{header}")"#)));
    assert!(content.contains(&format!(r#"LookupRows("{subscribers}", "Status", "Active")"#)));
    assert!(content.contains(&format!(r#"DataExtensionRowCount("{subscribers}")"#)));
    assert!(content.contains(&format!(r#"QueryDefinition.Init("{refresh}")"#)));
    assert!(content.contains(&format!(r#"ContentBlockByID("{footer}")"#)));
    assert!(!content.contains("Subscribers\""));

    let targets: HashSet<&str> =
        newsletter.dependencies.iter().map(|edge| edge.bldr_id.as_str()).collect();
    assert_eq!(
        targets,
        HashSet::from([header.as_str(), footer.as_str(), subscribers.as_str(), refresh.as_str()])
    );

    let header_asset = package
        .bucket(ContextTag::ContentBuilder)
        .and_then(|b| b.find_by_bldr_id(&header))
        .unwrap();
    assert_eq!(
        header_asset.content.as_deref(),
        Some(format!(r#"%%=ContentBlockByKey("{footer}")=%%"#).as_str())
    );
    assert_eq!(header_asset.category.as_ref().unwrap().folder_path, "Content Builder/Blocks");
}

#[tokio::test]
async fn test_deploy_order_puts_dependencies_first() {
    let client = newsletter_platform();
    let gathered = AssetGatherer::new(&client).gather_asset_by_id(100, false).await.unwrap();
    let mut assembler = PackageAssembler::new(&client, gathered.into_package());
    assembler.assemble_transitive(5).await.unwrap();

    let graph = DependencyGraph::from_package(assembler.package());
    let order = graph.deploy_order().unwrap();
    let position = |id: &str| order.iter().position(|node| node.bldr_id == id).unwrap();

    let newsletter = bldr_id(ContextTag::ContentBuilder, "id:100");
    let header = bldr_id(ContextTag::ContentBuilder, "id:200");
    let footer = bldr_id(ContextTag::ContentBuilder, "id:501");
    assert!(position(&footer) < position(&header));
    assert!(position(&header) < position(&newsletter));
}

#[tokio::test]
async fn test_second_run_adds_nothing() {
    let client = newsletter_platform();
    let gathered = AssetGatherer::new(&client).gather_asset_by_id(100, false).await.unwrap();
    let mut assembler = PackageAssembler::new(&client, gathered.into_package());
    assembler.assemble_transitive(5).await.unwrap();
    let first = assembler.package().clone();

    let report = assembler.assemble().await.unwrap();

    assert!(report.new_dependencies.is_empty());
    assert_eq!(assembler.package(), &first);
}

#[tokio::test]
async fn test_depth_zero_leaves_discovered_assets_unscanned() {
    let client = newsletter_platform();
    let gathered = AssetGatherer::new(&client).gather_asset_by_id(100, false).await.unwrap();
    let mut assembler = PackageAssembler::new(&client, gathered.into_package());

    let report = assembler.assemble_transitive(0).await.unwrap();

    assert_eq!(report.processed, 1);
    let header = assembler
        .package()
        .bucket(ContextTag::ContentBuilder)
        .and_then(|b| b.find_by_bldr_id(&bldr_id(ContextTag::ContentBuilder, "id:200")))
        .unwrap();
    assert_eq!(header.content.as_deref(), Some(r#"%%=ContentBlockByKey("key-501")=%%"#));
    assert!(header.dependencies.is_empty());
}

#[tokio::test]
async fn test_failed_lookup_rolls_back_the_pass() {
    let client = newsletter_platform().with_failure("searchAssets", 503);
    let gathered = AssetGatherer::new(&client).gather_asset_by_id(100, false).await.unwrap();
    let start = gathered.clone().into_package();

    let mut assembler =
        PackageAssembler::new(&client, gathered.into_package()).with_policy(FailurePolicy::Rollback);
    let err = assembler.assemble_transitive(5).await.unwrap_err();

    assert!(format!("{err:#}").contains("status 503"));
    assert_eq!(assembler.package(), &start);
}

#[tokio::test]
async fn test_failed_lookup_keeps_partial_merge() {
    let client = newsletter_platform().with_failure("searchAssets", 503);
    let gathered = AssetGatherer::new(&client).gather_asset_by_id(100, false).await.unwrap();

    let mut assembler = PackageAssembler::new(&client, gathered.into_package());
    assert!(assembler.assemble_transitive(5).await.is_err());

    // ContentBlockByID runs before ContentBlockByName, so the Footer was
    // merged before the name search failed.
    let package = assembler.package();
    assert!(package.contains(ContextTag::ContentBuilder, &bldr_id(ContextTag::ContentBuilder, "id:501")));
    assert!(
        client
            .calls()
            .iter()
            .any(|call| matches!(call, PlatformCall::SearchAssets { search_term, .. } if search_term == "Header"))
    );
}
