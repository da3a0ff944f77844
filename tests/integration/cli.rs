use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

fn bldr() -> Command {
    let mut cmd = Command::cargo_bin("bldr").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("BLDR_CONFIG").env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_lists_commands() {
    bldr()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("package"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_package_asset_zero_fails_before_network() {
    let temp = TempDir::new().unwrap();
    bldr()
        .args(["--config", temp.path().join("missing.toml").to_str().unwrap()])
        .args(["package", "asset", "0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("assetId is required"));
}

#[test]
fn test_package_category_zero_fails() {
    bldr()
        .args(["package", "category", "0", "--no-progress"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("categoryId is required"));
}

#[test]
fn test_package_without_base_url_reports_config_error() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "[package]\nmax_depth = 2\n").unwrap();

    bldr()
        .args(["--config", config.to_str().unwrap(), "package", "asset", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("platform.base_url is not set"));
}

#[test]
fn test_unknown_failure_policy_is_rejected() {
    bldr()
        .args(["package", "asset", "42", "--on-failure", "retry"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown failure policy"));
}

#[test]
#[serial]
fn test_config_path_honors_env() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("bldr.toml");

    bldr()
        .env("BLDR_CONFIG", &config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bldr.toml"));
}

#[test]
#[serial]
fn test_config_init_then_show() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    let config_arg = config.to_str().unwrap();

    bldr()
        .args(["--config", config_arg, "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));
    assert!(config.exists());

    bldr()
        .args(["--config", config_arg, "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    bldr()
        .args(["--config", config_arg, "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("on_failure = \"keep-partial\""));
}

#[test]
fn test_scan_lists_references_as_json() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("email.html");
    std::fs::write(&file, "<p>\n%%=Lookup(\"Members\", \"Name\", \"Id\", @id)=%%\n</p>").unwrap();

    let output = bldr().args(["scan", "--json"]).arg(&file).assert().success().get_output().clone();
    let found: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(
        found,
        serde_json::json!([
            { "function": "Lookup", "context": "dataExtension", "value": "Members", "line": 2 }
        ])
    );
}

#[test]
fn test_scan_requires_file_or_catalog() {
    bldr().arg("scan").assert().failure();
    bldr()
        .args(["scan", "--catalog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ContentBlockByName"));
}
