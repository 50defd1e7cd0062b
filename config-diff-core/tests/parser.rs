use std::path::PathBuf;

use config_diff_core::parse_file;
use serde_json::json;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parses_nested_property_bags() {
    let tree = parse_file(&fixture("fixtures/current.json")).expect("parse should succeed");
    assert_eq!(tree.len(), 6);

    let pool = tree.get("/Tenant/App/web_pool").expect("pool should exist");
    assert_eq!(pool.command, "ltm pool");
    assert_eq!(
        pool.property(&["members", "/Tenant/10.0.1.10:80", "address"]),
        Some(&json!("10.0.1.10"))
    );

    let virtuals: Vec<_> = tree.items_with_command("ltm virtual").collect();
    assert_eq!(virtuals.len(), 1);
    assert_eq!(virtuals[0].0, "/Tenant/App/old_vs");
}

#[test]
fn missing_file_is_an_io_error() {
    let err = parse_file(&fixture("fixtures/does-not-exist.json")).expect_err("should fail");
    assert!(err.to_string().contains("failed to read configuration file"));
}
