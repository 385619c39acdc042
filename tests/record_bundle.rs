//! Loading record bundles from disk

mod common;

use planning_schemas::{RecordBundle, RecordStore, SpecError, Temporal};

#[test]
fn test_json_bundle_loads() {
    let store = common::store();
    assert_eq!(store.application_types().len(), 2);
    let hh = store.application_type("hh").unwrap();
    assert!(hh.end_date.is_none());
    assert!(hh.is_current());
    assert_eq!(hh.legislation_urls().len(), 2);
    assert_eq!(store.module_joins()[2].end_date.as_deref(), Some("2024-01-01"));
    assert_eq!(store.field("postcode").unwrap().validation.len(), 2);
}

#[test]
fn test_toml_bundle_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spec.toml");
    std::fs::write(
        &path,
        r#"
[[application-types]]
reference = "hh"
name = "Householder"

[[modules]]
reference = "site-details"
name = "Site details"

[[module-joins]]
application-type = "hh"
application-module = "site-details"
"#,
    )
    .unwrap();

    let store = RecordStore::from_bundle(RecordBundle::from_path(&path).unwrap()).unwrap();
    assert_eq!(store.resolve_module_refs("hh"), vec!["site-details"]);
}

#[test]
fn test_unknown_extension_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spec.csv");
    std::fs::write(&path, "reference,name\n").unwrap();

    let err = RecordBundle::from_path(&path).unwrap_err();
    assert!(matches!(err, SpecError::UnsupportedFormat(ext) if ext == "csv"));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = RecordBundle::from_path(common::fixture_path("absent.json")).unwrap_err();
    assert!(matches!(err, SpecError::Io(_)));
}
