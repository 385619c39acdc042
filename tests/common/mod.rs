//! Shared fixtures for integration tests

use std::path::PathBuf;

use planning_schemas::{RecordBundle, RecordStore};
use serde_json::{json, Value};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

pub fn store() -> RecordStore {
    let bundle = RecordBundle::from_path(fixture_path("specification.json")).expect("fixture bundle");
    RecordStore::from_bundle(bundle).expect("fixture store")
}

/// A complete householder submission
pub fn householder_payload() -> Value {
    json!({
        "reference": "550e8400-e29b-41d4-a716-446655440000",
        "application-types": ["hh"],
        "planning-authority": "local-authority:LBH",
        "submission-date": "2024-01-15",
        "modules": ["site-details", "applicant-details", "fee-v2", "heritage"],
        "documents": [
            {
                "reference": "doc-1",
                "name": "Site plan",
                "document-types": ["site-plan"],
                "file": { "filename": "site-plan.pdf", "file-size": 20480 }
            }
        ],
        "site-details": {},
        "applicant-details": {},
        "fee-v2": {},
        "heritage": {}
    })
}
