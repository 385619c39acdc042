//! Planning Application Specification Registry
//!
//! Turns the flat records of the UK planning application data specification
//! (application types, modules, join records, fields and components) into a
//! JSON Schema for each application type, and validates submissions against
//! it.
//!
//! ## Features
//!
//! - **Record Store**: read-only, reference-keyed holder of every record
//! - **Temporal Joins**: module resolution from dated join records
//! - **Schema Builder**: envelope, module, component and field schemas
//! - **Validator**: typed violations with JSON Pointer paths
//! - **Search**: ranked free-text lookup across records
//!
//! ## Flow
//!
//! ```text
//! RecordBundle ──► RecordStore ──► resolve_modules ──► SchemaBuilder ──► Validator
//!                      │                                    │
//!                      └── search                           └── generate_example
//! ```
//!
//! ```no_run
//! use planning_schemas::{RecordBundle, RecordStore, SchemaBuilder, validate};
//!
//! let store = RecordStore::from_bundle(RecordBundle::from_path("specification.json")?)?;
//! let schema = SchemaBuilder::new(&store).schema_for("householder").expect("known type");
//! let report = validate(&serde_json::json!({}), &schema);
//! assert!(!report.is_valid());
//! # Ok::<(), planning_schemas::SpecError>(())
//! ```

pub mod builder;
pub mod checksum;
pub mod config;
pub mod error;
pub mod example;
pub mod record;
pub mod resolve;
pub mod rules;
pub mod schema;
pub mod search;
pub mod store;
pub mod validate;

pub use builder::{document_schema, generate_field_schema, SchemaBuilder, ENVELOPE_PROPERTIES};
pub use checksum::Checksum;
pub use config::{OutputFormat, SpecConfig};
pub use error::{Result, SpecError};
pub use example::generate_example;
pub use record::{
    ApplicationModuleJoin, ApplicationSubType, ApplicationType, Component, ComponentField, DataType,
    ExampleData, Field, PlanningModule, PlanningRequirement, RecordBundle, Temporal,
};
pub use schema::{SchemaKind, SchemaNode};
pub use search::{SearchKind, SearchResult};
pub use store::{ProcessedApplication, ProcessedModule, RecordStore};
pub use validate::{validate, ValidationReport, Validator, ValidatorOptions, Violation, ViolationKind};
