//! Schema Builder
//!
//! Composes a [`SchemaNode`] tree describing a valid submission for an
//! application type: a fixed envelope common to every application, plus one
//! property per resolved module. Field and component schemas are built from
//! their records and the free-text validation rules attached to them.
//!
//! Building never fails. References that do not resolve are left out.

use tracing::debug;

use crate::record::{ApplicationType, Component, DataType, Field, PlanningModule};
use crate::rules;
use crate::schema::{ArraySchema, ObjectSchema, SchemaKind, SchemaNode, DEFAULT_DIALECT};
use crate::store::RecordStore;

/// Envelope properties, in the order they are required
pub const ENVELOPE_PROPERTIES: [&str; 6] = [
    "reference",
    "application-types",
    "planning-authority",
    "submission-date",
    "modules",
    "documents",
];

/// Builds schemas from the records of one store
#[derive(Debug, Clone)]
pub struct SchemaBuilder<'a> {
    store: &'a RecordStore,
    dialect: String,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self {
            store,
            dialect: DEFAULT_DIALECT.to_string(),
        }
    }

    /// Override the `$schema` URI placed on application schemas
    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    /// Schema for an application type and its already resolved modules.
    ///
    /// Module references the store does not know are skipped, as are
    /// references that name an envelope property. Repeated references
    /// contribute one property.
    pub fn generate_application_schema<S: AsRef<str>>(
        &self,
        application_type: &ApplicationType,
        required_modules: &[S],
    ) -> SchemaNode {
        let mut schema = SchemaNode::closed_object()
            .with_dialect(&self.dialect)
            .with_title(format!("{} Application", application_type.name))
            .describe(&application_type.description)
            .with_property(
                "reference",
                SchemaNode::formatted("uuid").with_description("UUID for the application record"),
                true,
            )
            .with_property(
                "application-types",
                application_types_schema(&application_type.reference),
                true,
            )
            .with_property(
                "planning-authority",
                SchemaNode::string().with_description(
                    "The reference of the planning authority the application has been submitted to",
                ),
                true,
            )
            .with_property(
                "submission-date",
                SchemaNode::formatted("date")
                    .with_description("Date the application is submitted. In YYYY-MM-DD format"),
                true,
            )
            .with_property(
                "modules",
                SchemaNode::array(SchemaNode::string())
                    .with_description("List of required sections/modules for this application"),
                true,
            )
            .with_property(
                "documents",
                SchemaNode::array(document_schema()).with_description("List of submitted documents"),
                true,
            );

        for reference in required_modules {
            let reference = reference.as_ref();
            if ENVELOPE_PROPERTIES.contains(&reference) {
                debug!(module = reference, "Skipping module that collides with an envelope property");
                continue;
            }
            match self.store.module(reference) {
                Some(module) => {
                    schema = schema.with_property(reference, self.generate_module_schema(module), true);
                }
                None => debug!(module = reference, "Skipping unknown module"),
            }
        }

        debug!(
            application_type = %application_type.reference,
            properties = schema.as_object().map_or(0, |o| o.properties.len()),
            "Generated application schema"
        );

        schema
    }

    /// Resolve the current modules of an application type and build its
    /// schema. `None` when the type is unknown.
    pub fn schema_for(&self, application_type: &str) -> Option<SchemaNode> {
        let application = self.store.application_type(application_type)?;
        let modules = self.store.resolve_module_refs(application_type);
        Some(self.generate_application_schema(application, &modules))
    }

    /// Placeholder object for a module.
    ///
    /// The record data has no module to field linkage, so the object only
    /// carries the module's title and description.
    pub fn generate_module_schema(&self, module: &PlanningModule) -> SchemaNode {
        SchemaNode::closed_object()
            .with_title(&module.name)
            .describe(&module.description)
    }

    /// Object schema for a component.
    ///
    /// Required-ness comes from the component's own field slots, not from the
    /// fields. Slots pointing at unknown fields are skipped.
    pub fn generate_component_schema(&self, component: &Component) -> SchemaNode {
        let mut schema = SchemaNode::closed_object()
            .with_title(&component.name)
            .describe(&component.description);

        for slot in &component.fields {
            match self.store.field(&slot.field) {
                Some(field) => {
                    schema = schema.with_property(&field.reference, generate_field_schema(field), slot.required);
                }
                None => debug!(
                    component = %component.reference,
                    field = %slot.field,
                    "Skipping unknown component field"
                ),
            }
        }

        rules::apply_rules(&mut schema, &component.validation);
        schema
    }
}

/// Schema for a single field, with its validation rules applied
pub fn generate_field_schema(field: &Field) -> SchemaNode {
    let mut schema = match field.data_type() {
        DataType::String | DataType::Enum => SchemaNode::string(),
        DataType::Number => SchemaNode::number(),
        DataType::Integer => SchemaNode::integer(),
        DataType::Boolean => SchemaNode::boolean(),
        DataType::Date => SchemaNode::formatted("date"),
        DataType::Datetime => SchemaNode::formatted("date-time"),
        DataType::Uuid => SchemaNode::formatted("uuid"),
        DataType::Email => SchemaNode::formatted("email"),
        DataType::Url => SchemaNode::formatted("uri"),
        DataType::Array => SchemaNode::array(SchemaNode::string()),
        DataType::Object => SchemaNode::object(ObjectSchema {
            additional_properties: Some(true),
            ..Default::default()
        }),
    }
    .describe(&field.description);

    rules::apply_rules(&mut schema, &field.validation);
    schema
}

/// Non-empty list whose items must be this application type
fn application_types_schema(reference: &str) -> SchemaNode {
    SchemaNode {
        dialect: None,
        title: None,
        description: Some("A list of planning application types".to_string()),
        kind: SchemaKind::Array(ArraySchema {
            items: Some(Box::new(SchemaNode::one_of([reference]))),
            min_items: Some(1),
            unique_items: false,
        }),
    }
}

/// The fixed schema every submitted document follows
pub fn document_schema() -> SchemaNode {
    let file = SchemaNode::closed_object()
        .with_description("The digital file or a reference to where the file is stored")
        .with_property(
            "url",
            SchemaNode::formatted("uri").with_description("A URL pointing to the stored file"),
            false,
        )
        .with_property(
            "base64",
            SchemaNode::string().with_description("Base64-encoded content of the file"),
            false,
        )
        .with_property(
            "filename",
            SchemaNode::string().with_description("Name of the file being uploaded"),
            true,
        )
        .with_property(
            "mime-type",
            SchemaNode::string().with_description("MIME type of the file"),
            false,
        )
        .with_property(
            "file-size",
            SchemaNode::integer().with_description("Size of the file in bytes"),
            false,
        );

    SchemaNode::closed_object()
        .with_property(
            "reference",
            SchemaNode::string().with_description("A reference for the document"),
            true,
        )
        .with_property(
            "name",
            SchemaNode::string().with_description("The name or title of the document"),
            true,
        )
        .with_property(
            "description",
            SchemaNode::string().with_description("Brief description of what the document contains"),
            false,
        )
        .with_property(
            "document-types",
            SchemaNode::array(SchemaNode::string())
                .with_description("List of codelist references that the document covers"),
            true,
        )
        .with_property("file", file, true)
}
