//! Schema node types
//!
//! A generated schema is a tree of [`SchemaNode`]s. Each node is one of a
//! closed set of kinds (object, array, string, number, boolean) so the
//! validator can match on them exhaustively. Serializing a node produces the
//! JSON Schema keyword subset understood by the validator:
//! `$schema`, `type`, `title`, `description`, `properties`, `items`,
//! `required`, `enum`, `format`, `pattern`, `minimum`, `maximum`,
//! `minLength`, `maxLength`, `minItems`, `uniqueItems`,
//! `additionalProperties`.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::checksum::Checksum;

/// Dialect URI placed on generated root schemas
pub const DEFAULT_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// A node in a generated schema tree
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// `$schema`, only set on roots
    pub dialect: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: SchemaKind,
}

/// The closed set of node kinds
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Object(ObjectSchema),
    Array(ArraySchema),
    String(StringSchema),
    Number(NumberSchema),
    Boolean,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    /// Declared properties in insertion order
    pub properties: Vec<Property>,
    /// Required property names, no duplicates
    pub required: Vec<String>,
    pub additional_properties: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub schema: SchemaNode,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArraySchema {
    pub items: Option<Box<SchemaNode>>,
    pub min_items: Option<usize>,
    pub unique_items: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub enum_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    /// `integer` rather than `number`
    pub integer: bool,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl ObjectSchema {
    /// Look up a declared property
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties.iter().find(|p| p.name == name).map(|p| &p.schema)
    }

    /// Add or replace a property, keeping its original position on replace
    pub fn insert(&mut self, name: impl Into<String>, schema: SchemaNode) {
        let name = name.into();
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.schema = schema,
            None => self.properties.push(Property { name, schema }),
        }
    }

    /// Mark a property as required; repeated names are ignored
    pub fn require(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Closed objects reject undeclared keys
    pub fn is_closed(&self) -> bool {
        self.additional_properties == Some(false)
    }
}

impl SchemaNode {
    fn of(kind: SchemaKind) -> Self {
        Self {
            dialect: None,
            title: None,
            description: None,
            kind,
        }
    }

    pub fn object(schema: ObjectSchema) -> Self {
        Self::of(SchemaKind::Object(schema))
    }

    /// Object that rejects undeclared properties
    pub fn closed_object() -> Self {
        Self::object(ObjectSchema {
            additional_properties: Some(false),
            ..Default::default()
        })
    }

    pub fn array(items: SchemaNode) -> Self {
        Self::of(SchemaKind::Array(ArraySchema {
            items: Some(Box::new(items)),
            ..Default::default()
        }))
    }

    pub fn string() -> Self {
        Self::of(SchemaKind::String(StringSchema::default()))
    }

    /// String with a `format` annotation
    pub fn formatted(format: impl Into<String>) -> Self {
        Self::of(SchemaKind::String(StringSchema {
            format: Some(format.into()),
            ..Default::default()
        }))
    }

    /// String restricted to a set of values
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(SchemaKind::String(StringSchema {
            enum_values: Some(values.into_iter().map(Into::into).collect()),
            ..Default::default()
        }))
    }

    pub fn number() -> Self {
        Self::of(SchemaKind::Number(NumberSchema::default()))
    }

    pub fn integer() -> Self {
        Self::of(SchemaKind::Number(NumberSchema {
            integer: true,
            ..Default::default()
        }))
    }

    pub fn boolean() -> Self {
        Self::of(SchemaKind::Boolean)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the description unless it is blank
    pub fn describe(mut self, description: &str) -> Self {
        if !description.trim().is_empty() {
            self.description = Some(description.to_string());
        }
        self
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = Some(dialect.into());
        self
    }

    /// Builder form of [`ObjectSchema::insert`]; ignored on non-objects
    pub fn with_property(mut self, name: impl Into<String>, schema: SchemaNode, required: bool) -> Self {
        if let SchemaKind::Object(object) = &mut self.kind {
            let name = name.into();
            if required {
                object.require(name.clone());
            }
            object.insert(name, schema);
        }
        self
    }

    /// The `type` keyword for this node
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            SchemaKind::Object(_) => "object",
            SchemaKind::Array(_) => "array",
            SchemaKind::String(_) => "string",
            SchemaKind::Number(n) if n.integer => "integer",
            SchemaKind::Number(_) => "number",
            SchemaKind::Boolean => "boolean",
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectSchema> {
        match &mut self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArraySchema> {
        match &self.kind {
            SchemaKind::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&StringSchema> {
        match &self.kind {
            SchemaKind::String(string) => Some(string),
            _ => None,
        }
    }

    pub fn format(&self) -> Option<&str> {
        self.as_string().and_then(|s| s.format.as_deref())
    }

    /// Property schema by name, when this is an object
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.as_object().and_then(|o| o.property(name))
    }

    /// Required names, empty for non-objects
    pub fn required(&self) -> &[String] {
        self.as_object().map(|o| o.required.as_slice()).unwrap_or_default()
    }

    /// Wire form as a JSON value
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Fingerprint of the wire form
    pub fn checksum(&self) -> Checksum {
        Checksum::from_json(&self.to_value())
    }
}

/// Ordered `properties` map
struct Properties<'a>(&'a [Property]);

impl Serialize for Properties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for property in self.0 {
            map.serialize_entry(&property.name, &property.schema)?;
        }
        map.end()
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        if let Some(dialect) = &self.dialect {
            map.serialize_entry("$schema", dialect)?;
        }
        map.serialize_entry("type", self.type_name())?;
        if let Some(title) = &self.title {
            map.serialize_entry("title", title)?;
        }
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }

        match &self.kind {
            SchemaKind::Object(object) => {
                if object.is_closed() || !object.properties.is_empty() {
                    map.serialize_entry("properties", &Properties(&object.properties))?;
                }
                if object.is_closed() || !object.required.is_empty() {
                    map.serialize_entry("required", &object.required)?;
                }
                if let Some(additional) = object.additional_properties {
                    map.serialize_entry("additionalProperties", &additional)?;
                }
            }
            SchemaKind::Array(array) => {
                if let Some(items) = &array.items {
                    map.serialize_entry("items", items.as_ref())?;
                }
                if let Some(min_items) = array.min_items {
                    map.serialize_entry("minItems", &min_items)?;
                }
                if array.unique_items {
                    map.serialize_entry("uniqueItems", &true)?;
                }
            }
            SchemaKind::String(string) => {
                if let Some(values) = &string.enum_values {
                    map.serialize_entry("enum", values)?;
                }
                if let Some(format) = &string.format {
                    map.serialize_entry("format", format)?;
                }
                if let Some(pattern) = &string.pattern {
                    map.serialize_entry("pattern", pattern)?;
                }
                if let Some(min) = string.min_length {
                    map.serialize_entry("minLength", &min)?;
                }
                if let Some(max) = string.max_length {
                    map.serialize_entry("maxLength", &max)?;
                }
            }
            SchemaKind::Number(number) => {
                if let Some(min) = number.minimum {
                    map.serialize_entry("minimum", &min)?;
                }
                if let Some(max) = number.maximum {
                    map.serialize_entry("maximum", &max)?;
                }
            }
            SchemaKind::Boolean => {}
        }

        map.end()
    }
}
