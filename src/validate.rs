//! Validator
//!
//! Walks a JSON value together with a [`SchemaNode`] and collects every
//! violation. Checks never short-circuit: a node reports its type mismatch,
//! then missing required properties, then its string, number, array and
//! object constraints, recursing into items and declared properties.
//!
//! Malformed data is always reported, never raised.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::schema::{ArraySchema, NumberSchema, ObjectSchema, SchemaKind, SchemaNode, StringSchema};

/// One step into the data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Property(String),
    Index(usize),
}

/// What went wrong at a location
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    TypeMismatch { expected: &'static str, actual: &'static str },
    MissingProperty(String),
    TooShort { length: usize, minimum: usize },
    TooLong { length: usize, maximum: usize },
    PatternMismatch(String),
    /// The schema's pattern is not a usable regex
    InvalidPattern(String),
    NotInEnum { value: String, allowed: Vec<String> },
    InvalidFormat { format: String, value: String },
    BelowMinimum { value: f64, minimum: f64 },
    AboveMaximum { value: f64, maximum: f64 },
    TooFewItems { length: usize, minimum: usize },
    DuplicateItems,
    AdditionalProperty(String),
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::TypeMismatch { expected, actual } => {
                write!(f, "Expected type {}, got {}", expected, actual)
            }
            ViolationKind::MissingProperty(name) => write!(f, "Missing required property: {}", name),
            ViolationKind::TooShort { length, minimum } => {
                write!(f, "String length {} is less than minimum {}", length, minimum)
            }
            ViolationKind::TooLong { length, maximum } => {
                write!(f, "String length {} exceeds maximum {}", length, maximum)
            }
            ViolationKind::PatternMismatch(pattern) => write!(f, "String does not match pattern: {}", pattern),
            ViolationKind::InvalidPattern(pattern) => write!(f, "Schema pattern is not a valid regex: {}", pattern),
            ViolationKind::NotInEnum { value, allowed } => write!(
                f,
                "Value \"{}\" is not in allowed enum values: {}",
                value,
                allowed.join(", ")
            ),
            ViolationKind::InvalidFormat { format, value } => {
                write!(f, "Value \"{}\" is not a valid {}", value, format)
            }
            ViolationKind::BelowMinimum { value, minimum } => {
                write!(f, "Value {} is less than minimum {}", value, minimum)
            }
            ViolationKind::AboveMaximum { value, maximum } => {
                write!(f, "Value {} exceeds maximum {}", value, maximum)
            }
            ViolationKind::TooFewItems { length, minimum } => {
                write!(f, "Array length {} is less than minimum {}", length, minimum)
            }
            ViolationKind::DuplicateItems => write!(f, "Array items must be unique"),
            ViolationKind::AdditionalProperty(name) => write!(f, "Additional property not allowed: {}", name),
        }
    }
}

/// A violation and where it happened
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub path: Vec<PathSegment>,
    pub kind: ViolationKind,
}

impl Violation {
    /// JSON Pointer to the offending value (`""` for the root)
    pub fn pointer(&self) -> String {
        self.path
            .iter()
            .map(|segment| match segment {
                PathSegment::Property(name) => format!("/{}", name.replace('~', "~0").replace('/', "~1")),
                PathSegment::Index(index) => format!("/{}", index),
            })
            .collect()
    }
}

/// Renders as `Property documents: Item 0: Missing required property: file`
impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.path {
            match segment {
                PathSegment::Property(name) => write!(f, "Property {}: ", name)?,
                PathSegment::Index(index) => write!(f, "Item {}: ", index)?,
            }
        }
        write!(f, "{}", self.kind)
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Violation", 3)?;
        state.serialize_field("path", &self.pointer())?;
        state.serialize_field("message", &self.kind.to_string())?;
        state.serialize_field("error", &self.to_string())?;
        state.end()
    }
}

/// Outcome of validating one value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations rendered as path-prefixed messages
    pub fn errors(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Serializes as `{ "valid": bool, "errors": [..], "violations": [..] }`
impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationReport", 3)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("errors", &self.errors())?;
        state.serialize_field("violations", &self.violations)?;
        state.end()
    }
}

/// Validator settings
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorOptions {
    /// Check `format` annotations (uuid, date, date-time, email, uri)
    pub check_formats: bool,
}

/// Recursive structural validator
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidatorOptions,
}

/// Validate with default options
pub fn validate(data: &Value, schema: &SchemaNode) -> ValidationReport {
    Validator::default().validate(data, schema)
}

impl Validator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    pub fn validate(&self, data: &Value, schema: &SchemaNode) -> ValidationReport {
        let mut walk = Walk {
            options: self.options,
            path: Vec::new(),
            violations: Vec::new(),
            patterns: HashMap::new(),
        };
        walk.node(data, schema);
        ValidationReport { violations: walk.violations }
    }
}

struct Walk {
    options: ValidatorOptions,
    path: Vec<PathSegment>,
    violations: Vec<Violation>,
    /// Compiled `pattern` keywords; `None` when the pattern does not compile
    patterns: HashMap<String, Option<fancy_regex::Regex>>,
}

impl Walk {
    fn report(&mut self, kind: ViolationKind) {
        self.violations.push(Violation {
            path: self.path.clone(),
            kind,
        });
    }

    /// Compile a `pattern` keyword once per walk. Look-around and
    /// backreferences are supported.
    fn compiled(&mut self, pattern: &str) -> Option<&fancy_regex::Regex> {
        self.patterns
            .entry(pattern.to_string())
            .or_insert_with(|| fancy_regex::Regex::new(pattern).ok())
            .as_ref()
    }

    fn within(&mut self, segment: PathSegment, data: &Value, schema: &SchemaNode) {
        self.path.push(segment);
        self.node(data, schema);
        self.path.pop();
    }

    fn node(&mut self, data: &Value, schema: &SchemaNode) {
        if !type_matches(data, schema) {
            self.report(ViolationKind::TypeMismatch {
                expected: schema.type_name(),
                actual: json_type(data),
            });
        }

        match (&schema.kind, data) {
            (SchemaKind::Object(object), Value::Object(map)) => {
                for name in &object.required {
                    if !map.contains_key(name) {
                        self.report(ViolationKind::MissingProperty(name.clone()));
                    }
                }
                self.object(map, object);
            }
            (SchemaKind::String(string), Value::String(text)) => self.string(text, string),
            (SchemaKind::Number(number), Value::Number(value)) => {
                if let Some(value) = value.as_f64() {
                    self.number(value, number);
                }
            }
            (SchemaKind::Array(array), Value::Array(items)) => self.array(items, array),
            _ => {}
        }
    }

    fn string(&mut self, text: &str, schema: &StringSchema) {
        let length = text.chars().count();

        if let Some(minimum) = schema.min_length {
            if length < minimum {
                self.report(ViolationKind::TooShort { length, minimum });
            }
        }
        if let Some(maximum) = schema.max_length {
            if length > maximum {
                self.report(ViolationKind::TooLong { length, maximum });
            }
        }
        if let Some(pattern) = &schema.pattern {
            // A match that exhausts the backtrack limit counts as a mismatch
            let matched = self.compiled(pattern).map(|re| re.is_match(text).unwrap_or(false));
            match matched {
                Some(false) => self.report(ViolationKind::PatternMismatch(pattern.clone())),
                Some(true) => {}
                None => self.report(ViolationKind::InvalidPattern(pattern.clone())),
            }
        }
        if let Some(allowed) = &schema.enum_values {
            if !allowed.iter().any(|v| v == text) {
                self.report(ViolationKind::NotInEnum {
                    value: text.to_string(),
                    allowed: allowed.clone(),
                });
            }
        }
        if self.options.check_formats {
            if let Some(format) = &schema.format {
                if !format_matches(format, text) {
                    self.report(ViolationKind::InvalidFormat {
                        format: format.clone(),
                        value: text.to_string(),
                    });
                }
            }
        }
    }

    fn number(&mut self, value: f64, schema: &NumberSchema) {
        if let Some(minimum) = schema.minimum {
            if value < minimum {
                self.report(ViolationKind::BelowMinimum { value, minimum });
            }
        }
        if let Some(maximum) = schema.maximum {
            if value > maximum {
                self.report(ViolationKind::AboveMaximum { value, maximum });
            }
        }
    }

    fn array(&mut self, items: &[Value], schema: &ArraySchema) {
        if let Some(minimum) = schema.min_items {
            if items.len() < minimum {
                self.report(ViolationKind::TooFewItems {
                    length: items.len(),
                    minimum,
                });
            }
        }
        if schema.unique_items && has_duplicates(items) {
            self.report(ViolationKind::DuplicateItems);
        }
        if let Some(item_schema) = &schema.items {
            for (index, item) in items.iter().enumerate() {
                self.within(PathSegment::Index(index), item, item_schema);
            }
        }
    }

    /// Declared properties recurse; undeclared ones fail on closed objects.
    /// Absent declared properties were handled by the required check.
    fn object(&mut self, map: &serde_json::Map<String, Value>, schema: &ObjectSchema) {
        if schema.properties.is_empty() && !schema.is_closed() {
            return;
        }

        let mut keys: Vec<&String> = map.keys().collect();
        // Declared properties in schema order, then the rest as they come
        keys.sort_by_key(|key| {
            schema
                .properties
                .iter()
                .position(|p| &p.name == *key)
                .unwrap_or(usize::MAX)
        });

        for key in keys {
            match schema.property(key) {
                Some(property) => self.within(PathSegment::Property(key.clone()), &map[key.as_str()], property),
                None if schema.is_closed() => self.report(ViolationKind::AdditionalProperty(key.clone())),
                None => {}
            }
        }
    }
}

fn json_type(data: &Value) -> &'static str {
    match data {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_matches(data: &Value, schema: &SchemaNode) -> bool {
    match (&schema.kind, data) {
        (SchemaKind::Object(_), Value::Object(_)) => true,
        (SchemaKind::Array(_), Value::Array(_)) => true,
        (SchemaKind::String(_), Value::String(_)) => true,
        (SchemaKind::Boolean, Value::Bool(_)) => true,
        (SchemaKind::Number(number), Value::Number(value)) => !number.integer || is_integral(value),
        _ => false,
    }
}

fn is_integral(value: &serde_json::Number) -> bool {
    value.is_i64() || value.is_u64() || value.as_f64().map_or(false, |f| f.is_finite() && f.fract() == 0.0)
}

fn has_duplicates(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .any(|(i, item)| items[..i].contains(item))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"))
}

/// Unknown formats always pass
fn format_matches(format: &str, text: &str) -> bool {
    match format {
        "uuid" => uuid::Uuid::parse_str(text).is_ok(),
        "date" => text.len() == 10 && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
        "date-time" => chrono::DateTime::parse_from_rfc3339(text).is_ok(),
        "email" => email_re().is_match(text),
        "uri" => url::Url::parse(text).is_ok(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> SchemaNode {
        SchemaNode::closed_object()
            .with_property("name", SchemaNode::string(), true)
            .with_property("age", SchemaNode::integer(), false)
            .with_property("tags", SchemaNode::array(SchemaNode::string()), false)
    }

    #[test]
    fn test_valid_object() {
        let report = validate(&json!({"name": "Ada", "age": 36, "tags": ["x"]}), &person());
        assert!(report.is_valid(), "{:?}", report.errors());
    }

    #[test]
    fn test_integer_coercion() {
        assert!(validate(&json!(3.0), &SchemaNode::integer()).is_valid());
        assert!(validate(&json!(3), &SchemaNode::number()).is_valid());
        let report = validate(&json!(3.5), &SchemaNode::integer());
        assert_eq!(report.errors(), vec!["Expected type integer, got number"]);
    }

    #[test]
    fn test_missing_required_is_existence_only() {
        let report = validate(&json!({"name": 7}), &person());
        assert_eq!(report.errors(), vec!["Property name: Expected type string, got number"]);

        let report = validate(&json!({}), &person());
        assert_eq!(report.errors(), vec!["Missing required property: name"]);
    }

    #[test]
    fn test_additional_property() {
        let report = validate(&json!({"name": "Ada", "extra-field": 1}), &person());
        assert_eq!(report.errors(), vec!["Additional property not allowed: extra-field"]);
        assert_eq!(report.violations[0].pointer(), "");
    }

    #[test]
    fn test_array_items_prefixed_with_index() {
        let report = validate(&json!({"name": "Ada", "tags": ["ok", 2]}), &person());
        assert_eq!(report.errors(), vec!["Property tags: Item 1: Expected type string, got number"]);
        assert_eq!(report.violations[0].pointer(), "/tags/1");
    }

    #[test]
    fn test_errors_follow_declaration_order() {
        let report = validate(&json!({"tags": [1], "zzz": true, "age": "old", "name": 1}), &person());
        assert_eq!(
            report.errors(),
            vec![
                "Property name: Expected type string, got number",
                "Property age: Expected type integer, got string",
                "Property tags: Item 0: Expected type string, got number",
                "Additional property not allowed: zzz",
            ]
        );
    }

    #[test]
    fn test_type_error_comes_first() {
        let report = validate(&json!([1, 2]), &person());
        assert_eq!(report.errors(), vec!["Expected type object, got array"]);
        assert!(!validate(&Value::Null, &SchemaNode::string()).is_valid());
    }

    #[test]
    fn test_string_constraints() {
        let mut schema = SchemaNode::string();
        if let SchemaKind::String(s) = &mut schema.kind {
            s.min_length = Some(2);
            s.max_length = Some(4);
            s.pattern = Some("[0-9]".to_string());
        }
        assert!(validate(&json!("ab1"), &schema).is_valid());
        let report = validate(&json!("abcdef"), &schema);
        assert_eq!(
            report.errors(),
            vec!["String length 6 exceeds maximum 4", "String does not match pattern: [0-9]"]
        );
        assert_eq!(validate(&json!("a"), &schema).errors()[0], "String length 1 is less than minimum 2");
    }

    #[test]
    fn test_pattern_is_unanchored() {
        let mut schema = SchemaNode::string();
        if let SchemaKind::String(s) = &mut schema.kind {
            s.pattern = Some("bc".to_string());
        }
        assert!(validate(&json!("abcd"), &schema).is_valid());
    }

    #[test]
    fn test_pattern_look_ahead_and_backreference() {
        let mut schema = SchemaNode::string();
        if let SchemaKind::String(s) = &mut schema.kind {
            s.pattern = Some("^(?!TEST).+$".to_string());
        }
        assert!(validate(&json!("LIVE-1"), &schema).is_valid());
        assert_eq!(
            validate(&json!("TEST-1"), &schema).errors(),
            vec!["String does not match pattern: ^(?!TEST).+$"]
        );

        let mut repeated = SchemaNode::array(SchemaNode::string());
        if let SchemaKind::Array(a) = &mut repeated.kind {
            if let Some(items) = a.items.as_deref_mut() {
                if let SchemaKind::String(s) = &mut items.kind {
                    s.pattern = Some(r"^(\w)\1$".to_string());
                }
            }
        }
        let report = validate(&json!(["aa", "ab", "zz"]), &repeated);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].pointer(), "/1");
    }

    #[test]
    fn test_enum() {
        let report = validate(&json!("ldc"), &SchemaNode::one_of(["hh", "full"]));
        assert_eq!(report.errors(), vec!["Value \"ldc\" is not in allowed enum values: hh, full"]);
    }

    #[test]
    fn test_numeric_bounds_inclusive() {
        let mut schema = SchemaNode::number();
        if let SchemaKind::Number(n) = &mut schema.kind {
            n.minimum = Some(0.0);
            n.maximum = Some(10.0);
        }
        assert!(validate(&json!(0), &schema).is_valid());
        assert!(validate(&json!(10), &schema).is_valid());
        assert_eq!(validate(&json!(-1), &schema).errors(), vec!["Value -1 is less than minimum 0"]);
        assert_eq!(validate(&json!(10.5), &schema).errors(), vec!["Value 10.5 exceeds maximum 10"]);
    }

    #[test]
    fn test_min_and_unique_items() {
        let mut schema = SchemaNode::array(SchemaNode::string());
        if let SchemaKind::Array(a) = &mut schema.kind {
            a.min_items = Some(1);
            a.unique_items = true;
        }
        assert_eq!(validate(&json!([]), &schema).errors(), vec!["Array length 0 is less than minimum 1"]);
        assert_eq!(validate(&json!(["a", "a"]), &schema).errors(), vec!["Array items must be unique"]);
    }

    #[test]
    fn test_formats_only_when_enabled() {
        let schema = SchemaNode::formatted("uuid");
        assert!(validate(&json!("not-a-uuid"), &schema).is_valid());

        let strict = Validator::new(ValidatorOptions { check_formats: true });
        assert_eq!(
            strict.validate(&json!("not-a-uuid"), &schema).errors(),
            vec!["Value \"not-a-uuid\" is not a valid uuid"]
        );
        assert!(strict
            .validate(&json!("550e8400-e29b-41d4-a716-446655440000"), &schema)
            .is_valid());
        assert!(strict.validate(&json!("2024-01-15"), &SchemaNode::formatted("date")).is_valid());
        assert!(!strict.validate(&json!("15/01/2024"), &SchemaNode::formatted("date")).is_valid());
        assert!(strict.validate(&json!("2024-01-15T10:30:00Z"), &SchemaNode::formatted("date-time")).is_valid());
    }

    #[test]
    fn test_format_parsers() {
        let strict = Validator::new(ValidatorOptions { check_formats: true });
        let date = SchemaNode::formatted("date");
        assert!(!strict.validate(&json!("2024-01-1 "), &date).is_valid());
        assert!(!strict.validate(&json!(" 2024-01-1"), &date).is_valid());
        assert!(!strict.validate(&json!("2024-02-30"), &date).is_valid());

        let uri = SchemaNode::formatted("uri");
        assert!(strict.validate(&json!("https://example.com/plans?id=1"), &uri).is_valid());
        assert!(!strict.validate(&json!("not a uri"), &uri).is_valid());
        assert!(!strict.validate(&json!("/relative/path"), &uri).is_valid());

        let uuid = SchemaNode::formatted("uuid");
        assert!(strict.validate(&json!("550E8400-E29B-41D4-A716-446655440000"), &uuid).is_valid());
        assert!(!strict.validate(&json!("550e8400-e29b-41d4-a716-44665544000g"), &uuid).is_valid());
    }

    #[test]
    fn test_invalid_pattern_reported() {
        let mut schema = SchemaNode::string();
        if let SchemaKind::String(s) = &mut schema.kind {
            s.pattern = Some("(".to_string());
        }
        let report = validate(&json!("x"), &schema);
        assert!(matches!(report.violations[0].kind, ViolationKind::InvalidPattern(_)));
    }

    #[test]
    fn test_report_serialization() {
        let report = validate(&json!({}), &person());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["errors"], json!(["Missing required property: name"]));
        assert_eq!(value["violations"][0]["path"], "");
    }
}
