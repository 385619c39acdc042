//! Plain specification records
//!
//! These mirror the rows of the planning application data specification
//! (application types, sub-types, modules, joins, requirements, fields,
//! components and examples). They carry no behaviour beyond small accessors;
//! all composition happens in the store, resolver and schema builder.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SpecError};

/// Fields shared by every record with a validity window
pub trait Temporal {
    fn entry_date(&self) -> &str;
    fn end_date(&self) -> Option<&str>;

    /// Start of validity, if it parses as `YYYY-MM-DD`
    fn valid_from(&self) -> Option<NaiveDate> {
        parse_date(self.entry_date())
    }

    /// End of validity, if set and parseable
    fn valid_until(&self) -> Option<NaiveDate> {
        self.end_date().and_then(parse_date)
    }

    /// A record is current while its end date is unset
    fn is_current(&self) -> bool {
        self.end_date().is_none()
    }

    /// Whether the record is in force on `date`.
    ///
    /// Unparseable dates leave that side of the window open.
    fn is_effective_on(&self, date: NaiveDate) -> bool {
        let started = self.valid_from().map_or(true, |from| from <= date);
        let not_ended = self.valid_until().map_or(true, |until| date < until);
        started && not_ended
    }
}

/// Parse an ISO calendar date, tolerating a trailing time component
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Treat blank cells as absent
fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

macro_rules! impl_temporal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Temporal for $ty {
                fn entry_date(&self) -> &str {
                    &self.entry_date
                }

                fn end_date(&self) -> Option<&str> {
                    self.end_date.as_deref()
                }
            }
        )*
    };
}

/// A category of planning application (e.g. householder)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationType {
    pub reference: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<String>,
    /// Semicolon separated list of legislation URLs
    #[serde(default)]
    pub legislation: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub entry_date: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl ApplicationType {
    pub fn new(reference: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            name: name.into(),
            description: String::new(),
            synonyms: None,
            legislation: String::new(),
            notes: None,
            entry_date: String::new(),
            start_date: None,
            end_date: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Individual legislation URLs, blanks removed
    pub fn legislation_urls(&self) -> Vec<&str> {
        self.legislation
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Narrower category belonging to one application type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationSubType {
    pub reference: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub application_type: String,
    #[serde(default)]
    pub entry_date: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// A reusable named section of application data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlanningModule {
    pub reference: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub discussion_number: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub application_forms: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Successor module when this one is deprecated
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
    #[serde(default)]
    pub entry_date: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl PlanningModule {
    pub fn new(reference: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            name: name.into(),
            description: String::new(),
            discussion_number: None,
            application_forms: None,
            notes: None,
            replaced_by: None,
            entry_date: String::new(),
            end_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Association between an application type and a module.
///
/// The join has its own validity window; the end dates of the records it
/// links do not deactivate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationModuleJoin {
    pub application_type: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub application_sub_type: Option<String>,
    pub application_module: String,
    #[serde(default)]
    pub entry_date: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl ApplicationModuleJoin {
    pub fn new(application_type: impl Into<String>, application_module: impl Into<String>) -> Self {
        Self {
            application_type: application_type.into(),
            application_sub_type: None,
            application_module: application_module.into(),
            entry_date: String::new(),
            end_date: None,
        }
    }

    /// Narrow the join to a sub-type
    pub fn for_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.application_sub_type = Some(sub_type.into());
        self
    }

    pub fn starting(mut self, date: impl Into<String>) -> Self {
        self.entry_date = date.into();
        self
    }

    pub fn ended(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }
}

/// A statutory requirement attached to planning applications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlanningRequirement {
    pub reference: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub legislation: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub entry_date: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// An atomic typed data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Field {
    pub reference: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free text data type, see [`DataType::parse`]
    #[serde(default = "default_data_type")]
    pub data_type: String,
    /// Only meaningful inside a component, where it is overridden anyway
    #[serde(default)]
    pub required: bool,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub validation: Vec<String>,
    #[serde(default)]
    pub entry_date: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

fn default_data_type() -> String {
    "string".to_string()
}

impl Field {
    pub fn new(reference: impl Into<String>, data_type: impl Into<String>) -> Self {
        let reference = reference.into();
        Self {
            name: reference.clone(),
            reference,
            description: String::new(),
            data_type: data_type.into(),
            required: false,
            notes: None,
            validation: Vec::new(),
            entry_date: String::new(),
            end_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.validation.push(rule.into());
        self
    }

    pub fn data_type(&self) -> DataType {
        DataType::parse(&self.data_type)
    }
}

/// The fixed field data type vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Integer,
    Boolean,
    Date,
    Datetime,
    Uuid,
    Email,
    Url,
    Enum,
    Array,
    Object,
}

impl DataType {
    /// Case-insensitive parse; anything unrecognised is a string
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "number" => DataType::Number,
            "integer" => DataType::Integer,
            "boolean" => DataType::Boolean,
            "date" => DataType::Date,
            "datetime" => DataType::Datetime,
            "uuid" => DataType::Uuid,
            "email" => DataType::Email,
            "url" => DataType::Url,
            "enum" => DataType::Enum,
            "array" => DataType::Array,
            "object" => DataType::Object,
            _ => DataType::String,
        }
    }
}

/// A field slot inside a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ComponentField {
    pub field: String,
    /// Takes precedence over the field's own `required` flag
    #[serde(default)]
    pub required: bool,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ComponentField {
    pub fn required(field: impl Into<String>) -> Self {
        Self { field: field.into(), required: true, notes: None }
    }

    pub fn optional(field: impl Into<String>) -> Self {
        Self { field: field.into(), required: false, notes: None }
    }
}

/// A reusable group of fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Component {
    pub reference: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<ComponentField>,
    #[serde(default)]
    pub validation: Vec<String>,
    #[serde(default)]
    pub entry_date: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl Component {
    pub fn new(reference: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            name: name.into(),
            description: String::new(),
            fields: Vec::new(),
            validation: Vec::new(),
            entry_date: String::new(),
            end_date: None,
        }
    }

    pub fn with_field(mut self, field: ComponentField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.validation.push(rule.into());
        self
    }
}

/// Sample payload for documentation. Never feeds schema generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExampleData {
    pub reference: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub application_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl_temporal!(
    ApplicationType,
    ApplicationSubType,
    PlanningModule,
    ApplicationModuleJoin,
    PlanningRequirement,
    Field,
    Component,
);

/// Every record collection, as handed over by whatever loaded them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecordBundle {
    #[serde(default)]
    pub application_types: Vec<ApplicationType>,
    #[serde(default)]
    pub application_sub_types: Vec<ApplicationSubType>,
    #[serde(default)]
    pub modules: Vec<PlanningModule>,
    #[serde(default)]
    pub module_joins: Vec<ApplicationModuleJoin>,
    #[serde(default)]
    pub requirements: Vec<PlanningRequirement>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub examples: Vec<ExampleData>,
}

impl RecordBundle {
    /// Read a bundle from a `.json` or `.toml` file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") | None => Ok(serde_json::from_str(&content)?),
            Some(other) => Err(SpecError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_data_type_is_string() {
        assert_eq!(DataType::parse("Integer"), DataType::Integer);
        assert_eq!(DataType::parse("geometry"), DataType::String);
        assert_eq!(DataType::parse(""), DataType::String);
    }

    #[test]
    fn test_blank_end_date_is_unset() {
        let join: ApplicationModuleJoin = serde_json::from_value(serde_json::json!({
            "application-type": "hh",
            "application-module": "site-details",
            "entry-date": "2024-01-01",
            "end-date": ""
        }))
        .unwrap();
        assert!(join.end_date.is_none());
        assert!(join.is_current());
    }

    #[test]
    fn test_effective_window() {
        let join = ApplicationModuleJoin::new("hh", "m")
            .starting("2024-01-01")
            .ended("2024-06-01");
        assert!(!join.is_effective_on(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
        assert!(join.is_effective_on(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(!join.is_effective_on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
    }

    #[test]
    fn test_unparseable_dates_are_open() {
        let join = ApplicationModuleJoin::new("hh", "m").starting("soon");
        assert!(join.is_effective_on(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()));
        assert_eq!(parse_date("2024-02-03T10:00:00Z"), NaiveDate::from_ymd_opt(2024, 2, 3));
    }

    #[test]
    fn test_legislation_urls() {
        let mut app = ApplicationType::new("hh", "Householder");
        app.legislation = "https://a.example; https://b.example;".to_string();
        assert_eq!(app.legislation_urls(), vec!["https://a.example", "https://b.example"]);
    }
}
