//! Sample payload generation
//!
//! Produces a deterministic value that satisfies a generated schema: only
//! required object properties, the smallest allowed array, and placeholder
//! strings chosen by `format`. Patterns are not honoured.

use serde_json::{Map, Value};

use crate::schema::{SchemaKind, SchemaNode, StringSchema};

/// Build a sample value for a schema
pub fn generate_example(schema: &SchemaNode) -> Value {
    match &schema.kind {
        SchemaKind::Object(object) => {
            let mut map = Map::new();
            for property in &object.properties {
                if object.is_required(&property.name) {
                    map.insert(property.name.clone(), generate_example(&property.schema));
                }
            }
            Value::Object(map)
        }
        SchemaKind::Array(array) => {
            let count = array.min_items.unwrap_or(1).max(1);
            match &array.items {
                Some(items) => Value::Array((0..count).map(|_| generate_example(items)).collect()),
                None => Value::Array(Vec::new()),
            }
        }
        SchemaKind::String(string) => Value::String(example_string(string)),
        SchemaKind::Number(number) => {
            // Integers round inward from whichever bound supplied the value
            let (value, rounded) = match (number.minimum, number.maximum) {
                (Some(min), _) => (min, min.ceil()),
                (None, Some(max)) if max < 0.0 => (max, max.floor()),
                _ => (0.0, 0.0),
            };
            if number.integer {
                Value::from(rounded as i64)
            } else {
                serde_json::Number::from_f64(value).map_or(Value::from(0), Value::Number)
            }
        }
        SchemaKind::Boolean => Value::Bool(true),
    }
}

fn example_string(schema: &StringSchema) -> String {
    if let Some(first) = schema.enum_values.as_ref().and_then(|values| values.first()) {
        return first.clone();
    }

    let mut text = match schema.format.as_deref() {
        Some("uuid") => "550e8400-e29b-41d4-a716-446655440000",
        Some("date") => "2024-01-15",
        Some("date-time") => "2024-01-15T10:30:00Z",
        Some("email") => "example@example.com",
        Some("uri") => "https://example.com",
        _ => "Example string value",
    }
    .to_string();

    if let Some(min) = schema.min_length {
        while text.chars().count() < min {
            text.push('x');
        }
    }
    if let Some(max) = schema.max_length {
        text = text.chars().take(max).collect();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use serde_json::json;

    #[test]
    fn test_required_only() {
        let schema = SchemaNode::closed_object()
            .with_property("when", SchemaNode::formatted("date"), true)
            .with_property("count", SchemaNode::integer(), true)
            .with_property("note", SchemaNode::string(), false);
        assert_eq!(generate_example(&schema), json!({"when": "2024-01-15", "count": 0}));
    }

    #[test]
    fn test_length_bounds_respected() {
        let mut schema = SchemaNode::string();
        if let SchemaKind::String(s) = &mut schema.kind {
            s.max_length = Some(4);
        }
        let example = generate_example(&schema);
        assert_eq!(example, json!("Exam"));
        assert!(validate(&example, &schema).is_valid());
    }

    #[test]
    fn test_enum_first_value() {
        assert_eq!(generate_example(&SchemaNode::one_of(["hh", "full"])), json!("hh"));
    }

    #[test]
    fn test_integer_rounds_inside_bounds() {
        let mut below_zero = SchemaNode::integer();
        if let SchemaKind::Number(n) = &mut below_zero.kind {
            n.maximum = Some(-0.5);
        }
        let example = generate_example(&below_zero);
        assert_eq!(example, json!(-1));
        assert!(validate(&example, &below_zero).is_valid());

        let mut above = SchemaNode::integer();
        if let SchemaKind::Number(n) = &mut above.kind {
            n.minimum = Some(2.5);
        }
        assert_eq!(generate_example(&above), json!(3));
    }
}
