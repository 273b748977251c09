//! Structural validation of call arguments.
//!
//! Schemas are written in a JSON Schema subset, which is also what
//! `tools/list` advertises as `inputSchema`. Supported keywords:
//!
//! - `type`: `string`, `number`, `integer`, `boolean`, `object`, `array`,
//!   `null` (or an array of these)
//! - `enum`: membership in a fixed list of values
//! - `pattern`: regular expression a string must match
//! - `required`: fields that must be present on an object
//! - `properties`: per-field schemas, checked in declaration order
//! - `default`: substituted for an absent property
//! - `items`: schema applied to every array element
//! - `oneOf`: exactly one alternative must validate, typically used to accept
//!   one of several field-set shapes
//!
//! Other keywords are ignored. Validation stops at the first violation, and
//! the order in which constraints are checked is fixed, so the reported
//! error is deterministic for a given input.

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Validates `arguments` against `schema`.
///
/// On success returns a copy of `arguments` with declared defaults filled in
/// for absent properties. The input is never modified.
///
/// # Errors
///
/// Returns the first violated constraint.
///
/// # Example
///
/// ```
/// use mcp_demo_server::capability::schema::validate;
/// use serde_json::json;
///
/// let schema = json!({
///     "type": "object",
///     "properties": {
///         "table": { "type": "string", "enum": ["users", "orders"] },
///         "limit": { "type": "number", "default": 10 }
///     },
///     "required": ["table"]
/// });
///
/// let checked = validate(&schema, &json!({ "table": "users" })).unwrap();
/// assert_eq!(checked["limit"], json!(10));
///
/// assert!(validate(&schema, &json!({ "table": "pets" })).is_err());
/// ```
pub fn validate(schema: &Value, arguments: &Value) -> Result<Value, ValidationError> {
    let mut checked = arguments.clone();
    validate_at(schema, &mut checked, "")?;
    Ok(checked)
}

fn validate_at(schema: &Value, value: &mut Value, path: &str) -> Result<(), ValidationError> {
    if let Some(accept) = schema.as_bool() {
        if accept {
            return Ok(());
        }
        return Err(ValidationError::new(
            field_name(path),
            "no value (schema rejects all values)",
            value,
        ));
    }

    let Some(schema) = schema.as_object() else {
        return Ok(());
    };

    if let Some(expected) = schema.get("type") {
        if !matches_type_constraint(expected, value) {
            return Err(ValidationError::new(
                field_name(path),
                format!("type {}", describe_type(expected)),
                value,
            ));
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            return Err(ValidationError::new(
                field_name(path),
                format!("one of {}", Value::Array(allowed.clone())),
                value,
            ));
        }
    }

    if let (Some(pattern), Some(text)) = (
        schema.get("pattern").and_then(Value::as_str),
        value.as_str(),
    ) {
        check_pattern(pattern, text, value, path)?;
    }

    match value {
        Value::Object(fields) => validate_object(schema, fields, path)?,
        Value::Array(items) => {
            if let Some(item_schema) = schema.get("items") {
                for (index, item) in items.iter_mut().enumerate() {
                    validate_at(item_schema, item, &format!("{}[{index}]", field_name(path)))?;
                }
            }
        }
        _ => {}
    }

    if let Some(alternatives) = schema.get("oneOf").and_then(Value::as_array) {
        check_one_of(alternatives, value, path)?;
    }

    Ok(())
}

fn validate_object(
    schema: &Map<String, Value>,
    fields: &mut Map<String, Value>,
    path: &str,
) -> Result<(), ValidationError> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !fields.contains_key(name) {
                return Err(ValidationError::missing(join(path, name)));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (name, property) in properties {
        if !fields.contains_key(name) {
            if let Some(default) = property.get("default") {
                fields.insert(name.clone(), default.clone());
            }
            continue;
        }
        if let Some(field) = fields.get_mut(name) {
            validate_at(property, field, &join(path, name))?;
        }
    }

    Ok(())
}

fn check_pattern(pattern: &str, text: &str, value: &Value, path: &str) -> Result<(), ValidationError> {
    let matched = Regex::new(pattern).map(|re| re.is_match(text)).map_err(|_| {
        ValidationError::new(
            field_name(path),
            format!("a usable schema pattern (invalid: {pattern})"),
            value,
        )
    })?;

    if matched {
        Ok(())
    } else {
        Err(ValidationError::new(
            field_name(path),
            format!("a string matching {pattern}"),
            value,
        ))
    }
}

fn check_one_of(alternatives: &[Value], value: &Value, path: &str) -> Result<(), ValidationError> {
    let matched = alternatives
        .iter()
        .filter(|alternative| {
            let mut candidate = value.clone();
            validate_at(alternative, &mut candidate, path).is_ok()
        })
        .count();

    if matched == 1 {
        return Ok(());
    }

    let shapes: Vec<String> = alternatives.iter().map(describe_alternative).collect();
    Err(ValidationError::new(
        field_name(path),
        format!(
            "exactly one of the argument shapes {} (matched {matched})",
            shapes.join(" | ")
        ),
        value,
    ))
}

/// Renders a `oneOf` alternative as the field set it requires.
fn describe_alternative(alternative: &Value) -> String {
    alternative
        .get("required")
        .and_then(Value::as_array)
        .map_or_else(
            || alternative.to_string(),
            |fields| {
                let names: Vec<&str> = fields.iter().filter_map(Value::as_str).collect();
                format!("{{{}}}", names.join(", "))
            },
        )
}

fn matches_type_constraint(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(name) => matches_type(name, value),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| matches_type(name, value)),
        _ => true,
    }
}

fn matches_type(name: &str, value: &Value) -> bool {
    match name {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|n| n.fract() == 0.0)
        }
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::String(name) => name.clone(),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        other => other.to_string(),
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn field_name(path: &str) -> &str {
    if path.is_empty() {
        "arguments"
    } else {
        path
    }
}
