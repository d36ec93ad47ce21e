//! Structural validation of template schemas
//!
//! Checks, per field and in order:
//! - label present, a string and not blank
//! - type present and a registered field type
//! - key present, a string and not blank
//! - required absent or boolean
//! - options absent or an array of strings; non-empty for dropdowns
//!
//! Validation stops at the first violating field.

use serde_json::{Map, Value};

use super::errors::{ValidationError, ValidationResult};
use super::types::{FieldDescriptor, FieldType, Schema};

/// Validates candidate schemas before a template is persisted.
///
/// A schema that passes carries the label/type/key triple on every field,
/// which is what positional submission matching relies on.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validates a candidate schema and freezes it.
    ///
    /// # Errors
    ///
    /// - FORM_NOT_AN_ARRAY if `candidate` is not an array
    /// - FORM_SCHEMA_EMPTY if the array is empty
    /// - FORM_SCHEMA_INVALID for a missing or malformed attribute
    /// - FORM_UNSUPPORTED_TYPE for a type outside the registry
    pub fn validate(&self, candidate: &Value) -> ValidationResult<Schema> {
        let items = candidate
            .as_array()
            .ok_or_else(|| ValidationError::not_an_array("schema", json_type_name(candidate)))?;

        if items.is_empty() {
            return Err(ValidationError::schema_empty());
        }

        let fields = items
            .iter()
            .enumerate()
            .map(|(index, item)| self.validate_field(index, item))
            .collect::<ValidationResult<Vec<_>>>()?;

        Ok(Schema::new(fields))
    }

    fn validate_field(&self, index: usize, item: &Value) -> ValidationResult<FieldDescriptor> {
        let obj = item.as_object().ok_or_else(|| {
            ValidationError::schema_invalid(
                index,
                None,
                format!("field must be an object, got {}", json_type_name(item)),
            )
        })?;

        // key is looked up early only so later errors can name it
        let key_hint = obj.get("key").and_then(Value::as_str);

        let label = required_text(obj, "label").ok_or_else(|| {
            ValidationError::schema_invalid(index, key_hint, "label is required")
        })?;

        let type_name = match obj.get("type") {
            None | Some(Value::Null) => {
                return Err(ValidationError::schema_invalid(index, key_hint, "type is required"))
            }
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(ValidationError::unsupported_type(
                    index,
                    key_hint,
                    &other.to_string(),
                ))
            }
        };

        let key = required_text(obj, "key")
            .ok_or_else(|| ValidationError::schema_invalid(index, None, "key is required"))?;

        let field_type = FieldType::parse(type_name)
            .ok_or_else(|| ValidationError::unsupported_type(index, Some(key), type_name))?;

        let required = match obj.get("required") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(ValidationError::schema_invalid(
                    index,
                    Some(key),
                    format!("required must be a boolean, got {}", json_type_name(other)),
                ))
            }
        };

        let options = parse_options(index, key, obj.get("options"))?;

        if field_type.requires_options() && options.as_ref().map_or(true, Vec::is_empty) {
            return Err(ValidationError::schema_invalid(
                index,
                Some(key),
                format!("options are required for {} type", field_type),
            ));
        }

        Ok(FieldDescriptor {
            label: label.to_string(),
            field_type,
            key: key.to_string(),
            required,
            options,
        })
    }
}

/// Returns the attribute if it is a non-blank string.
fn required_text<'a>(obj: &'a Map<String, Value>, attribute: &str) -> Option<&'a str> {
    obj.get(attribute)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn parse_options(
    index: usize,
    key: &str,
    raw: Option<&Value>,
) -> ValidationResult<Option<Vec<String>>> {
    let items = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ValidationError::schema_invalid(
                index,
                Some(key),
                format!("options must be an array, got {}", json_type_name(other)),
            ))
        }
    };

    items
        .iter()
        .map(|opt| {
            opt.as_str().map(str::to_string).ok_or_else(|| {
                ValidationError::schema_invalid(
                    index,
                    Some(key),
                    format!("options must be strings, got {}", json_type_name(opt)),
                )
            })
        })
        .collect::<ValidationResult<Vec<_>>>()
        .map(Some)
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
