//! Submission validation against a stored schema
//!
//! Matching is strictly positional: submitted field `i` is checked against
//! schema field `i` only. Per index, in order:
//! 1. label, type, key and value attributes present
//! 2. label and key equal (case-sensitive), type equal (case-insensitive)
//! 3. required fields are not null
//! 4. value satisfies the field type's shape (text, textarea and number
//!    shapes apply to required fields only; a non-string optional dropdown
//!    value is reported as an invalid option)
//! 5. submitted options, when both sides carry them, equal the schema's
//! 6. dropdown values are members of the schema's options
//!
//! Validation stops at the first violation. Inputs are never mutated.

use serde_json::{Map, Value};

use super::errors::{ValidationError, ValidationResult};
use super::types::{FieldDescriptor, FieldType, FieldValue, Schema, Submission};
use super::validator::json_type_name;

/// Attributes every submitted field must carry.
pub const REQUIRED_ATTRIBUTES: [&str; 4] = ["label", "type", "key", "value"];

/// Validates submissions against a frozen schema.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionValidator<'a> {
    schema: &'a Schema,
}

impl<'a> SubmissionValidator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Validates a candidate submission and returns its normalized form.
    ///
    /// The normalized form holds exactly the submitted values (the type name
    /// is canonicalized); no defaults are filled in from the schema.
    pub fn validate(&self, candidate: &Value) -> ValidationResult<Submission> {
        let items = candidate
            .as_array()
            .ok_or_else(|| ValidationError::not_an_array("form data", json_type_name(candidate)))?;

        if items.len() != self.schema.len() {
            return Err(ValidationError::length_mismatch(self.schema.len(), items.len()));
        }

        let values = self
            .schema
            .fields()
            .iter()
            .zip(items)
            .enumerate()
            .map(|(index, (descriptor, item))| validate_field(index, descriptor, item))
            .collect::<ValidationResult<Vec<_>>>()?;

        Ok(Submission::new(values))
    }

    /// Re-runs validation on an already normalized submission.
    pub fn revalidate(&self, submission: &Submission) -> ValidationResult<Submission> {
        self.validate(&submission.to_json())
    }
}

fn validate_field(
    index: usize,
    descriptor: &FieldDescriptor,
    item: &Value,
) -> ValidationResult<FieldValue> {
    let key = descriptor.key.as_str();

    let obj = match item.as_object() {
        Some(obj) if REQUIRED_ATTRIBUTES.iter().all(|a| obj.contains_key(*a)) => obj,
        _ => {
            return Err(ValidationError::missing_attributes(
                index,
                Some(key),
                &REQUIRED_ATTRIBUTES,
            ))
        }
    };

    check_identity(index, descriptor, obj)?;

    let value = &obj["value"];

    if descriptor.required && value.is_null() {
        return Err(ValidationError::required_value(index, key));
    }

    let schema_options = descriptor.options();
    let field_type = descriptor.field_type;
    let lenient = !descriptor.required && field_type.shape_only_when_required();
    // a dropdown value outside the options is reported after the options check
    let mut rejected_option = None;
    if !lenient && !field_type.accepts(value, schema_options) {
        match (field_type, value.as_str()) {
            (FieldType::Dropdown, Some(v)) => rejected_option = Some(v.to_string()),
            (FieldType::Dropdown, None) if !descriptor.required => {
                rejected_option = Some(value.to_string())
            }
            _ => {
                return Err(ValidationError::type_mismatch(
                    index,
                    key,
                    field_type.expected_shape(),
                    json_type_name(value),
                ))
            }
        }
    }

    let submitted_options = parse_submitted_options(index, key, obj.get("options"))?;
    if let (Some(expected), Some(actual)) = (&descriptor.options, &submitted_options) {
        if expected.len() != actual.len() {
            return Err(ValidationError::options_mismatch(index, key, "length mismatch"));
        }
        if expected != actual {
            return Err(ValidationError::options_mismatch(index, key, "mismatch"));
        }
    }

    if let Some(v) = rejected_option {
        return Err(ValidationError::invalid_option(index, key, &v));
    }

    Ok(FieldValue {
        label: descriptor.label.clone(),
        field_type: descriptor.field_type,
        key: descriptor.key.clone(),
        value: value.clone(),
        options: submitted_options,
    })
}

fn check_identity(
    index: usize,
    descriptor: &FieldDescriptor,
    obj: &Map<String, Value>,
) -> ValidationResult<()> {
    let key = descriptor.key.as_str();
    let label = obj["label"].as_str();
    if label != Some(descriptor.label.as_str()) {
        return Err(ValidationError::identity_mismatch(
            index,
            key,
            "label",
            &descriptor.label,
            &display_attr(&obj["label"]),
        ));
    }

    let type_name = descriptor.field_type.type_name();
    let type_matches = obj["type"]
        .as_str()
        .map_or(false, |t| t.eq_ignore_ascii_case(type_name));
    if !type_matches {
        return Err(ValidationError::identity_mismatch(
            index,
            key,
            "type",
            type_name,
            &display_attr(&obj["type"]),
        ));
    }

    if obj["key"].as_str() != Some(key) {
        return Err(ValidationError::identity_mismatch(
            index,
            key,
            "key",
            key,
            &display_attr(&obj["key"]),
        ));
    }

    Ok(())
}

fn parse_submitted_options(
    index: usize,
    key: &str,
    raw: Option<&Value>,
) -> ValidationResult<Option<Vec<String>>> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|o| o.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(Some)
            .ok_or_else(|| ValidationError::options_mismatch(index, key, "must be strings")),
        Some(_) => Err(ValidationError::options_mismatch(index, key, "must be an array")),
    }
}

fn display_attr(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
