//! Form schema type definitions
//!
//! Supported field types (closed set):
//! - text, textarea: free-form string
//! - number: JSON number
//! - dropdown: string drawn from the field's options
//! - date, time, datetime: ISO-8601 local strings
//! - email: string matching the address pattern
//! - checkbox: boolean

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{ValidationError, ValidationResult};

/// Address pattern applied to `email` fields.
pub const EMAIL_PATTERN: &str = r"^[A-Za-z0-9+_.-]+@(.+)$";

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Field kinds understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum FieldType {
    /// Single-line string
    Text,
    /// Multi-line string
    Textarea,
    /// JSON number (integer or float)
    Number,
    /// String member of the descriptor's options
    Dropdown,
    /// `YYYY-MM-DD`
    Date,
    /// `HH:MM[:SS[.f]]`
    Time,
    /// `YYYY-MM-DDTHH:MM[:SS[.f]]`
    Datetime,
    /// Email address
    Email,
    /// Boolean
    Checkbox,
}

impl FieldType {
    /// Every registered field type, in declaration order.
    pub const ALL: [FieldType; 9] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Number,
        FieldType::Dropdown,
        FieldType::Date,
        FieldType::Time,
        FieldType::Datetime,
        FieldType::Email,
        FieldType::Checkbox,
    ];

    /// Returns the canonical (lower-case) type name
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Dropdown => "dropdown",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Datetime => "datetime",
            FieldType::Email => "email",
            FieldType::Checkbox => "checkbox",
        }
    }

    /// Case-insensitive registry lookup.
    pub fn parse(name: &str) -> Option<FieldType> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.type_name().eq_ignore_ascii_case(name))
    }

    /// Returns true if `name` names a registered type (case-insensitive).
    pub fn is_supported(name: &str) -> bool {
        Self::parse(name).is_some()
    }

    /// Human readable description of the accepted value shape.
    pub fn expected_shape(&self) -> &'static str {
        match self {
            FieldType::Text | FieldType::Textarea => "a string",
            FieldType::Number => "a number",
            FieldType::Dropdown => "a string from the field options",
            FieldType::Date => "a valid date (YYYY-MM-DD)",
            FieldType::Time => "a valid time (HH:MM:SS)",
            FieldType::Datetime => "a valid datetime (YYYY-MM-DDTHH:MM:SS)",
            FieldType::Email => "a valid email address",
            FieldType::Checkbox => "a boolean",
        }
    }

    /// Whether `options` are mandatory for this type.
    pub fn requires_options(&self) -> bool {
        matches!(self, FieldType::Dropdown)
    }

    /// Whether the value shape is only enforced on required fields.
    ///
    /// Optional text, textarea and number fields take any JSON value.
    pub fn shape_only_when_required(&self) -> bool {
        matches!(
            self,
            FieldType::Text | FieldType::Textarea | FieldType::Number
        )
    }

    /// Value-shape predicate.
    ///
    /// `null` is always accepted here; whether a null is allowed is the
    /// required-value check's decision. `options` is only consulted for
    /// dropdowns. See [`shape_only_when_required`](Self::shape_only_when_required)
    /// for the types this is skipped on when a field is optional.
    pub fn accepts(&self, value: &Value, options: &[String]) -> bool {
        if value.is_null() {
            return true;
        }
        match self {
            FieldType::Text | FieldType::Textarea => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Checkbox => value.is_boolean(),
            FieldType::Dropdown => value
                .as_str()
                .map_or(false, |v| options.iter().any(|o| o == v)),
            FieldType::Date => value.as_str().map_or(false, is_iso_date),
            FieldType::Time => value.as_str().map_or(false, is_iso_time),
            FieldType::Datetime => value.as_str().map_or(false, is_iso_datetime),
            FieldType::Email => value.as_str().map_or(false, |v| email_regex().is_match(v)),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::parse(s).ok_or_else(|| format!("unsupported field type '{}'", s))
    }
}

impl TryFrom<String> for FieldType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

pub(crate) fn is_iso_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

pub(crate) fn is_iso_time(s: &str) -> bool {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f").is_ok()
        || NaiveTime::parse_from_str(s, "%H:%M").is_ok()
}

pub(crate) fn is_iso_datetime(s: &str) -> bool {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").is_ok()
}

/// One field of a form schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Display label
    pub label: String,
    /// Field kind
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Stable field key
    pub key: String,
    /// Whether a non-null value must be submitted
    #[serde(default)]
    pub required: bool,
    /// Allowed choices (mandatory for dropdowns)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl FieldDescriptor {
    /// Create a field without options
    pub fn new(
        label: impl Into<String>,
        field_type: FieldType,
        key: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            label: label.into(),
            field_type,
            key: key.into(),
            required,
            options: None,
        }
    }

    /// Create a dropdown field
    pub fn dropdown<I, S>(label: impl Into<String>, key: impl Into<String>, required: bool, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            field_type: FieldType::Dropdown,
            key: key.into(),
            required,
            options: Some(options.into_iter().map(Into::into).collect()),
        }
    }

    /// Options as a slice (empty if none declared)
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }
}

/// Frozen, ordered form schema.
///
/// There is no way to mutate a schema once built; clones share storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Arc<[FieldDescriptor]>,
}

impl Schema {
    /// Freeze a list of descriptors.
    ///
    /// This does not run structural validation; use
    /// [`SchemaValidator`](super::SchemaValidator) for untrusted input.
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            fields: fields.into(),
        }
    }

    /// The ordered field descriptors
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column headers, in schema order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.label.as_str())
    }

    /// Canonical string form used for storage
    pub fn encode(&self) -> ValidationResult<String> {
        serde_json::to_string(self).map_err(|e| ValidationError::serialization("schema", e))
    }

    /// Parses the canonical string form
    pub fn decode(raw: &str) -> ValidationResult<Self> {
        serde_json::from_str(raw).map_err(|e| ValidationError::serialization("schema", e))
    }
}

/// One submitted field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub key: String,
    /// Submitted value, exactly as received
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// A validated, ordered submission.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Submission {
    values: Vec<FieldValue>,
}

impl Submission {
    pub(crate) fn new(values: Vec<FieldValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Canonical string form used for storage
    pub fn encode(&self) -> ValidationResult<String> {
        serde_json::to_string(self).map_err(|e| ValidationError::serialization("submission", e))
    }

    /// Parses the canonical string form
    pub fn decode(raw: &str) -> ValidationResult<Self> {
        serde_json::from_str(raw).map_err(|e| ValidationError::serialization("submission", e))
    }

    /// Wire representation (JSON array)
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.values).unwrap_or(Value::Array(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_lookup_is_case_insensitive() {
        assert_eq!(FieldType::parse("DROPDOWN"), Some(FieldType::Dropdown));
        assert_eq!(FieldType::parse("DateTime"), Some(FieldType::Datetime));
        assert_eq!(FieldType::parse("number"), Some(FieldType::Number));
        assert!(FieldType::is_supported("Email"));
        assert!(!FieldType::is_supported("radio"));
        assert!(!FieldType::is_supported(""));
    }

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::Text.type_name(), "text");
        assert_eq!(FieldType::Textarea.type_name(), "textarea");
        assert_eq!(FieldType::Datetime.type_name(), "datetime");
        assert_eq!(FieldType::Checkbox.to_string(), "checkbox");
    }

    #[test]
    fn test_field_type_deserializes_any_case() {
        let t: FieldType = serde_json::from_value(json!("NUMBER")).unwrap();
        assert_eq!(t, FieldType::Number);
        assert_eq!(serde_json::to_value(t).unwrap(), json!("number"));
        assert!(serde_json::from_value::<FieldType>(json!("slider")).is_err());
    }

    #[test]
    fn test_text_and_number_shapes() {
        assert!(FieldType::Text.accepts(&json!("hi"), &[]));
        assert!(!FieldType::Text.accepts(&json!(3), &[]));
        assert!(FieldType::Number.accepts(&json!(30), &[]));
        assert!(FieldType::Number.accepts(&json!(2.5), &[]));
        assert!(!FieldType::Number.accepts(&json!("thirty"), &[]));
    }

    #[test]
    fn test_null_is_left_to_required_check() {
        for t in FieldType::ALL {
            assert!(t.accepts(&Value::Null, &[]), "{} should accept null", t);
        }
    }

    #[test]
    fn test_temporal_shapes() {
        assert!(FieldType::Date.accepts(&json!("2024-02-29"), &[]));
        assert!(!FieldType::Date.accepts(&json!("2023-02-29"), &[]));
        assert!(!FieldType::Date.accepts(&json!("29/02/2024"), &[]));

        assert!(FieldType::Time.accepts(&json!("09:30"), &[]));
        assert!(FieldType::Time.accepts(&json!("09:30:15"), &[]));
        assert!(FieldType::Time.accepts(&json!("09:30:15.250"), &[]));
        assert!(!FieldType::Time.accepts(&json!("25:00"), &[]));

        assert!(FieldType::Datetime.accepts(&json!("2024-01-02T03:04:05"), &[]));
        assert!(FieldType::Datetime.accepts(&json!("2024-01-02T03:04"), &[]));
        assert!(!FieldType::Datetime.accepts(&json!("2024-01-02 03:04:05"), &[]));
        assert!(!FieldType::Datetime.accepts(&json!(1704164645), &[]));
    }

    #[test]
    fn test_shape_only_when_required() {
        assert!(FieldType::Text.shape_only_when_required());
        assert!(FieldType::Textarea.shape_only_when_required());
        assert!(FieldType::Number.shape_only_when_required());
        assert!(!FieldType::Dropdown.shape_only_when_required());
        assert!(!FieldType::Date.shape_only_when_required());
        assert!(!FieldType::Checkbox.shape_only_when_required());
    }

    #[test]
    fn test_email_shape() {
        assert!(FieldType::Email.accepts(&json!("a.b+c@x.com"), &[]));
        assert!(!FieldType::Email.accepts(&json!("no-at-sign"), &[]));
        assert!(!FieldType::Email.accepts(&json!("bad char@x.com"), &[]));
        assert!(!FieldType::Email.accepts(&json!(true), &[]));
    }

    #[test]
    fn test_dropdown_membership() {
        let options = vec!["A".to_string(), "B".to_string()];
        assert!(FieldType::Dropdown.accepts(&json!("B"), &options));
        assert!(!FieldType::Dropdown.accepts(&json!("C"), &options));
        assert!(!FieldType::Dropdown.accepts(&json!("b"), &options));
    }

    #[test]
    fn test_checkbox_shape() {
        assert!(FieldType::Checkbox.accepts(&json!(false), &[]));
        assert!(!FieldType::Checkbox.accepts(&json!("true"), &[]));
    }

    #[test]
    fn test_schema_encode_decode() {
        let schema = Schema::new(vec![
            FieldDescriptor::new("Age", FieldType::Number, "age", true),
            FieldDescriptor::dropdown("Colour", "colour", false, ["Red", "Blue"]),
        ]);
        let raw = schema.encode().unwrap();
        assert!(raw.contains("\"type\":\"number\""));
        assert!(!raw.contains("\"options\":null"));
        assert_eq!(Schema::decode(&raw).unwrap(), schema);
    }

    #[test]
    fn test_schema_decode_rejects_garbage() {
        let err = Schema::decode("{not json").unwrap_err();
        assert_eq!(err.code().code(), "FORM_SERIALIZATION_FAILED");
    }
}
