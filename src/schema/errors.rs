//! Validation error types for schemas and submissions
//!
//! Error codes:
//! - FORM_NOT_AN_ARRAY
//! - FORM_SCHEMA_EMPTY
//! - FORM_SCHEMA_INVALID
//! - FORM_UNSUPPORTED_TYPE
//! - FORM_LENGTH_MISMATCH
//! - FORM_MISSING_ATTRIBUTES
//! - FORM_IDENTITY_MISMATCH
//! - FORM_REQUIRED_VALUE
//! - FORM_TYPE_MISMATCH
//! - FORM_OPTIONS_MISMATCH
//! - FORM_INVALID_OPTION
//! - FORM_SERIALIZATION_FAILED
//!
//! Every error that concerns a single field carries its zero-based index and,
//! when the schema defines one, its key.

use std::fmt;

/// Validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// Schema or submission is not a JSON array
    NotAnArray,
    /// Schema has no fields
    SchemaEmpty,
    /// Schema field is missing or has a malformed attribute
    SchemaInvalid,
    /// Schema field names a type outside the registry
    UnsupportedType,
    /// Submission and schema have different lengths
    LengthMismatch,
    /// Submitted field lacks label/type/key/value
    MissingAttributes,
    /// Submitted label/type/key differs from the schema at that index
    IdentityMismatch,
    /// Required field submitted as null
    RequiredValue,
    /// Value does not satisfy the field type's shape
    TypeMismatch,
    /// Submitted options differ from the schema's
    OptionsMismatch,
    /// Dropdown value is not one of the options
    InvalidOption,
    /// Canonical string form could not be encoded or decoded
    Serialization,
}

impl ValidationErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationErrorCode::NotAnArray => "FORM_NOT_AN_ARRAY",
            ValidationErrorCode::SchemaEmpty => "FORM_SCHEMA_EMPTY",
            ValidationErrorCode::SchemaInvalid => "FORM_SCHEMA_INVALID",
            ValidationErrorCode::UnsupportedType => "FORM_UNSUPPORTED_TYPE",
            ValidationErrorCode::LengthMismatch => "FORM_LENGTH_MISMATCH",
            ValidationErrorCode::MissingAttributes => "FORM_MISSING_ATTRIBUTES",
            ValidationErrorCode::IdentityMismatch => "FORM_IDENTITY_MISMATCH",
            ValidationErrorCode::RequiredValue => "FORM_REQUIRED_VALUE",
            ValidationErrorCode::TypeMismatch => "FORM_TYPE_MISMATCH",
            ValidationErrorCode::OptionsMismatch => "FORM_OPTIONS_MISMATCH",
            ValidationErrorCode::InvalidOption => "FORM_INVALID_OPTION",
            ValidationErrorCode::Serialization => "FORM_SERIALIZATION_FAILED",
        }
    }

    /// Serialization failures are internal, everything else is the client's input.
    pub fn is_serialization(&self) -> bool {
        matches!(self, ValidationErrorCode::Serialization)
    }
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Expected/actual pair for mismatch errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Attribute that was compared (e.g. "label", "value")
    pub attribute: String,
    pub expected: String,
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(
        attribute: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected '{}', got '{}'",
            self.attribute, self.expected, self.actual
        )
    }
}

/// Validation error with full context
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    code: ValidationErrorCode,
    message: String,
    index: Option<usize>,
    key: Option<String>,
    details: Option<ValidationDetails>,
}

impl ValidationError {
    fn at(code: ValidationErrorCode, index: usize, key: Option<&str>, message: String) -> Self {
        Self {
            code,
            message,
            index: Some(index),
            key: key.map(str::to_string),
            details: None,
        }
    }

    fn with_details(mut self, details: ValidationDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Input was not a JSON array
    pub fn not_an_array(what: &str, actual: &str) -> Self {
        Self {
            code: ValidationErrorCode::NotAnArray,
            message: format!("{} must be a JSON array, got {}", what, actual),
            index: None,
            key: None,
            details: None,
        }
    }

    /// Schema has no fields
    pub fn schema_empty() -> Self {
        Self {
            code: ValidationErrorCode::SchemaEmpty,
            message: "Schema cannot be null or empty".into(),
            index: None,
            key: None,
            details: None,
        }
    }

    /// Schema field attribute missing or malformed
    pub fn schema_invalid(index: usize, key: Option<&str>, reason: impl Into<String>) -> Self {
        Self::at(
            ValidationErrorCode::SchemaInvalid,
            index,
            key,
            format!("Field at index {}: {}", index, reason.into()),
        )
    }

    /// Schema field type outside the registry
    pub fn unsupported_type(index: usize, key: Option<&str>, actual: &str) -> Self {
        let allowed: Vec<&str> = super::FieldType::ALL.iter().map(|t| t.type_name()).collect();
        Self::at(
            ValidationErrorCode::UnsupportedType,
            index,
            key,
            format!(
                "Field at index {}: unsupported type '{}', must be one of {}",
                index,
                actual,
                allowed.join(", ")
            ),
        )
        .with_details(ValidationDetails::new("type", allowed.join("|"), actual))
    }

    /// Submission length differs from schema length
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self {
            code: ValidationErrorCode::LengthMismatch,
            message: format!(
                "Form data length ({}) does not match template length ({})",
                actual, expected
            ),
            index: None,
            key: None,
            details: Some(ValidationDetails::new(
                "length",
                expected.to_string(),
                actual.to_string(),
            )),
        }
    }

    /// Submitted field lacks required attributes
    pub fn missing_attributes(index: usize, key: Option<&str>, required: &[&str]) -> Self {
        Self::at(
            ValidationErrorCode::MissingAttributes,
            index,
            key,
            format!(
                "Data at index {} missing required fields ({})",
                index,
                required.join(", ")
            ),
        )
    }

    /// Submitted identity attribute differs from the schema
    pub fn identity_mismatch(
        index: usize,
        key: &str,
        attribute: &str,
        expected: &str,
        actual: &str,
    ) -> Self {
        Self::at(
            ValidationErrorCode::IdentityMismatch,
            index,
            Some(key),
            format!(
                "Data at index {}: {} mismatch, expected '{}', got '{}'",
                index, attribute, expected, actual
            ),
        )
        .with_details(ValidationDetails::new(attribute, expected, actual))
    }

    /// Required field was null
    pub fn required_value(index: usize, key: &str) -> Self {
        Self::at(
            ValidationErrorCode::RequiredValue,
            index,
            Some(key),
            format!("Data at index {}: value is required for key '{}'", index, key),
        )
    }

    /// Value does not satisfy the type's shape
    pub fn type_mismatch(index: usize, key: &str, expected: &str, actual: &str) -> Self {
        Self::at(
            ValidationErrorCode::TypeMismatch,
            index,
            Some(key),
            format!(
                "Data at index {}: value for key '{}' must be {}",
                index, key, expected
            ),
        )
        .with_details(ValidationDetails::new("value", expected, actual))
    }

    /// Options differ from the schema's options
    pub fn options_mismatch(index: usize, key: &str, reason: &str) -> Self {
        Self::at(
            ValidationErrorCode::OptionsMismatch,
            index,
            Some(key),
            format!("Data at index {}: options {} for key '{}'", index, reason, key),
        )
    }

    /// Dropdown value not among the options
    pub fn invalid_option(index: usize, key: &str, actual: &str) -> Self {
        Self::at(
            ValidationErrorCode::InvalidOption,
            index,
            Some(key),
            format!(
                "Data at index {}: value '{}' for key '{}' is not a valid option",
                index, actual, key
            ),
        )
    }

    /// Canonical string form failure
    pub fn serialization(what: &str, err: impl fmt::Display) -> Self {
        Self {
            code: ValidationErrorCode::Serialization,
            message: format!("Failed to encode or decode {}: {}", what, err),
            index: None,
            key: None,
            details: None,
        }
    }

    pub fn code(&self) -> ValidationErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Zero-based index of the offending field, if any
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Key of the offending field, if known
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn details(&self) -> Option<&ValidationDetails> {
        self.details.as_ref()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
