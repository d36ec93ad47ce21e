//! # Form Errors
//!
//! Error taxonomy for template and submission lifecycle operations.

use thiserror::Error;
use uuid::Uuid;

use crate::export::ExportError;
use crate::schema::ValidationError;

/// Result type for lifecycle operations
pub type FormResult<T> = Result<T, FormError>;

/// What kind of record a lookup was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Template,
    Submission,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Template => write!(f, "Form template"),
            RecordKind::Submission => write!(f, "Form data"),
        }
    }
}

/// Lifecycle errors
#[derive(Debug, Clone, Error)]
pub enum FormError {
    /// Schema or submission does not conform
    #[error("{0}")]
    Validation(ValidationError),

    /// Input that is malformed before validation can run (e.g. a blank name)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown template or submission id
    #[error("{kind} with id {id} does not exist")]
    NotFound { kind: RecordKind, id: Uuid },

    /// Ownership or permission-flag violation
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// No principal on the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Export collaborator failed
    #[error("Export failed: {0}")]
    Export(String),

    /// Stored schema or submission could not be encoded/decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Persistence failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl FormError {
    pub fn template_not_found(id: Uuid) -> Self {
        FormError::NotFound {
            kind: RecordKind::Template,
            id,
        }
    }

    pub fn submission_not_found(id: Uuid) -> Self {
        FormError::NotFound {
            kind: RecordKind::Submission,
            id,
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            FormError::Validation(_) => 400,
            FormError::InvalidRequest(_) => 400,
            FormError::Unauthenticated => 401,
            FormError::AccessDenied(_) => 403,
            FormError::NotFound { .. } => 404,
            FormError::Export(_) => 500,
            FormError::Serialization(_) => 500,
            FormError::Storage(_) => 500,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Validation error, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            FormError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for FormError {
    fn from(err: ValidationError) -> Self {
        if err.code().is_serialization() {
            FormError::Serialization(err.message().to_string())
        } else {
            FormError::Validation(err)
        }
    }
}

impl From<ExportError> for FormError {
    fn from(err: ExportError) -> Self {
        FormError::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let validation = FormError::from(ValidationError::length_mismatch(1, 2));
        assert_eq!(validation.status_code(), 400);
        assert_eq!(FormError::template_not_found(Uuid::nil()).status_code(), 404);
        assert_eq!(FormError::AccessDenied("x".into()).status_code(), 403);
        assert_eq!(FormError::Unauthenticated.status_code(), 401);
        assert_eq!(FormError::Storage("x".into()).status_code(), 500);
    }

    #[test]
    fn test_serialization_validation_error_is_reclassified() {
        let err = FormError::from(ValidationError::serialization("schema", "eof"));
        assert!(matches!(err, FormError::Serialization(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_not_found_message_names_kind() {
        let id = Uuid::new_v4();
        let msg = FormError::submission_not_found(id).to_string();
        assert!(msg.starts_with("Form data"));
        assert!(msg.contains(&id.to_string()));
    }
}
