//! Form schema subsystem
//!
//! Schemas are ordered lists of typed field descriptors, frozen when a
//! template is created. Submissions are checked against them at write time.
//!
//! # Design Principles
//!
//! - Closed set of field types, each with its own value-shape rule
//! - Positional matching: submitted field `i` answers schema field `i`
//! - Fail fast on the first violation
//! - No defaults and no coercion; accepted data is stored as submitted
//! - Deterministic validation

mod errors;
mod submission;
mod types;
mod validator;

pub use errors::{ValidationDetails, ValidationError, ValidationErrorCode, ValidationResult};
pub use submission::{SubmissionValidator, REQUIRED_ATTRIBUTES};
pub use types::{FieldDescriptor, FieldType, FieldValue, Schema, Submission, EMAIL_PATTERN};
pub use validator::SchemaValidator;
