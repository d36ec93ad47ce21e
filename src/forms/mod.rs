//! # Form Lifecycle
//!
//! Template and submission management on top of a [`FormStore`].
//!
//! Templates are created from a validated schema and never updated.
//! Submissions are validated against their template's schema on every write.
//!
//! [`FormStore`]: crate::store::FormStore

mod errors;
mod model;
mod submissions;
mod templates;

pub use errors::{FormError, FormResult, RecordKind};
pub use model::{FormData, FormTemplate, Page, Principal};
pub use submissions::SubmissionManager;
pub use templates::TemplateManager;
