//! # Export
//!
//! Renders a template's submissions as a downloadable table: one column per
//! schema label (in schema order) plus a submission timestamp, one row per
//! submission.

mod csv_exporter;

pub use csv_exporter::CsvExporter;

use thiserror::Error;

use crate::forms::FormData;
use crate::schema::Schema;

/// Header of the trailing timestamp column
pub const SUBMITTED_AT_HEADER: &str = "Submitted At";

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write export: {0}")]
    Write(String),

    #[error("Failed to finalize export: {0}")]
    Finish(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// A rendered export ready to hand to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Tabular renderer for submissions
pub trait Exporter: Send + Sync {
    /// MIME type of the rendered bytes
    fn content_type(&self) -> &'static str;

    /// File extension, without the dot
    fn extension(&self) -> &'static str;

    /// Render `submissions` (oldest first) under `schema`'s columns
    fn render(&self, schema: &Schema, submissions: &[FormData]) -> ExportResult<Vec<u8>>;
}
