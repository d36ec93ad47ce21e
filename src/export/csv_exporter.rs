//! CSV rendering

use serde_json::Value;

use super::{ExportError, ExportResult, Exporter, SUBMITTED_AT_HEADER};
use crate::forms::FormData;
use crate::schema::Schema;

/// Timestamp format of the `Submitted At` column
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Exports submissions as RFC 4180 CSV
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for CsvExporter {
    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, schema: &Schema, submissions: &[FormData]) -> ExportResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let header = schema.labels().chain(std::iter::once(SUBMITTED_AT_HEADER));
        writer
            .write_record(header)
            .map_err(|e| ExportError::Write(e.to_string()))?;

        for data in submissions {
            let values = data.values.values();
            let mut row: Vec<String> = (0..schema.len())
                .map(|i| values.get(i).map(|v| cell_text(&v.value)).unwrap_or_default())
                .collect();
            row.push(data.created_at.format(TIMESTAMP_FORMAT).to_string());
            writer
                .write_record(&row)
                .map_err(|e| ExportError::Write(e.to_string()))?;
        }

        writer
            .into_inner()
            .map_err(|e| ExportError::Finish(e.to_string()))
    }
}

/// Plain-text cell content; null renders empty.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
