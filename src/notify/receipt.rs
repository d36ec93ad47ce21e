//! Confirmation message for an accepted submission

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use super::Notification;
use crate::forms::{FormData, FormTemplate};
use crate::schema::{FieldType, FieldValue};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Builds the receipt sent to the submitter of `data`.
pub fn submission_receipt(template: &FormTemplate, data: &FormData) -> Notification {
    let mut body = format!(
        "Thank you for submitting the form: {}\n\nYour responses:\n",
        template.name
    );
    for field in data.values.values() {
        body.push_str(&field.label);
        body.push_str(": ");
        body.push_str(&render_value(field));
        body.push('\n');
    }
    body.push_str("\nSubmitted on: ");
    body.push_str(&format_timestamp(data.created_at));

    Notification {
        to: data.submitted_by.to_string(),
        subject: format!("Form Response Submission - {}", template.name),
        body,
    }
}

fn render_value(field: &FieldValue) -> String {
    match (&field.value, field.field_type) {
        (Value::Null, _) => "N/A".to_string(),
        (Value::String(s), FieldType::Date) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|_| s.clone()),
        (Value::String(s), FieldType::Datetime) => parse_datetime(s)
            .map(|dt| dt.format(DATETIME_FORMAT).to_string())
            .unwrap_or_else(|| s.clone()),
        (Value::String(s), _) => s.clone(),
        (other, _) => other.to_string(),
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(DATETIME_FORMAT).to_string()
}
