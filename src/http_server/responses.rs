//! Response envelopes and error mapping shared by the route modules.

use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::state::AppState;
use crate::auth::{AuthContext, AuthError};
use crate::forms::{FormData, FormError, FormTemplate, Principal};
use crate::schema::{Schema, Submission};

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            message: message.into(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
            data: None,
        })
    }
}

/// Error envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    /// Stable validation code (e.g. `FORM_LENGTH_MISMATCH`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ErrorResponse {
    fn plain(error: String, code: u16) -> Self {
        Self {
            error,
            code,
            reason: None,
            index: None,
            key: None,
        }
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        Self::plain(err.to_string(), err.status_code())
    }
}

impl From<FormError> for ErrorResponse {
    fn from(err: FormError) -> Self {
        let mut body = Self::plain(err.to_string(), err.status_code());
        if let Some(v) = err.as_validation() {
            body.error = v.message().to_string();
            body.reason = Some(v.code().code());
            body.index = v.index();
            body.key = v.key().map(str::to_string);
        }
        body
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub type ApiResult<T> = Result<T, ApiError>;

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub fn auth_failure(err: AuthError) -> ApiError {
    if err.is_client_error() {
        tracing::debug!(error = %err, "auth request rejected");
    } else {
        tracing::error!(error = %err, "auth request failed");
    }
    (status(err.status_code()), Json(ErrorResponse::from(err)))
}

pub fn form_failure(err: FormError) -> ApiError {
    if err.is_client_error() {
        tracing::warn!(error = %err, "form request rejected");
    } else {
        tracing::error!(error = %err, "form request failed");
    }
    (status(err.status_code()), Json(ErrorResponse::from(err)))
}

/// Authenticates the bearer token on a request
pub fn caller(state: &AppState, headers: &HeaderMap) -> ApiResult<AuthContext> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| auth_failure(AuthError::AuthenticationRequired))?;

    state.auth.authenticate(token).map_err(auth_failure)
}

// ==================
// Views
// ==================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateView {
    pub template_id: Uuid,
    pub name: String,
    pub json_schema: Schema,
    pub allow_edit: bool,
    pub allow_delete: bool,
    pub created_at: DateTime<Utc>,
}

impl From<FormTemplate> for TemplateView {
    fn from(t: FormTemplate) -> Self {
        Self {
            template_id: t.id,
            name: t.name,
            json_schema: t.schema,
            allow_edit: t.allow_edit,
            allow_delete: t.allow_delete,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDataView {
    pub form_data_id: Uuid,
    pub template_id: Uuid,
    pub submitted_by: Principal,
    pub json_data: Submission,
    pub created_at: DateTime<Utc>,
}

impl From<FormData> for FormDataView {
    fn from(d: FormData) -> Self {
        Self {
            form_data_id: d.id,
            template_id: d.template_id,
            submitted_by: d.submitted_by,
            json_data: d.values,
            created_at: d.created_at,
        }
    }
}
