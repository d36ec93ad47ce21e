//! Form HTTP Routes
//!
//! Template management, submissions and export. Every route requires a
//! bearer token; creating and deleting templates also requires the ADMIN
//! role.

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::responses::{
    auth_failure, caller, form_failure, ApiResponse, ApiResult, FormDataView, TemplateView,
};
use super::state::AppState;
use crate::forms::{FormError, FormResult, Page};

/// Form routes with shared state
pub fn form_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/forms", get(list_forms_handler).post(create_form_handler))
        .route("/forms/:id", get(get_form_handler).delete(delete_form_handler))
        .route(
            "/forms/:id/data",
            get(list_data_handler).post(submit_handler),
        )
        .route("/forms/:id/data/mine", get(list_my_data_handler))
        .route("/forms/:id/export", get(export_handler))
        .route(
            "/data/:id",
            get(get_data_handler)
                .put(edit_data_handler)
                .delete(delete_data_handler),
        )
        .with_state(state)
}

// ==================
// Request Types
// ==================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub json_schema: Value,
    #[serde(default)]
    pub allow_edit: bool,
    #[serde(default)]
    pub allow_delete: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDataRequest {
    #[serde(default)]
    pub json_data: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub name: Option<String>,
}

impl ListQuery {
    fn page(&self) -> Page {
        Page::new(
            self.offset.unwrap_or(0),
            self.limit.unwrap_or(Page::DEFAULT_LIMIT),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuery {
    #[serde(default)]
    pub provide_response: bool,
}

/// Run a store-touching operation off the async workers.
///
/// The file store fsyncs under its write lock, so mutations go through here.
async fn blocking<T, F>(state: &Arc<AppState>, op: F) -> ApiResult<T>
where
    F: FnOnce(&AppState) -> FormResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || op(&state))
        .await
        .map_err(|e| form_failure(FormError::Storage(format!("store task failed: {}", e))))?
        .map_err(form_failure)
}

// ==================
// Template Handlers
// ==================

async fn create_form_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateFormRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TemplateView>>)> {
    let ctx = caller(&state, &headers)?;
    ctx.require_admin().map_err(auth_failure)?;

    let template = blocking(&state, move |state| {
        state.templates.create(
            &request.name,
            &request.json_schema,
            request.allow_edit,
            request.allow_delete,
        )
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::new("Form created successfully", TemplateView::from(template)),
    ))
}

async fn list_forms_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<TemplateView>>>> {
    caller(&state, &headers)?;

    let templates = state
        .templates
        .list(query.page(), query.name.as_deref())
        .map_err(form_failure)?;

    Ok(ApiResponse::new(
        "Forms fetched successfully",
        templates.into_iter().map(TemplateView::from).collect(),
    ))
}

async fn get_form_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<TemplateView>>> {
    caller(&state, &headers)?;

    let template = state.templates.get_by_id(id).map_err(form_failure)?;
    Ok(ApiResponse::new(
        "Form fetched successfully",
        TemplateView::from(template),
    ))
}

async fn delete_form_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let ctx = caller(&state, &headers)?;
    ctx.require_admin().map_err(auth_failure)?;

    blocking(&state, move |state| state.templates.delete_by_id(id)).await?;
    Ok(ApiResponse::message("Form deleted successfully"))
}

// ==================
// Submission Handlers
// ==================

async fn submit_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(query): Query<SubmitQuery>,
    Json(request): Json<FormDataRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<FormDataView>>)> {
    let ctx = caller(&state, &headers)?;

    let data = blocking(&state, move |state| {
        state
            .submissions
            .submit(id, &request.json_data, &ctx.principal, query.provide_response)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::new("Form submitted successfully", FormDataView::from(data)),
    ))
}

async fn list_data_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<FormDataView>>>> {
    caller(&state, &headers)?;

    let data = state
        .submissions
        .list_by_template(id, query.page())
        .map_err(form_failure)?;

    Ok(ApiResponse::new(
        "Form data fetched successfully",
        data.into_iter().map(FormDataView::from).collect(),
    ))
}

async fn list_my_data_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<FormDataView>>>> {
    let ctx = caller(&state, &headers)?;

    let data = state
        .submissions
        .list_mine_by_template(id, &ctx.principal)
        .map_err(form_failure)?;

    Ok(ApiResponse::new(
        "Form data fetched successfully",
        data.into_iter().map(FormDataView::from).collect(),
    ))
}

async fn get_data_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<FormDataView>>> {
    let ctx = caller(&state, &headers)?;

    let data = state
        .submissions
        .get_by_id(id, &ctx.principal)
        .map_err(form_failure)?;
    Ok(ApiResponse::new(
        "Form data fetched successfully",
        FormDataView::from(data),
    ))
}

async fn edit_data_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<FormDataRequest>,
) -> ApiResult<Json<ApiResponse<FormDataView>>> {
    let ctx = caller(&state, &headers)?;

    let data = blocking(&state, move |state| {
        state.submissions.edit(id, &request.json_data, &ctx.principal)
    })
    .await?;
    Ok(ApiResponse::new(
        "Form data updated successfully",
        FormDataView::from(data),
    ))
}

async fn delete_data_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let ctx = caller(&state, &headers)?;

    blocking(&state, move |state| state.submissions.delete(id, &ctx.principal)).await?;
    Ok(ApiResponse::message("Form data deleted successfully"))
}

async fn export_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    caller(&state, &headers)?;

    let file = blocking(&state, move |state| state.submissions.export(id)).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.filename);

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    ))
}
