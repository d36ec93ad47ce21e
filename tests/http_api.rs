//! HTTP API Tests
//!
//! Drives the full router in-process: auth, role checks, the submission
//! lifecycle and CSV export.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use formsmith::auth::JwtConfig;
use formsmith::http_server::{AppState, HttpServer, HttpServerConfig};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Helper Functions
// =============================================================================

fn app() -> Router {
    let state = Arc::new(AppState::in_memory(JwtConfig::default()));
    HttpServer::with_state(HttpServerConfig::default(), state)
        .unwrap()
        .router()
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, token, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Registers and logs in a user, returning the bearer token
async fn login_as(app: &Router, email: &str, role: &str) -> String {
    let (status, _) = send_json(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"email": email, "username": "tester", "password": "Passw0rd!", "role": role})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": "Passw0rd!"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

fn survey_request(allow_edit: bool) -> Value {
    json!({
        "name": "Survey",
        "jsonSchema": [{"label": "Age", "type": "number", "key": "age", "required": true}],
        "allowEdit": allow_edit,
        "allowDelete": true
    })
}

fn age(value: Value) -> Value {
    json!({"jsonData": [{"label": "Age", "type": "number", "key": "age", "value": value}]})
}

async fn create_survey(app: &Router, admin: &str, allow_edit: bool) -> String {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/api/forms",
        Some(admin),
        Some(survey_request(allow_edit)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["templateId"].as_str().unwrap().to_string()
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = app();
    let (status, body) = send_json(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let app = app();
    login_as(&app, "a@x.com", "USER").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"email": "a@x.com", "username": "again", "password": "Passw0rd!", "role": "USER"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = app();
    login_as(&app, "a@x.com", "USER").await;

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "a@x.com", "password": "Wr0ngpass!"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forms_require_token() {
    let app = app();
    let (status, _) = send_json(&app, Method::GET, "/api/forms", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_cannot_create_template() {
    let app = app();
    let user = login_as(&app, "u@x.com", "USER").await;

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/forms",
        Some(&user),
        Some(survey_request(true)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Templates and Submissions
// =============================================================================

#[tokio::test]
async fn test_invalid_schema_reports_reason() {
    let app = app();
    let admin = login_as(&app, "admin@x.com", "ADMIN").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/forms",
        Some(&admin),
        Some(json!({"name": "Bad", "jsonSchema": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "FORM_SCHEMA_EMPTY");
}

#[tokio::test]
async fn test_submission_lifecycle() {
    let app = app();
    let admin = login_as(&app, "admin@x.com", "ADMIN").await;
    let alice = login_as(&app, "a@x.com", "USER").await;
    let bob = login_as(&app, "b@x.com", "USER").await;
    let form_id = create_survey(&app, &admin, true).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/forms/{}/data", form_id),
        Some(&alice),
        Some(age(json!(30))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["submittedBy"], "a@x.com");
    assert_eq!(body["data"]["jsonData"][0]["value"], 30);
    let data_id = body["data"]["formDataId"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/forms/{}/data", form_id),
        Some(&alice),
        Some(age(json!("thirty"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "FORM_TYPE_MISMATCH");
    assert_eq!(body["index"], 0);
    assert_eq!(body["key"], "age");

    let data_uri = format!("/api/data/{}", data_id);
    let (status, _) = send_json(&app, Method::GET, &data_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
        send_json(&app, Method::PUT, &data_uri, Some(&alice), Some(age(json!(31)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["formDataId"], data_id.as_str());
    assert_eq!(body["data"]["jsonData"][0]["value"], 31);

    let (status, body) = send_json(
        &app,
        Method::GET,
        &format!("/api/forms/{}/data/mine", form_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (status, _) = send_json(&app, Method::DELETE, &data_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_json(&app, Method::GET, &data_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_forbidden_when_disallowed() {
    let app = app();
    let admin = login_as(&app, "admin@x.com", "ADMIN").await;
    let alice = login_as(&app, "a@x.com", "USER").await;
    let form_id = create_survey(&app, &admin, false).await;

    let (_, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/forms/{}/data", form_id),
        Some(&alice),
        Some(age(json!(30))),
    )
    .await;
    let data_id = body["data"]["formDataId"].as_str().unwrap().to_string();

    let (status, _) = send_json(
        &app,
        Method::PUT,
        &format!("/api/data/{}", data_id),
        Some(&alice),
        Some(age(json!(31))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_templates_by_name() {
    let app = app();
    let admin = login_as(&app, "admin@x.com", "ADMIN").await;
    create_survey(&app, &admin, true).await;

    let (status, body) =
        send_json(&app, Method::GET, "/api/forms?name=surv", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) =
        send_json(&app, Method::GET, "/api/forms?name=poll", Some(&admin), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_template_is_not_found() {
    let app = app();
    let user = login_as(&app, "u@x.com", "USER").await;

    let uri = format!("/api/forms/{}", uuid::Uuid::new_v4());
    let (status, body) = send_json(&app, Method::GET, &uri, Some(&user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_delete_template_cascades() {
    let app = app();
    let admin = login_as(&app, "admin@x.com", "ADMIN").await;
    let alice = login_as(&app, "a@x.com", "USER").await;
    let form_id = create_survey(&app, &admin, true).await;

    let (_, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/forms/{}/data", form_id),
        Some(&alice),
        Some(age(json!(30))),
    )
    .await;
    let data_id = body["data"]["formDataId"].as_str().unwrap().to_string();

    let (status, _) = send_json(
        &app,
        Method::DELETE,
        &format!("/api/forms/{}", form_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_json(
        &app,
        Method::DELETE,
        &format!("/api/forms/{}", form_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        Method::GET,
        &format!("/api/data/{}", data_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_headers_and_rows() {
    let app = app();
    let admin = login_as(&app, "admin@x.com", "ADMIN").await;
    let form_id = create_survey(&app, &admin, true).await;
    send_json(
        &app,
        Method::POST,
        &format!("/api/forms/{}/data", form_id),
        Some(&admin),
        Some(age(json!(30))),
    )
    .await;

    let request = Request::builder()
        .uri(format!("/api/forms/{}/export", form_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", admin))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with(&format!(
        "attachment; filename=\"form_responses_{}_",
        form_id
    )));
    assert!(disposition.ends_with(".csv\""));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Age,Submitted At");
    assert!(lines[1].starts_with("30,"));
}
