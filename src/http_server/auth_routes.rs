//! Auth HTTP Routes
//!
//! Registration and login. Neither requires a bearer token.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};

use super::responses::{auth_failure, ApiResponse, ApiResult};
use super::state::AppState;
use crate::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

/// Auth routes with shared state
pub fn auth_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .with_state(state)
}

/// Register handler
async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<ApiResponse<RegisterResponse>>> {
    let registered = state.auth.register(request).map_err(auth_failure)?;
    Ok(ApiResponse::new("User registered successfully", registered))
}

/// Login handler
async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    let login = state.auth.login(request).map_err(auth_failure)?;
    Ok(ApiResponse::new("Login successful", login))
}
