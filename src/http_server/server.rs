//! # HTTP Server
//!
//! Main HTTP server combining the route modules.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth_routes::auth_routes;
use super::config::{HttpConfigError, HttpServerConfig};
use super::form_routes::form_routes;
use super::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// HTTP server for the form API
pub struct HttpServer {
    addr: SocketAddr,
    router: Router,
}

impl HttpServer {
    /// Create a server over the given services.
    ///
    /// Fails if the listener settings do not validate.
    pub fn with_state(config: HttpServerConfig, state: Arc<AppState>) -> Result<Self, HttpConfigError> {
        config.validate()?;
        let addr = config.socket_addr()?;
        let router = Self::build_router(&config, state)?;
        Ok(Self { addr, router })
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, state: Arc<AppState>) -> Result<Router, HttpConfigError> {
        let origins = config.allowed_origins()?;
        let cors = if origins.is_empty() {
            CorsLayer::new().allow_origin(Any)
        } else {
            CorsLayer::new().allow_origin(AllowOrigin::list(origins))
        }
        .allow_methods(Any)
        .allow_headers(Any);

        let api = Router::new()
            .nest("/auth", auth_routes(state.clone()))
            .merge(form_routes(state));

        Ok(Router::new()
            .merge(health_routes())
            .nest("/api", api)
            .layer(DefaultBodyLimit::max(config.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .layer(cors))
    }

    /// Address the server will bind
    pub fn socket_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        tracing::info!(addr = %self.addr, "starting formsmith HTTP server");

        let listener = TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
