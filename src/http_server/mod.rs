//! # HTTP Server Module
//!
//! JSON API over the auth service and the form lifecycle managers.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/auth/*` - Registration and login
//! - `/api/forms/*` - Templates, submissions and export
//! - `/api/data/*` - Single submissions

pub mod auth_routes;
pub mod config;
pub mod form_routes;
pub mod responses;
pub mod server;
pub mod state;

pub use config::{HttpConfigError, HttpServerConfig};
pub use server::HttpServer;
pub use state::AppState;
