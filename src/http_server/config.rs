//! Listener settings for the form API
//!
//! Lives under the `http` key of the formsmith config file. The host must be
//! an IP literal; origins must be valid header values. Both are checked up
//! front so a bad entry fails startup instead of quietly weakening CORS.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted request body unless configured otherwise (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Rejected `http` settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HttpConfigError {
    #[error("http.host '{0}' is not an IP address")]
    InvalidHost(String),

    #[error("http.port must be non-zero")]
    ZeroPort,

    #[error("http.cors_origins entry '{0}' is not a valid origin")]
    InvalidOrigin(String),

    #[error("http.max_body_bytes must be > 0")]
    ZeroBodyLimit,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Address to bind, loopback unless configured
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origins allowed to call the API; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Upper bound on template and submission payloads
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl HttpServerConfig {
    /// Defaults with a different port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Check every setting, reporting the first bad one
    pub fn validate(&self) -> Result<(), HttpConfigError> {
        if self.port == 0 {
            return Err(HttpConfigError::ZeroPort);
        }
        if self.max_body_bytes == 0 {
            return Err(HttpConfigError::ZeroBodyLimit);
        }
        self.socket_addr()?;
        self.allowed_origins()?;
        Ok(())
    }

    /// Address the listener binds to
    pub fn socket_addr(&self) -> Result<SocketAddr, HttpConfigError> {
        let ip: IpAddr = self
            .host
            .trim()
            .parse()
            .map_err(|_| HttpConfigError::InvalidHost(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Configured origins as header values; empty means any origin
    pub fn allowed_origins(&self) -> Result<Vec<HeaderValue>, HttpConfigError> {
        self.cors_origins
            .iter()
            .map(|origin| {
                let trimmed = origin.trim().trim_end_matches('/');
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    return Err(HttpConfigError::InvalidOrigin(origin.clone()));
                }
                HeaderValue::from_str(trimmed)
                    .map_err(|_| HttpConfigError::InvalidOrigin(origin.clone()))
            })
            .collect()
    }
}
