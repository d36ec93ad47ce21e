//! Configuration file
//!
//! ```json
//! {
//!   "data_dir": "./data",
//!   "http": { "host": "127.0.0.1", "port": 8080, "cors_origins": [], "max_body_bytes": 1048576 },
//!   "jwt": { "secret": "...", "ttl_minutes": 60 },
//!   "email": { "smtp_host": "smtp.example.com", "from_email": "forms@example.com" },
//!   "log_level": "info"
//! }
//! ```
//!
//! Without `data_dir` the form store lives in memory. Without `email`,
//! notifications are only logged.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use super::errors::{CliError, CliResult};
use crate::auth::JwtConfig;
use crate::http_server::HttpServerConfig;
use crate::notify::EmailConfig;

/// Shortest accepted signing secret, in bytes
const MIN_SECRET_LEN: usize = 16;

/// Token settings
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    #[serde(default)]
    pub secret: String,

    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,

    #[serde(default = "default_token_party")]
    pub issuer: String,

    #[serde(default = "default_token_party")]
    pub audience: String,
}

fn default_ttl_minutes() -> i64 {
    60
}

fn default_token_party() -> String {
    "formsmith".to_string()
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_minutes: default_ttl_minutes(),
            issuer: default_token_party(),
            audience: default_token_party(),
        }
    }
}

impl JwtSettings {
    pub fn to_jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.secret.clone(),
            access_token_ttl: chrono::Duration::minutes(self.ttl_minutes),
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory for the form snapshot; in-memory when absent
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub jwt: JwtSettings,

    /// SMTP settings for submission receipts
    #[serde(default)]
    pub email: Option<EmailConfig>,

    /// Default log filter, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    /// Parse and validate configuration JSON
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.jwt.secret.len() < MIN_SECRET_LEN {
            return Err(CliError::config_error(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        if self.jwt.ttl_minutes <= 0 {
            return Err(CliError::config_error("jwt.ttl_minutes must be > 0"));
        }

        self.http
            .validate()
            .map_err(|e| CliError::config_error(e.to_string()))?;

        if let Some(email) = &self.email {
            if email.smtp_host.trim().is_empty() {
                return Err(CliError::config_error("email.smtp_host must not be empty"));
            }
        }

        if let Err(e) = EnvFilter::try_new(&self.log_level) {
            return Err(CliError::config_error(format!(
                "Invalid log_level '{}': {}",
                self.log_level, e
            )));
        }

        Ok(())
    }
}
