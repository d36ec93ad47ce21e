//! CLI module for formsmith
//!
//! Provides command-line interface for:
//! - serve: Start the HTTP API
//! - check: Validate schema and submission files offline

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, run, run_command, serve};
pub use config::{Config, JwtSettings};
pub use errors::{CliError, CliErrorCode, CliResult};
