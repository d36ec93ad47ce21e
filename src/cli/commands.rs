//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::EnvFilter;

use crate::auth::InMemoryUserRepository;
use crate::export::CsvExporter;
use crate::http_server::{AppState, HttpServer};
use crate::notify::create_notifier;
use crate::schema::{Schema, SchemaValidator, Submission, SubmissionValidator};
use crate::store::{FileFormStore, FormStore, InMemoryFormStore};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_json_file, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(&config),
        Command::Check { schema, data } => check(&schema, data.as_deref()),
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // already installed (e.g. by a test harness) is fine
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn open_store(config: &Config) -> CliResult<Arc<dyn FormStore>> {
    match &config.data_dir {
        Some(dir) => {
            let store = FileFormStore::open(dir)
                .map_err(|e| CliError::boot_failed(format!("Failed to open form store: {}", e)))?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("no data_dir configured, forms are kept in memory only");
            Ok(Arc::new(InMemoryFormStore::new()))
        }
    }
}

/// Start the HTTP API server
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    init_logging(&config.log_level);

    let store = open_store(&config)?;
    if config.email.is_none() {
        tracing::info!("no email settings, submission receipts are only logged");
    }

    let state = AppState::new(
        store,
        Arc::new(InMemoryUserRepository::new()),
        config.jwt.to_jwt_config(),
        create_notifier(config.email.clone()),
        Arc::new(CsvExporter::new()),
    );
    let server = HttpServer::with_state(config.http.clone(), Arc::new(state))
        .map_err(|e| CliError::config_error(e.to_string()))?;

    // Start the async runtime and run the server
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Validate a schema file and optionally a submission file against it.
///
/// Prints the normalized schema (and submission) on success.
pub fn check(schema_path: &Path, data_path: Option<&Path>) -> CliResult<()> {
    let (schema, submission) = check_files(schema_path, data_path)?;

    let mut out = json!({
        "fields": schema.len(),
        "schema": serde_json::to_value(&schema)?,
    });
    if let Some(submission) = submission {
        out["submission"] = submission.to_json();
    }
    write_response(out)
}

fn check_files(
    schema_path: &Path,
    data_path: Option<&Path>,
) -> CliResult<(Schema, Option<Submission>)> {
    let schema = SchemaValidator::new().validate(&read_json_file(schema_path)?)?;

    let submission = match data_path {
        Some(path) => {
            let candidate = read_json_file(path)?;
            Some(SubmissionValidator::new(&schema).validate(&candidate)?)
        }
        None => None,
    };

    Ok((schema, submission))
}
