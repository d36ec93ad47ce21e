//! CLI argument definitions using clap
//!
//! Commands:
//! - formsmith serve --config <path>
//! - formsmith check --schema <file> [--data <file>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// formsmith - schema-driven form templates and submissions
#[derive(Parser, Debug)]
#[command(name = "formsmith")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./formsmith.json")]
        config: PathBuf,
    },

    /// Validate a schema file and, optionally, a submission against it
    Check {
        /// JSON file holding the schema (array of field descriptors)
        #[arg(long)]
        schema: PathBuf,

        /// JSON file holding a submission (array of field values)
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
