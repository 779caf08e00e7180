//! dashbrowse - search and browse a dashboard catalog from the command line.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Drive one search session per invocation through `dashbrowse-state`.
//! - Format and display results (table or JSON).
//!
//! Does NOT handle:
//! - Search state logic (see `crates/state`) or catalog matching (see `crates/client`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing to allow `.env` to provide clap defaults.
//! - Logs go to stderr so stdout stays machine readable.

mod args;
mod dispatch;
mod error;
mod formatters;
mod session;

use args::Cli;
use clap::Parser;
use dashbrowse_client::MetricsExporter;
use dashbrowse_config::ConfigLoader;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    // Load .env file BEFORE CLI parsing so clap env defaults can read .env values
    if let Err(e) = ConfigLoader::new().load_dotenv() {
        eprintln!("Failed to load environment: {}", e);
        std::process::exit(ExitCode::ConfigError.as_i32());
    }

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let exporter = if cli.metrics {
        match MetricsExporter::install() {
            Ok(exporter) => Some(exporter),
            Err(e) => {
                eprintln!("Failed to install metrics recorder: {}", e);
                std::process::exit(ExitCode::GeneralError.as_i32());
            }
        }
    } else {
        None
    };

    let exit_code = match run_command(cli).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("{:#}", e);
            e.exit_code()
        }
    };

    if let Some(exporter) = exporter {
        eprint!("{}", exporter.render());
    }

    std::process::exit(exit_code.as_i32());
}
