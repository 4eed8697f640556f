//! Index Keeper main entry point.
//!
//! Reads the desired state, runs the requested command and exits non-zero
//! with the error printed on any failure.

use std::env;
use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use index_keeper::cli::{self, Cli};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging on stderr, leaving stdout for the result line.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "index_keeper={default_level},index_keeper_repository={default_level}"
        ))
    });

    let json = env::var("INDEX_KEEPER_LOG_FORMAT").is_ok_and(|format| format == "json");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    info!(
        command = ?cli.command,
        version = env!("CARGO_PKG_VERSION"),
        "Starting index-keeper"
    );

    // Ctrl-C abandons the engine call in flight and skips the rest of the run
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling run");
                cancel.cancel();
            }
        }
    });

    match cli::run(cli, cancel).await {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "index-keeper failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
