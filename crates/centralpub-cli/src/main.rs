//! centralpub CLI binary.
//!
//! Parses arguments with `clap`, initializes logging via `tracing`, wires
//! Ctrl-C to a cancellation token, and dispatches to the command handlers.

mod cli;
mod commands;

use miette::Result;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupted, cancelling");
                on_interrupt.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {e}"),
        }
    });

    commands::dispatch(args, cancel).await
}
