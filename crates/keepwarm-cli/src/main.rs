//! keepwarm CLI
//!
//! Keeps a backend's prompt cache warm for a fixed message prefix.
//!
//! ```bash
//! keepwarm run --messages prefix.json --pings 3 --verbose
//! keepwarm config
//! ```
//!
//! While `run` is active, stdin accepts `rearm`, `pause`, `resume`,
//! `status` and `quit`.

mod args;
mod commands;
mod console;
mod router;

use args::Cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise --verbose raises the default to debug
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    router::route(cli).await
}
