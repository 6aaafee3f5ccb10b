//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keepwarm")]
#[command(about = "Keep a completion backend's prompt cache warm between requests")]
#[command(
    long_about = r#"Keep a completion backend's prompt cache warm between requests

USAGE:
  keepwarm run --messages prefix.json --pings 3   # Arm and keep warming
  keepwarm config                                 # Show effective configuration

While `run` is active, type `rearm`, `pause`, `resume`, `status` or `quit`."#
)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (debug logging and per-ping confirmations)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Arm the warmer with a message prefix and keep it warm
    Run(RunArgs),

    /// Print the effective configuration with secrets masked
    Config {
        /// Path to configuration file (defaults to the user config dir)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// JSON file holding the cacheable messages
    #[arg(long, short)]
    pub messages: PathBuf,

    /// Path to configuration file (defaults to the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Backend wire format: anthropic or openai
    #[arg(long)]
    pub provider: Option<String>,

    /// Model to ping
    #[arg(long)]
    pub model: Option<String>,

    /// Keep-alive pings per arming
    #[arg(long)]
    pub pings: Option<u32>,
}
