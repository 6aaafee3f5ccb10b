//! Command routing logic for CLI

use crate::args::{Cli, Commands};
use crate::commands;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, cli.verbose).await,
        Commands::Config { config } => commands::config::show(config.as_deref()),
    }
}
