//! Configuration loading and display

use crate::console::CliConsole;
use anyhow::{Context, Result};
use keepwarm_core::WarmingConfig;
use std::path::{Path, PathBuf};

/// Effective configuration plus the file it came from, if any
pub struct LoadedConfig {
    pub config: WarmingConfig,
    pub source: Option<PathBuf>,
}

/// Load configuration: explicit file, else the default file if present,
/// else built-in defaults; then overlay the environment.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => WarmingConfig::default_path().filter(|path| path.exists()),
    };

    let mut config = match &source {
        Some(path) => WarmingConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => WarmingConfig::default(),
    };

    config
        .apply_env()
        .context("Invalid configuration in environment")?;

    Ok(LoadedConfig { config, source })
}

/// Show the effective configuration
pub fn show(explicit: Option<&Path>) -> Result<()> {
    let console = CliConsole::new(true);
    console.print_header("Configuration");

    let loaded = load(explicit)?;
    match &loaded.source {
        Some(path) => console.success(&format!("Loaded configuration from: {}", path.display())),
        None => console.info("No configuration file found, using defaults"),
    }

    let rendered = toml::to_string_pretty(&loaded.config.redacted())
        .context("Failed to render configuration")?;
    println!("{rendered}");

    if !loaded.config.is_warming_enabled() {
        console.warn("Cache warming is disabled: set ping_count > 0 and caching_enabled = true");
    }
    Ok(())
}
