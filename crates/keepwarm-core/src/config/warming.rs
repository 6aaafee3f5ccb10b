//! Warming configuration model and loading

use super::timeouts;
use crate::error::{WarmError, WarmResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Wire flavour of the completion backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// Anthropic Messages API
    #[default]
    Anthropic,
    /// OpenAI-compatible chat completions (OpenAI, DeepSeek, OpenRouter, ...)
    #[serde(alias = "openai-compatible", alias = "deepseek")]
    OpenAi,
}

impl BackendProvider {
    /// Environment variable prefix for provider settings
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC",
            Self::OpenAi => "OPENAI",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Anthropic => "https://api.anthropic.com",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }
}

impl fmt::Display for BackendProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anthropic => write!(f, "anthropic"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

impl FromStr for BackendProvider {
    type Err = WarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" | "openai-compatible" | "deepseek" => Ok(Self::OpenAi),
            other => Err(WarmError::config(format!("unknown provider '{}'", other))),
        }
    }
}

/// Connection settings for the completion backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub provider: BackendProvider,
    /// Base URL; the provider default is used when unset
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Value of the `anthropic-version` header
    pub api_version: Option<String>,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: BackendProvider::default(),
            base_url: None,
            api_key: None,
            api_version: None,
            request_timeout: timeouts::backend::request_timeout(),
        }
    }
}

impl BackendConfig {
    /// Effective base URL without a trailing slash
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }
}

/// Everything the cache warmer needs to know, loaded once at startup.
///
/// The keep-alive delay here is only the default; the effective delay is
/// re-resolved against the delay source on every arming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarmingConfig {
    /// Whether the caller sends cache-control markers at all
    pub caching_enabled: bool,
    /// Keep-alive pings per arming; 0 disables warming
    pub ping_count: u32,
    #[serde(with = "humantime_serde")]
    pub keepalive_delay: Duration,
    /// Emit a confirmation line for every successful ping
    pub verbose: bool,
    pub model: String,
    /// Backend-specific request parameters merged into every ping
    pub extra_params: Map<String, Value>,
    pub backend: BackendConfig,
}

impl Default for WarmingConfig {
    fn default() -> Self {
        Self {
            caching_enabled: true,
            ping_count: 0,
            keepalive_delay: timeouts::warming::keepalive_delay(),
            verbose: false,
            model: "claude-sonnet-4-20250514".to_string(),
            extra_params: Map::new(),
            backend: BackendConfig::default(),
        }
    }
}

impl WarmingConfig {
    /// Default configuration file location (`<config dir>/keepwarm/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("keepwarm").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> WarmResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            WarmError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded warming configuration");
        Ok(config)
    }

    /// Overlay settings from process environment variables
    pub fn apply_env(&mut self) -> WarmResult<()> {
        self.apply_env_with(|key| env::var(key).ok())
    }

    /// Overlay settings from an arbitrary key lookup.
    ///
    /// Recognized keys: `KEEPWARM_CACHING`, `KEEPWARM_PINGS`,
    /// `KEEPWARM_MODEL`, `KEEPWARM_VERBOSE`, `KEEPWARM_PROVIDER`, and
    /// `<PREFIX>_API_KEY` / `<PREFIX>_BASE_URL` for the selected provider.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> WarmResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("KEEPWARM_CACHING") {
            self.caching_enabled = parse_bool("KEEPWARM_CACHING", &value)?;
        }

        if let Some(value) = lookup("KEEPWARM_PINGS") {
            self.ping_count = value.trim().parse().map_err(|_| {
                WarmError::config(format!("Invalid KEEPWARM_PINGS value '{}'", value))
            })?;
        }

        if let Some(model) = lookup("KEEPWARM_MODEL") {
            self.model = model;
        }

        if let Some(value) = lookup("KEEPWARM_VERBOSE") {
            self.verbose = parse_bool("KEEPWARM_VERBOSE", &value)?;
        }

        if let Some(provider) = lookup("KEEPWARM_PROVIDER") {
            self.backend.provider = provider.parse()?;
        }

        let prefix = self.backend.provider.env_prefix();
        if let Some(api_key) = lookup(&format!("{}_API_KEY", prefix)) {
            self.backend.api_key = Some(api_key);
        }
        if let Some(base_url) = lookup(&format!("{}_BASE_URL", prefix)) {
            self.backend.base_url = Some(base_url);
        }

        Ok(())
    }

    /// Whether arming can ever succeed with this configuration
    pub fn is_warming_enabled(&self) -> bool {
        self.caching_enabled && self.ping_count > 0
    }

    /// Copy suitable for display, with the API key masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(key) = &config.backend.api_key {
            config.backend.api_key = Some(mask_secret(key));
        }
        config
    }
}

fn parse_bool(key: &str, value: &str) -> WarmResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(WarmError::config(format!(
            "Invalid {} value '{}'",
            key, value
        ))),
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
