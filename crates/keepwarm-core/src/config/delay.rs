//! Keep-alive delay resolution
//!
//! The delay between pings is resolved on every arming, so a changed
//! override takes effect at the next `arm` without restarting anything.

use std::env;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// Environment variable holding a delay override in (fractional) seconds
pub const KEEPALIVE_DELAY_ENV: &str = "KEEPWARM_KEEPALIVE_DELAY";

/// Source of a raw keep-alive delay override.
///
/// Closures returning `Option<String>` implement this trait, which keeps
/// tests free of process-wide environment mutation.
pub trait DelaySource: Send + Sync {
    /// Raw override value, if one is set
    fn delay_override(&self) -> Option<String>;
}

impl<F> DelaySource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn delay_override(&self) -> Option<String> {
        self()
    }
}

/// Reads the override from an environment variable
#[derive(Debug, Clone)]
pub struct EnvDelaySource {
    var: String,
}

impl EnvDelaySource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvDelaySource {
    fn default() -> Self {
        Self::new(KEEPALIVE_DELAY_ENV)
    }
}

impl DelaySource for EnvDelaySource {
    fn delay_override(&self) -> Option<String> {
        env::var(&self.var).ok()
    }
}

/// Resolve the effective delay from a default and an optional raw override.
///
/// Empty, unparseable, negative or non-finite overrides fall back to the
/// default, as do delays too large to schedule from now. Zero is accepted
/// and makes every tick due.
pub fn resolve_delay(default: Duration, raw: Option<&str>) -> Duration {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default;
    };

    match raw.parse::<f64>() {
        Ok(secs) => match Duration::try_from_secs_f64(secs) {
            Ok(delay) if Instant::now().checked_add(delay).is_some() => delay,
            _ => {
                warn!(value = raw, "Ignoring out-of-range keep-alive delay override");
                default
            }
        },
        Err(_) => {
            warn!(value = raw, "Ignoring non-numeric keep-alive delay override");
            default
        }
    }
}
