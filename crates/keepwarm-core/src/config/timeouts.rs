//! Centralized timing configuration
//!
//! Default durations used by the warming loop and the HTTP backends.
//! Each value can be overridden through `WarmingConfig`.

use std::time::Duration;

/// Timing of the keep-alive schedule
pub mod warming {
    use super::*;

    /// Server-side prompt cache TTL (5 minutes)
    pub const CACHE_TTL_SECS: u64 = 300;

    /// Safety margin subtracted from the TTL so the ping lands before expiry
    pub const KEEPALIVE_MARGIN_SECS: u64 = 5;

    /// Default delay between keep-alive pings (295 seconds)
    pub const KEEPALIVE_DELAY_SECS: u64 = CACHE_TTL_SECS - KEEPALIVE_MARGIN_SECS;

    /// Polling period of the warming loop (1 second)
    pub const TICK_MILLIS: u64 = 1_000;

    /// Get the default keep-alive delay as Duration
    pub fn keepalive_delay() -> Duration {
        Duration::from_secs(KEEPALIVE_DELAY_SECS)
    }

    /// Get the loop tick as Duration
    pub fn tick() -> Duration {
        Duration::from_millis(TICK_MILLIS)
    }
}

/// Default timeout values for backend HTTP calls
pub mod backend {
    use super::*;

    /// Default connection timeout (30 seconds)
    pub const CONNECTION_SECS: u64 = 30;

    /// Default request timeout (60 seconds)
    pub const REQUEST_SECS: u64 = 60;

    /// Get connection timeout as Duration
    pub fn connection_timeout() -> Duration {
        Duration::from_secs(CONNECTION_SECS)
    }

    /// Get request timeout as Duration
    pub fn request_timeout() -> Duration {
        Duration::from_secs(REQUEST_SECS)
    }
}
