//! Outcome reporting for keep-alive pings

use tracing::{info, warn};

/// Sink for the two kinds of user-visible warming output.
pub trait WarmReporter: Send + Sync {
    /// A ping failed; the loop continues
    fn warning(&self, message: &str);

    /// A ping succeeded; only called when verbose output is enabled
    fn output(&self, message: &str);
}

/// Forwards reports to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl WarmReporter for TracingReporter {
    fn warning(&self, message: &str) {
        warn!(target: "keepwarm", "{}", message);
    }

    fn output(&self, message: &str) {
        info!(target: "keepwarm", "{}", message);
    }
}
