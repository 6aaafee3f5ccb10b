//! The cache warmer: arming interface and lifecycle guard

use super::gate::WarmGate;
use super::payload::CacheablePayload;
use super::reporter::{TracingReporter, WarmReporter};
use super::state::{WarmSnapshot, WarmState};
use super::worker;
use crate::config::{DelaySource, EnvDelaySource, WarmingConfig, resolve_delay};
use crate::error::{WarmError, WarmResult};
use crate::llm::backend::CompletionBackend;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Everything the warming loop shares with the warmer
pub(crate) struct WarmerShared {
    pub config: WarmingConfig,
    pub backend: Arc<dyn CompletionBackend>,
    pub reporter: Arc<dyn WarmReporter>,
    pub gate: WarmGate,
    pub shutdown: CancellationToken,
    pub state: Mutex<WarmState>,
}

impl WarmerShared {
    /// True when the loop must stop: gate closed or shutdown requested
    pub fn is_disabled(&self) -> bool {
        self.shutdown.is_cancelled() || !self.gate.is_open()
    }
}

/// Keeps a backend's prompt cache warm with periodic minimal requests.
///
/// Call [`CacheWarmer::arm`] whenever fresh cacheable content has been sent.
/// A single background task then pings the backend `ping_count` times,
/// `keepalive_delay` apart, replaying the most recently armed payload.
///
/// # Shutdown
///
/// [`CacheWarmer::shutdown`] (or dropping the warmer) stops the loop at its
/// next tick, or immediately when it is idle between ticks. A backend call
/// already in flight is not aborted: at most one more ping may complete or
/// fail after shutdown is requested.
pub struct CacheWarmer {
    shared: Arc<WarmerShared>,
    delay_source: Arc<dyn DelaySource>,
    runtime: Handle,
}

impl CacheWarmer {
    /// Start building a warmer around a backend
    pub fn builder(
        config: WarmingConfig,
        backend: Arc<dyn CompletionBackend>,
    ) -> CacheWarmerBuilder {
        CacheWarmerBuilder {
            config,
            backend,
            reporter: None,
            delay_source: None,
            gate: None,
            runtime: None,
        }
    }

    /// Arm the warmer with a fresh payload and return it unchanged.
    ///
    /// A no-op unless caching is enabled, `ping_count > 0`, the gate is
    /// open and the warmer has not been shut down. Otherwise the countdown
    /// restarts at `ping_count`, the first ping is scheduled one interval
    /// from now, and the loop is launched if none is running. Never performs
    /// network I/O itself.
    pub fn arm<P>(&self, payload: Arc<P>) -> Arc<P>
    where
        P: CacheablePayload + 'static,
    {
        let config = &self.shared.config;
        if !config.caching_enabled {
            debug!("Cache warming skipped: caching disabled");
            return payload;
        }
        if config.ping_count == 0 {
            debug!("Cache warming skipped: no keep-alive pings configured");
            return payload;
        }
        if self.shared.is_disabled() {
            debug!("Cache warming skipped: warming not permitted right now");
            return payload;
        }

        let interval = self.resolve_interval();
        let stored: Arc<dyn CacheablePayload> = payload.clone();

        let launched = {
            let mut state = self.shared.state.lock();
            if !state.arm(stored, config.ping_count, interval, Instant::now()) {
                warn!(
                    interval_secs = interval.as_secs_f64(),
                    "Cache warming skipped: keep-alive delay out of range"
                );
                return payload;
            }
            self.ensure_worker(&mut state)
        };

        debug!(
            pings = config.ping_count,
            interval_secs = interval.as_secs_f64(),
            launched,
            "Cache warmer armed"
        );
        payload
    }

    /// Launch the loop unless one is alive. Must be called with the state
    /// lock held so the check and the launch are a single step.
    fn ensure_worker(&self, state: &mut WarmState) -> bool {
        if state.worker_running {
            return false;
        }
        state.worker_running = true;
        state.worker_launches += 1;
        state.worker_handle = Some(
            self.runtime
                .spawn(worker::run(Arc::clone(&self.shared))),
        );
        info!(launch = state.worker_launches, "Cache warming loop launched");
        true
    }

    fn resolve_interval(&self) -> Duration {
        resolve_delay(
            self.shared.config.keepalive_delay,
            self.delay_source.delay_override().as_deref(),
        )
    }

    /// Gate controlling whether warming is currently permitted
    pub fn gate(&self) -> &WarmGate {
        &self.shared.gate
    }

    pub fn config(&self) -> &WarmingConfig {
        &self.shared.config
    }

    pub fn snapshot(&self) -> WarmSnapshot {
        self.shared.state.lock().snapshot()
    }

    /// Request the loop to stop; arming becomes a permanent no-op
    pub fn shutdown(&self) {
        if !self.shared.shutdown.is_cancelled() {
            debug!("Cache warmer shutdown requested");
        }
        self.shared.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.shutdown.is_cancelled()
    }

    /// Wait for the most recently launched loop to exit.
    ///
    /// Returns immediately if no loop was launched. Only returns once the
    /// loop observes the gate closed or a shutdown.
    pub async fn wait_stopped(&self) {
        let handle = self.shared.state.lock().worker_handle.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl Drop for CacheWarmer {
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
    }
}

/// Builder for [`CacheWarmer`]
pub struct CacheWarmerBuilder {
    config: WarmingConfig,
    backend: Arc<dyn CompletionBackend>,
    reporter: Option<Arc<dyn WarmReporter>>,
    delay_source: Option<Arc<dyn DelaySource>>,
    gate: Option<WarmGate>,
    runtime: Option<Handle>,
}

impl CacheWarmerBuilder {
    /// Report outcomes somewhere other than `tracing`
    pub fn reporter(mut self, reporter: Arc<dyn WarmReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Override where the per-arming delay override comes from
    pub fn delay_source(mut self, source: Arc<dyn DelaySource>) -> Self {
        self.delay_source = Some(source);
        self
    }

    /// Share an existing gate with the caller
    pub fn gate(mut self, gate: WarmGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Runtime hosting the loop; defaults to the current one
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> WarmResult<CacheWarmer> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|e| {
                WarmError::runtime(format!("cache warmer needs a tokio runtime: {}", e))
            })?,
        };

        let shared = WarmerShared {
            config: self.config,
            backend: self.backend,
            reporter: self
                .reporter
                .unwrap_or_else(|| Arc::new(TracingReporter)),
            gate: self.gate.unwrap_or_default(),
            shutdown: CancellationToken::new(),
            state: Mutex::new(WarmState::new()),
        };

        Ok(CacheWarmer {
            shared: Arc::new(shared),
            delay_source: self
                .delay_source
                .unwrap_or_else(|| Arc::new(EnvDelaySource::default())),
            runtime,
        })
    }
}
