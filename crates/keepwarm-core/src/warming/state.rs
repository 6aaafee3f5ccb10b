//! Shared scheduling state of the cache warmer

use super::payload::CacheablePayload;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Lifecycle of the warming loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// No loop has been launched yet
    Idle,
    /// Loop alive with pings left in the countdown
    Running,
    /// Loop alive, countdown finished; waits for a re-arm
    Exhausted,
    /// Loop exited after observing the gate closed or a shutdown
    Terminated,
}

/// Ping taken off the countdown by the loop, executed outside the lock
pub(crate) struct DuePing {
    pub payload: Arc<dyn CacheablePayload>,
    pub remaining_after: u32,
}

/// Mutable record shared by `arm` and the loop.
///
/// Always accessed under the warmer's mutex; every method here is one
/// atomic transition from the point of view of the other side.
pub(crate) struct WarmState {
    pub configured_pings: u32,
    pub remaining_pings: u32,
    pub interval: Duration,
    pub next_fire_at: Option<Instant>,
    pub payload: Option<Arc<dyn CacheablePayload>>,
    pub worker_running: bool,
    pub worker_handle: Option<JoinHandle<()>>,
    pub worker_launches: u64,
    pub pings_succeeded: u64,
    pub pings_failed: u64,
}

impl WarmState {
    pub fn new() -> Self {
        Self {
            configured_pings: 0,
            remaining_pings: 0,
            interval: Duration::ZERO,
            next_fire_at: None,
            payload: None,
            worker_running: false,
            worker_handle: None,
            worker_launches: 0,
            pings_succeeded: 0,
            pings_failed: 0,
        }
    }

    /// Reset the countdown and timer around a fresh payload.
    ///
    /// Returns `false` and leaves the state untouched when `now + interval`
    /// is not representable.
    pub fn arm(
        &mut self,
        payload: Arc<dyn CacheablePayload>,
        pings: u32,
        interval: Duration,
        now: Instant,
    ) -> bool {
        let Some(next_fire_at) = now.checked_add(interval) else {
            return false;
        };

        self.configured_pings = pings;
        self.remaining_pings = pings;
        self.interval = interval;
        self.next_fire_at = Some(next_fire_at);
        self.payload = Some(payload);
        true
    }

    /// Claim the next ping if one is due at `now`.
    ///
    /// The decrement and the reschedule happen together, before any network
    /// I/O, so a slow backend call cannot compress the next interval.
    pub fn take_due_ping(&mut self, now: Instant) -> Option<DuePing> {
        if self.remaining_pings == 0 {
            return None;
        }
        let next_fire_at = self.next_fire_at?;
        if now < next_fire_at {
            return None;
        }
        let payload = self.payload.clone()?;

        self.remaining_pings -= 1;
        self.next_fire_at = now.checked_add(self.interval);

        Some(DuePing {
            payload,
            remaining_after: self.remaining_pings,
        })
    }

    pub fn phase(&self) -> LoopPhase {
        match (self.worker_running, self.worker_launches) {
            (true, _) if self.remaining_pings == 0 => LoopPhase::Exhausted,
            (true, _) => LoopPhase::Running,
            (false, 0) => LoopPhase::Idle,
            (false, _) => LoopPhase::Terminated,
        }
    }

    pub fn snapshot(&self) -> WarmSnapshot {
        WarmSnapshot {
            phase: self.phase(),
            configured_pings: self.configured_pings,
            remaining_pings: self.remaining_pings,
            interval: self.interval,
            next_fire_at: self.next_fire_at,
            armed: self.payload.is_some(),
            worker_launches: self.worker_launches,
            pings_succeeded: self.pings_succeeded,
            pings_failed: self.pings_failed,
        }
    }
}

/// Point-in-time copy of the warmer's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmSnapshot {
    pub phase: LoopPhase,
    pub configured_pings: u32,
    pub remaining_pings: u32,
    pub interval: Duration,
    pub next_fire_at: Option<Instant>,
    /// Whether a payload has ever been armed
    pub armed: bool,
    pub worker_launches: u64,
    pub pings_succeeded: u64,
    pub pings_failed: u64,
}

impl WarmSnapshot {
    /// Pings attempted so far, successful or not
    pub fn pings_fired(&self) -> u64 {
        self.pings_succeeded + self.pings_failed
    }
}
