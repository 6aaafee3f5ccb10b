//! "Ok to warm" gate shared between the caller and the warming loop

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable on/off switch for cache warming.
///
/// The caller closes the gate around operations that must not interleave
/// with keep-alive pings (typically its own in-flight request). While
/// closed, arming is a no-op and a running loop exits at its next tick.
#[derive(Debug, Clone)]
pub struct WarmGate {
    open: Arc<AtomicBool>,
}

impl WarmGate {
    /// Create an open gate
    pub fn new() -> Self {
        Self::with_state(true)
    }

    pub fn with_state(open: bool) -> Self {
        Self {
            open: Arc::new(AtomicBool::new(open)),
        }
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Close the gate until the returned guard is dropped
    pub fn hold(&self) -> GateHold {
        self.close();
        GateHold { gate: self.clone() }
    }
}

impl Default for WarmGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard returned by [`WarmGate::hold`]; reopens the gate on drop
#[derive(Debug)]
pub struct GateHold {
    gate: WarmGate,
}

impl Drop for GateHold {
    fn drop(&mut self) {
        self.gate.open();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let gate = WarmGate::new();
        let other = gate.clone();
        assert!(other.is_open());

        gate.close();
        assert!(!other.is_open());

        other.open();
        assert!(gate.is_open());
    }

    #[test]
    fn test_hold_reopens_on_drop() {
        let gate = WarmGate::new();
        {
            let _hold = gate.hold();
            assert!(!gate.is_open());
        }
        assert!(gate.is_open());
    }

    #[test]
    fn test_with_state_closed() {
        assert!(!WarmGate::with_state(false).is_open());
    }
}
