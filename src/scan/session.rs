//! Per-controller scan session state.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a scan controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    /// No stream, no timer.
    #[default]
    Idle,
    /// Stream acquisition in flight.
    Starting,
    /// Periodic ticks active.
    Running,
}

/// Mutable session record owned by one controller.
#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    last_accepted: String,
    state: ScanState,
    active_device: Option<String>,
}

impl ScanSession {
    /// The last value delivered to the consumer, or "" if none yet.
    pub fn last_accepted(&self) -> &str {
        &self.last_accepted
    }

    /// Records `text` as delivered.
    pub fn set_last_accepted(&mut self, text: &str) {
        self.last_accepted.clear();
        self.last_accepted.push_str(text);
    }

    /// Lifecycle state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Moves the session to `state`.
    pub fn set_state(&mut self, state: ScanState) {
        self.state = state;
    }

    /// Device id opened for this session.
    pub fn active_device(&self) -> Option<&str> {
        self.active_device.as_deref()
    }

    /// Records the opened device id.
    pub fn set_active_device(&mut self, device: Option<String>) {
        self.active_device = device;
    }

    /// Returns true in the Running state.
    pub fn is_running(&self) -> bool {
        self.state == ScanState::Running
    }

    /// Returns the session to its initial idle state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
