//! Best-effort camera capability tuning.
//!
//! Focus and torch support vary wildly between devices and backends, so
//! tuning is a probe-then-apply step whose outcome is reported rather
//! than raised. Callers log the report and carry on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Advanced capabilities requested after the stream opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityHints {
    /// Request continuous autofocus.
    pub continuous_autofocus: bool,
    /// Fixed focus distance as a fraction of the device's range (0.0 - 1.0).
    /// `None` leaves focus distance untouched.
    pub focus_distance: Option<f32>,
    /// Request the torch (flash LED) on.
    pub torch: bool,
}

impl Default for CapabilityHints {
    fn default() -> Self {
        Self {
            continuous_autofocus: true,
            focus_distance: Some(0.5), // mid-range
            torch: false,
        }
    }
}

/// Reasons a single capability could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The device does not offer the capability.
    #[error("{0} is not supported by this device")]
    Unsupported(&'static str),
    /// The device refused the requested value.
    #[error("failed to apply {capability}: {reason}")]
    Rejected {
        /// Capability name.
        capability: &'static str,
        /// Backend message.
        reason: String,
    },
}

/// Outcome of applying [`CapabilityHints`] to an open stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityReport {
    /// Per-capability results, in application order. Hints that were not
    /// requested are absent.
    pub results: Vec<(&'static str, Result<(), CapabilityError>)>,
}

impl CapabilityReport {
    /// Records the outcome for one capability.
    pub fn record(&mut self, capability: &'static str, result: Result<(), CapabilityError>) {
        self.results.push((capability, result));
    }

    /// Returns true if every requested capability was applied.
    pub fn all_applied(&self) -> bool {
        self.results.iter().all(|(_, r)| r.is_ok())
    }

    /// Logs failures at warn level and applied capabilities at debug level.
    pub fn log(&self) {
        for (capability, result) in &self.results {
            match result {
                Ok(()) => tracing::debug!(capability, "Camera capability applied"),
                Err(e) => tracing::warn!(capability, error = %e, "Camera capability not applied"),
            }
        }
    }
}
