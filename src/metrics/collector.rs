//! Metrics collection and registry.

use crate::scan::{ScanState, StatsSnapshot};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registry or encoder failure.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of scanner state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether the scanner is running.
    pub running: bool,
    /// Counters from the scan loop.
    pub stats: StatsSnapshot,
}

impl MetricsSnapshot {
    /// Creates a snapshot from a controller's state and counters.
    pub fn from_scanner(state: ScanState, stats: StatsSnapshot) -> Self {
        Self {
            running: state == ScanState::Running,
            stats,
        }
    }
}

/// Prometheus metrics registry for scan loop monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    running: IntGauge,

    // Tick metrics
    ticks_total: IntCounter,
    skipped_ticks_total: IntCounter,
    not_ready_total: IntCounter,
    capture_failures_total: IntCounter,

    // Decode metrics
    misses_total: IntCounter,
    decodes_total: IntCounterVec,

    // Delivery metrics
    rejected_total: IntCounter,
    detections_total: IntCounter,
    callback_panics_total: IntCounter,
}

/// Raises `counter` to `target`; counters never go down.
fn sync_counter(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all scanner metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let running = IntGauge::new(
            "barcode_scan_running",
            "Whether the scanner is running (1=running, 0=idle)",
        )?;

        let ticks_total = IntCounter::new(
            "barcode_scan_ticks_total",
            "Scan ticks that ran the pipeline",
        )?;
        let skipped_ticks_total = IntCounter::new(
            "barcode_scan_skipped_ticks_total",
            "Ticks skipped because a previous tick was still running",
        )?;
        let not_ready_total = IntCounter::new(
            "barcode_scan_not_ready_total",
            "Ticks where the stream had no frame ready",
        )?;
        let capture_failures_total = IntCounter::new(
            "barcode_scan_capture_failures_total",
            "Frame captures that failed",
        )?;

        let misses_total = IntCounter::new(
            "barcode_scan_misses_total",
            "Frames where no candidate decoded",
        )?;
        let decodes_total = IntCounterVec::new(
            Opts::new(
                "barcode_scan_decodes_total",
                "Successful decodes by candidate kind",
            ),
            &["candidate"],
        )?;

        let rejected_total = IntCounter::new(
            "barcode_scan_rejected_total",
            "Decoded results dropped by validation",
        )?;
        let detections_total = IntCounter::new(
            "barcode_scan_detections_total",
            "Detections delivered to the consumer",
        )?;
        let callback_panics_total = IntCounter::new(
            "barcode_scan_callback_panics_total",
            "Detection callbacks that panicked",
        )?;

        registry.register(Box::new(running.clone()))?;
        registry.register(Box::new(ticks_total.clone()))?;
        registry.register(Box::new(skipped_ticks_total.clone()))?;
        registry.register(Box::new(not_ready_total.clone()))?;
        registry.register(Box::new(capture_failures_total.clone()))?;
        registry.register(Box::new(misses_total.clone()))?;
        registry.register(Box::new(decodes_total.clone()))?;
        registry.register(Box::new(rejected_total.clone()))?;
        registry.register(Box::new(detections_total.clone()))?;
        registry.register(Box::new(callback_panics_total.clone()))?;

        Ok(Self {
            registry,
            running,
            ticks_total,
            skipped_ticks_total,
            not_ready_total,
            capture_failures_total,
            misses_total,
            decodes_total,
            rejected_total,
            detections_total,
            callback_panics_total,
        })
    }

    /// Updates all metrics from a snapshot of scanner state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        let stats = &snapshot.stats;

        self.running.set(i64::from(snapshot.running));

        sync_counter(&self.ticks_total, stats.ticks);
        sync_counter(&self.skipped_ticks_total, stats.skipped_ticks);
        sync_counter(&self.not_ready_total, stats.not_ready);
        sync_counter(&self.capture_failures_total, stats.capture_failures);

        sync_counter(&self.misses_total, stats.misses);
        for (candidate, hits) in [
            ("raw", stats.hits_raw),
            ("enhanced", stats.hits_enhanced),
            ("center_strip", stats.hits_center_strip),
        ] {
            sync_counter(&self.decodes_total.with_label_values(&[candidate]), hits);
        }

        sync_counter(&self.rejected_total, stats.rejected);
        sync_counter(&self.detections_total, stats.delivered);
        sync_counter(&self.callback_panics_total, stats.callback_panics);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot::from_scanner(
            ScanState::Running,
            StatsSnapshot {
                ticks: 10,
                misses: 7,
                hits_raw: 2,
                hits_center_strip: 1,
                rejected: 1,
                delivered: 2,
                ..Default::default()
            },
        );

        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("barcode_scan_running 1"));
        assert!(output.contains("barcode_scan_ticks_total 10"));
        assert!(output.contains("barcode_scan_detections_total 2"));
        assert!(output.contains("barcode_scan_decodes_total{candidate=\"center_strip\"} 1"));
    }

    #[test]
    fn test_counters_never_decrease() {
        let registry = MetricsRegistry::new().unwrap();

        let mut stats = StatsSnapshot {
            ticks: 5,
            ..Default::default()
        };
        registry.update(&MetricsSnapshot::from_scanner(ScanState::Running, stats));

        stats.ticks = 3;
        registry.update(&MetricsSnapshot::from_scanner(ScanState::Idle, stats));

        let output = registry.encode().unwrap();
        assert!(output.contains("barcode_scan_ticks_total 5"));
        assert!(output.contains("barcode_scan_running 0"));
    }

    #[test]
    fn test_metrics_encode() {
        let registry = MetricsRegistry::new().unwrap();
        let output = registry.encode().unwrap();

        assert!(output.contains("barcode_scan_running"));
        assert!(output.contains("barcode_scan_ticks_total"));
        assert!(output.contains("barcode_scan_detections_total"));
    }
}
