//! Prometheus metrics exporter for scan loop monitoring.
//!
//! This module provides observability into the scanner by exposing
//! metrics in Prometheus format via an HTTP endpoint.
//!
//! # Metrics Exposed
//!
//! ## Lifecycle
//! - `barcode_scan_running` - Current state (1=running, 0=idle)
//!
//! ## Tick Metrics
//! - `barcode_scan_ticks_total` - Ticks that ran the pipeline
//! - `barcode_scan_skipped_ticks_total` - Overlapping or overrun ticks dropped
//! - `barcode_scan_not_ready_total` - Ticks without a frame ready
//! - `barcode_scan_capture_failures_total` - Failed frame captures
//!
//! ## Decode Metrics
//! - `barcode_scan_misses_total` - Frames with no symbol
//! - `barcode_scan_decodes_total{candidate}` - Decodes per candidate kind
//!
//! ## Delivery Metrics
//! - `barcode_scan_rejected_total` - Results dropped by validation
//! - `barcode_scan_detections_total` - Detections delivered
//! - `barcode_scan_callback_panics_total` - Consumer callbacks that panicked
//!
//! # Example
//!
//! ```no_run
//! use barcode_scan::metrics::{MetricsRegistry, MetricsSnapshot};
//! use barcode_scan::scan::{ScanState, StatsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot::from_scanner(ScanState::Running, StatsSnapshot::default());
//! registry.update(&snapshot);
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError, SnapshotProvider};
