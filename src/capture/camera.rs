//! Frame source abstraction over camera hardware.
//!
//! This module provides a trait-based abstraction over capture devices,
//! allowing for both real camera input and scripted implementations for
//! testing.

use super::capability::{CapabilityError, CapabilityHints, CapabilityReport};
use super::device::{select_device, CameraDevice};
use super::{CaptureConfig, Frame};
use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors that can occur during camera operations.
///
/// `PermissionDenied`, `DeviceNotFound` and `Hardware` are the acquisition
/// failures reported by [`FrameSource::open`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// The user or platform refused camera access.
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    /// No matching video input device.
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    /// The device exists but could not be started.
    #[error("camera hardware error: {0}")]
    Hardware(String),
    /// No stream is open.
    #[error("camera not open")]
    NotOpen,
    /// A frame could not be read from an open stream.
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
}

impl CameraError {
    /// Classifies a backend error message into the acquisition taxonomy.
    pub fn from_backend_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        if ["permission", "denied", "not authorized", "unauthorized", "notallowed"]
            .iter()
            .any(|k| lower.contains(k))
        {
            CameraError::PermissionDenied(message)
        } else if ["no such device", "not found", "no camera", "no device"]
            .iter()
            .any(|k| lower.contains(k))
        {
            CameraError::DeviceNotFound(message)
        } else {
            CameraError::Hardware(message)
        }
    }
}

/// Trait for frame source implementations.
///
/// At most one stream is open at a time. `close` must be idempotent and a
/// failed `open` must leave the source fully closed.
pub trait FrameSource: Send {
    /// Lists available video input devices. Returns an empty list if the
    /// platform refuses enumeration.
    fn enumerate_devices(&mut self) -> Vec<CameraDevice>;

    /// Acquires a capture stream. Returns once the stream is producing
    /// frames.
    ///
    /// Capability hints from `config` are applied best-effort after the
    /// stream opens; their failure never fails the open.
    fn open(&mut self, config: &CaptureConfig) -> Result<CameraDevice, CameraError>;

    /// Returns true when a frame can be captured right now.
    fn has_enough_data(&self) -> bool;

    /// Captures a single frame at native resolution.
    fn capture_frame(&mut self) -> Result<Frame, CameraError>;

    /// Checks if a stream is currently open.
    fn is_open(&self) -> bool;

    /// Stops all tracks and releases the device.
    fn close(&mut self);
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn enumerate_devices(&mut self) -> Vec<CameraDevice> {
        (**self).enumerate_devices()
    }

    fn open(&mut self, config: &CaptureConfig) -> Result<CameraDevice, CameraError> {
        (**self).open(config)
    }

    fn has_enough_data(&self) -> bool {
        (**self).has_enough_data()
    }

    fn capture_frame(&mut self) -> Result<Frame, CameraError> {
        (**self).capture_frame()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Shared counters for observing a [`MockCamera`] from tests.
#[derive(Debug, Default)]
pub struct MockProbe {
    opens: AtomicUsize,
    closes: AtomicUsize,
    captures: AtomicUsize,
    track_stops: Mutex<Vec<usize>>,
}

impl MockProbe {
    /// Number of successful opens.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of close calls that released an open stream.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Number of frames captured.
    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    /// Stop count for every track ever created, in creation order.
    pub fn track_stops(&self) -> Vec<usize> {
        self.track_stops
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    fn new_track(&self) -> usize {
        let mut tracks = self.track_stops.lock().unwrap_or_else(|e| e.into_inner());
        tracks.push(0);
        tracks.len() - 1
    }

    fn stop_track(&self, track: usize) {
        let mut tracks = self.track_stops.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(count) = tracks.get_mut(track) {
            *count += 1;
        }
    }
}

/// Scripted camera for tests and demos.
///
/// Serves queued frames first, then synthetic noise frames that contain
/// no barcode.
#[derive(Debug)]
pub struct MockCamera {
    devices: Vec<CameraDevice>,
    script: VecDeque<Frame>,
    open_failure: Option<CameraError>,
    warmup: u32,
    warmup_polls: Cell<u32>,
    active: Option<CameraDevice>,
    capability_report: Option<CapabilityReport>,
    tracks: Vec<usize>,
    size: (u32, u32),
    sequence: u64,
    probe: Arc<MockProbe>,
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCamera {
    /// Mock camera with one back-facing device and synthetic frames.
    pub fn new() -> Self {
        Self {
            devices: vec![
                CameraDevice::new("mock-0", "Mock front camera"),
                CameraDevice::new("mock-1", "Mock back camera"),
            ],
            script: VecDeque::new(),
            open_failure: None,
            warmup: 0,
            warmup_polls: Cell::new(0),
            active: None,
            capability_report: None,
            tracks: Vec::new(),
            size: (64, 48),
            sequence: 0,
            probe: Arc::new(MockProbe::default()),
        }
    }

    /// Replaces the device list.
    pub fn with_devices(mut self, devices: Vec<CameraDevice>) -> Self {
        self.devices = devices;
        self
    }

    /// Queues frames to be served before synthetic ones.
    pub fn with_frames(mut self, frames: impl IntoIterator<Item = Frame>) -> Self {
        self.script.extend(frames);
        self
    }

    /// Makes the next `open` fail with `error`.
    pub fn fail_next_open(mut self, error: CameraError) -> Self {
        self.open_failure = Some(error);
        self
    }

    /// Reports "not enough data" for the first `polls` readiness checks
    /// after each open.
    pub fn with_warmup(mut self, polls: u32) -> Self {
        self.warmup = polls;
        self
    }

    /// Returns the capability report of the current stream.
    pub fn capability_report(&self) -> Option<&CapabilityReport> {
        self.capability_report.as_ref()
    }

    /// Returns the shared probe for lifecycle assertions.
    pub fn probe(&self) -> Arc<MockProbe> {
        Arc::clone(&self.probe)
    }

    fn synthetic_frame(&self) -> Vec<u8> {
        let (width, height) = self.size;
        let pixel_count = (width * height) as usize;
        // Deterministic pattern mixed with sequence; never decodes
        (0..pixel_count)
            .map(|i| ((i as u64 ^ self.sequence.wrapping_mul(31)) % 256) as u8)
            .collect()
    }
}

impl FrameSource for MockCamera {
    fn enumerate_devices(&mut self) -> Vec<CameraDevice> {
        self.devices.clone()
    }

    fn open(&mut self, config: &CaptureConfig) -> Result<CameraDevice, CameraError> {
        // Re-open always follows a completed close
        self.close();

        if let Some(error) = self.open_failure.take() {
            tracing::info!(error = %error, "MockCamera open failed (scripted)");
            return Err(error);
        }

        config
            .validate()
            .map_err(|e| CameraError::Hardware(e.to_string()))?;

        let device = select_device(&self.devices, config.device_id.as_deref(), config.facing)
            .cloned()
            .ok_or_else(|| {
                CameraError::DeviceNotFound(
                    config
                        .device_id
                        .clone()
                        .unwrap_or_else(|| "no video input devices".to_owned()),
                )
            })?;

        self.size = (config.width.min, config.height.min);
        self.sequence = 0;
        self.warmup_polls.set(self.warmup);
        self.tracks.push(self.probe.new_track());
        self.active = Some(device.clone());
        self.probe.opens.fetch_add(1, Ordering::SeqCst);

        let report = apply_mock_capabilities(&config.capabilities);
        report.log();
        self.capability_report = Some(report);

        tracing::info!(device = %device.id, label = %device.label, "MockCamera opened");
        Ok(device)
    }

    fn has_enough_data(&self) -> bool {
        if self.active.is_none() {
            return false;
        }
        let remaining = self.warmup_polls.get();
        if remaining > 0 {
            self.warmup_polls.set(remaining - 1);
            return false;
        }
        true
    }

    fn capture_frame(&mut self) -> Result<Frame, CameraError> {
        if self.active.is_none() {
            return Err(CameraError::NotOpen);
        }

        self.sequence += 1;
        self.probe.captures.fetch_add(1, Ordering::SeqCst);

        let frame = match self.script.pop_front() {
            Some(scripted) => Frame::new(
                scripted.pixels().to_vec(),
                scripted.width(),
                scripted.height(),
                self.sequence,
            ),
            None => Frame::new(self.synthetic_frame(), self.size.0, self.size.1, self.sequence),
        };
        Ok(frame)
    }

    fn is_open(&self) -> bool {
        self.active.is_some()
    }

    fn close(&mut self) {
        if self.active.take().is_none() {
            return;
        }
        self.capability_report = None;
        for track in self.tracks.drain(..) {
            self.probe.stop_track(track);
        }
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
        tracing::info!("MockCamera closed");
    }
}

/// The mock focuses but has no torch.
fn apply_mock_capabilities(hints: &CapabilityHints) -> CapabilityReport {
    let mut report = CapabilityReport::default();
    if hints.continuous_autofocus {
        report.record("continuous_autofocus", Ok(()));
    }
    if hints.focus_distance.is_some() {
        report.record("focus_distance", Ok(()));
    }
    if hints.torch {
        report.record("torch", Err(CapabilityError::Unsupported("torch")));
    }
    report
}
