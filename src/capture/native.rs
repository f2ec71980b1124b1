//! Native camera backend built on `nokhwa`.
//!
//! `nokhwa::Camera` is not `Send`, so the device lives on a dedicated
//! capture thread that keeps the most recent frame in a shared slot. The
//! slot plays the role of a live video surface: `has_enough_data` is true
//! once it holds a frame and `capture_frame` snapshots it.

use super::capability::{CapabilityError, CapabilityHints, CapabilityReport};
use super::device::{select_device, CameraDevice};
use super::{CameraError, CaptureConfig, Frame, FrameSource};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, ControlValueDescription, ControlValueSetter,
    FrameFormat, KnownCameraControl, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Formats tried in order during constraint negotiation.
const FRAME_FORMATS: [FrameFormat; 2] = [FrameFormat::MJPEG, FrameFormat::YUYV];

type LatestFrame = Arc<Mutex<Option<Frame>>>;

/// Camera backed by the platform's native capture API.
#[derive(Default)]
pub struct NativeCamera {
    stream: Option<CaptureWorker>,
    sequence: u64,
}

struct CaptureWorker {
    device: CameraDevice,
    latest: LatestFrame,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureWorker {
    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!(device = %self.device.id, "Capture thread panicked");
            }
        }
    }
}

impl NativeCamera {
    /// Creates a closed camera; nothing is opened until `open`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSource for NativeCamera {
    fn enumerate_devices(&mut self) -> Vec<CameraDevice> {
        match nokhwa::query(ApiBackend::Auto) {
            Ok(infos) => infos
                .iter()
                .map(|info| CameraDevice::new(info.index().to_string(), info.human_name()))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Camera enumeration failed");
                Vec::new()
            }
        }
    }

    fn open(&mut self, config: &CaptureConfig) -> Result<CameraDevice, CameraError> {
        self.close();

        config
            .validate()
            .map_err(|e| CameraError::Hardware(e.to_string()))?;

        let devices = self.enumerate_devices();
        let device = select_device(&devices, config.device_id.as_deref(), config.facing)
            .cloned()
            .ok_or_else(|| {
                CameraError::DeviceNotFound(
                    config
                        .device_id
                        .clone()
                        .unwrap_or_else(|| "no video input devices".to_owned()),
                )
            })?;

        let latest: LatestFrame = Arc::new(Mutex::new(None));
        let stop = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let handle = {
            let index = camera_index(&device.id);
            let config = config.clone();
            let latest = Arc::clone(&latest);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("camera-capture".into())
                .spawn(move || capture_loop(index, config, latest, stop, ready_tx))
                .map_err(|e| CameraError::Hardware(e.to_string()))?
        };

        let mut worker = CaptureWorker {
            device: device.clone(),
            latest,
            stop,
            handle: Some(handle),
        };

        let ready = ready_rx
            .recv()
            .unwrap_or_else(|_| Err(CameraError::Hardware("capture thread exited".into())));

        match ready {
            Ok(report) => {
                report.log();
                tracing::info!(device = %device.id, label = %device.label, "Camera opened");
                self.sequence = 0;
                self.stream = Some(worker);
                Ok(device)
            }
            Err(e) => {
                worker.shutdown();
                tracing::info!(device = %device.id, error = %e, "Camera open failed");
                Err(e)
            }
        }
    }

    fn has_enough_data(&self) -> bool {
        self.stream
            .as_ref()
            .map(|s| s.latest.lock().map(|f| f.is_some()).unwrap_or(false))
            .unwrap_or(false)
    }

    fn capture_frame(&mut self) -> Result<Frame, CameraError> {
        let stream = self.stream.as_ref().ok_or(CameraError::NotOpen)?;
        let snapshot = stream
            .latest
            .lock()
            .map_err(|_| CameraError::CaptureFailed("frame slot poisoned".into()))?
            .clone()
            .ok_or_else(|| CameraError::CaptureFailed("no frame available yet".into()))?;

        self.sequence += 1;
        Ok(Frame::new(
            snapshot.pixels().to_vec(),
            snapshot.width(),
            snapshot.height(),
            self.sequence,
        ))
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown();
            tracing::info!(device = %stream.device.id, "Camera closed");
        }
    }
}

impl Drop for NativeCamera {
    fn drop(&mut self) {
        self.close();
    }
}

fn camera_index(id: &str) -> CameraIndex {
    id.parse::<u32>()
        .map(CameraIndex::Index)
        .unwrap_or_else(|_| CameraIndex::String(id.to_owned()))
}

fn backend_error(e: nokhwa::NokhwaError) -> CameraError {
    CameraError::from_backend_message(e.to_string())
}

/// Runs on the capture thread: opens the device, reports readiness, then
/// keeps the shared slot filled until asked to stop.
fn capture_loop(
    index: CameraIndex,
    config: CaptureConfig,
    latest: LatestFrame,
    stop: Arc<AtomicBool>,
    ready_tx: mpsc::SyncSender<Result<CapabilityReport, CameraError>>,
) {
    let mut camera = match open_stream(index, &config) {
        Ok(camera) => camera,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    let report = apply_capabilities(&mut camera, &config.capabilities);

    // Do not report ready until the stream delivers a decodable frame
    let first = (0..config.warmup_frames.max(1)).find_map(|_| match grab(&mut camera) {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::trace!(error = %e, "Warm-up frame unavailable");
            None
        }
    });
    let Some(first) = first else {
        let _ = camera.stop_stream();
        let _ = ready_tx.send(Err(CameraError::Hardware(
            "stream produced no frames during warm-up".into(),
        )));
        return;
    };
    store(&latest, first);

    if ready_tx.send(Ok(report)).is_err() {
        let _ = camera.stop_stream();
        return;
    }

    while !stop.load(Ordering::SeqCst) {
        match grab(&mut camera) {
            Ok(frame) => store(&latest, frame),
            Err(e) => {
                tracing::warn!(error = %e, "Frame capture error");
                thread::sleep(Duration::from_millis(10));
            }
        }
    }

    if let Err(e) = camera.stop_stream() {
        tracing::warn!(error = %e, "Failed to stop camera stream");
    }
}

fn store(latest: &LatestFrame, frame: Frame) {
    if let Ok(mut slot) = latest.lock() {
        *slot = Some(frame);
    }
}

fn grab(camera: &mut Camera) -> Result<Frame, CameraError> {
    let buffer = camera
        .frame()
        .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
    let image = buffer
        .decode_image::<RgbFormat>()
        .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
    let (width, height) = (image.width(), image.height());
    Ok(Frame::from_rgb(image.as_raw(), width, height, 0))
}

/// Negotiates a format within the configured ranges and starts streaming.
fn open_stream(index: CameraIndex, config: &CaptureConfig) -> Result<Camera, CameraError> {
    let mut last_error = CameraError::Hardware("no frame format negotiated".into());

    for frame_format in FRAME_FORMATS {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(config.width.ideal, config.height.ideal),
                frame_format,
                config.ideal_fps,
            ),
        ));

        let mut camera = match Camera::new(index.clone(), requested) {
            Ok(camera) => camera,
            Err(e) => {
                last_error = backend_error(e);
                // Permission and missing-device failures will not improve
                // with another pixel format.
                if !matches!(last_error, CameraError::Hardware(_)) {
                    return Err(last_error);
                }
                tracing::debug!(format = ?frame_format, error = %last_error, "Format rejected");
                continue;
            }
        };

        let negotiated = camera.camera_format();
        if !config.width.contains(negotiated.width())
            || !config.height.contains(negotiated.height())
            || negotiated.frame_rate() < config.min_fps
        {
            last_error = CameraError::Hardware(format!(
                "negotiated {}x{}@{} outside requested range",
                negotiated.width(),
                negotiated.height(),
                negotiated.frame_rate()
            ));
            tracing::debug!(format = ?frame_format, error = %last_error, "Format rejected");
            continue;
        }

        camera.open_stream().map_err(backend_error)?;
        tracing::info!(
            width = negotiated.width(),
            height = negotiated.height(),
            fps = negotiated.frame_rate(),
            "Camera stream negotiated"
        );
        return Ok(camera);
    }

    Err(last_error)
}

fn apply_capabilities(camera: &mut Camera, hints: &CapabilityHints) -> CapabilityReport {
    let mut report = CapabilityReport::default();
    if hints.continuous_autofocus {
        // nokhwa exposes focus only as a manual value
        report.record(
            "continuous_autofocus",
            Err(CapabilityError::Unsupported("continuous autofocus")),
        );
    }
    if let Some(fraction) = hints.focus_distance {
        report.record("focus_distance", apply_focus(camera, fraction));
    }
    if hints.torch {
        report.record("torch", Err(CapabilityError::Unsupported("torch")));
    }
    report
}

fn apply_focus(camera: &mut Camera, fraction: f32) -> Result<(), CapabilityError> {
    let control = camera
        .camera_control(KnownCameraControl::Focus)
        .map_err(|_| CapabilityError::Unsupported("focus distance"))?;

    let (min, max) = match control.description() {
        ControlValueDescription::IntegerRange { min, max, .. } => (*min, *max),
        _ => return Err(CapabilityError::Unsupported("focus distance")),
    };

    let target = min + ((max - min) as f64 * f64::from(fraction)).round() as i64;
    camera
        .set_camera_control(KnownCameraControl::Focus, ControlValueSetter::Integer(target))
        .map_err(|e| CapabilityError::Rejected {
            capability: "focus distance",
            reason: e.to_string(),
        })
}
