//! Camera input and frame handling.
//!
//! This module owns the capture device: enumeration, stream acquisition
//! with constraint negotiation, best-effort capability tuning, readiness
//! and frame snapshots. Everything downstream works on [`Frame`]s.

mod camera;
mod capability;
mod config;
mod device;
mod frame;
#[cfg(feature = "camera")]
mod native;

pub use camera::{CameraError, FrameSource, MockCamera, MockProbe};
pub use capability::{CapabilityError, CapabilityHints, CapabilityReport};
pub use config::{CaptureConfig, ConfigError, DimensionRange, FileConfig, OutputConfig, ScanConfig};
pub use device::{CameraDevice, FacingHint};
pub use frame::Frame;
#[cfg(feature = "camera")]
pub use native::NativeCamera;
