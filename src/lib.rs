//! Live Barcode Scanning Library
//!
//! Camera-driven barcode recognition for point-of-sale clients. Frames are
//! pulled from a capture device on a fixed period, turned into decode
//! candidates, decoded with a multi-format reader and validated before
//! de-duplicated detections reach the consumer.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! capture → preprocess → decode → validate → consumer
//!     ↑                                  │
//!     └────────── scan (tick loop) ──────┘
//! ```
//!
//! # Design Principles
//!
//! - **No globals**: each [`ScanController`] owns its source, engine and session
//! - **Misses are normal**: no symbol in a frame is `None`, not an error
//! - **Deterministic release**: `stop()` closes the camera synchronously
//! - **Fail quietly per tick**: only stream acquisition errors reach the caller
//!
//! # Example
//!
//! ```no_run
//! use barcode_scan::{
//!     capture::MockCamera,
//!     decode::DecodeConfig,
//!     scan::{ScanController, ScanOptions},
//! };
//!
//! let controller = ScanController::rxing(
//!     MockCamera::new(),
//!     DecodeConfig::default(),
//!     ScanOptions::default(),
//! );
//!
//! controller
//!     .start(None, |detection| println!("scanned {}", detection.text))
//!     .unwrap();
//!
//! std::thread::sleep(std::time::Duration::from_secs(1));
//! controller.stop();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod decode;
pub mod metrics;
pub mod preprocess;
pub mod scan;
pub mod validate;

// Re-export commonly used types at crate root
pub use capture::{CameraDevice, CameraError, CaptureConfig, FileConfig, Frame, FrameSource, MockCamera};
pub use decode::{DecodeConfig, Decoder, RxingDecoder, ScanResult, Symbology};
pub use preprocess::{PreprocessConfig, Preprocessor};
pub use scan::{Detection, ScanController, ScanOptions, ScanState, Schedule, TickOutcome};
pub use validate::{validate_ean13, Rejection, ResultValidator};

#[cfg(feature = "camera")]
pub use capture::NativeCamera;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
