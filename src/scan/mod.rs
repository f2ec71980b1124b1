//! Scan loop: periodic capture, decode and delivery.
//!
//! A [`ScanController`] ties one [`FrameSource`](crate::capture::FrameSource)
//! to one [`Decoder`](crate::decode::Decoder). While running it ticks on a
//! fixed period; each tick pulls one frame, tries the decode candidates in
//! order and hands validated, de-duplicated detections to the registered
//! callback.
//!
//! ```text
//! Idle ──start──▶ Starting ──open ok──▶ Running
//!  ▲                 │                     │
//!  └──── open err ───┘◀────── stop ────────┘
//! ```

mod controller;
mod detection;
mod session;
mod stats;
mod ticker;

pub use controller::{DetectCallback, ScanController, ScanOptions, Schedule, TickOutcome};
pub use detection::Detection;
pub use session::{ScanSession, ScanState};
pub use stats::{ScanStats, StatsSnapshot};
pub use ticker::Ticker;
