//! Detections delivered to the consumer.

use crate::decode::{ScanResult, Symbology};
use crate::preprocess::CandidateKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated scan, handed to the detection callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Symbol payload.
    pub text: String,
    /// Symbology, when the decoder reported one.
    pub format: Option<Symbology>,
    /// Candidate that produced the decode.
    pub candidate: Option<CandidateKind>,
    /// Sequence number of the source frame.
    pub frame_sequence: u64,
    /// Wall-clock time of acceptance.
    pub detected_at: DateTime<Utc>,
}

impl Detection {
    pub(crate) fn new(result: ScanResult, frame_sequence: u64) -> Self {
        Self {
            candidate: result.context.candidate,
            text: result.text,
            format: result.format,
            frame_sequence,
            detected_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for Detection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.format {
            Some(format) => write!(f, "{} ({})", self.text, format.as_str()),
            None => f.write_str(&self.text),
        }
    }
}
