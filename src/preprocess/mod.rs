//! Frame preprocessing for barcode decoding.
//!
//! Turns one captured frame into an ordered set of decode candidates: the
//! raw frame, a contrast-enhanced binary frame and a centre strip. Every
//! transform is pure and allocates its output; frames are never mutated.

mod candidate;
mod enhance;
mod strip;

pub use candidate::{CandidateKind, Candidates, DecodeCandidate};
pub use enhance::enhance;
pub use strip::center_strip;

use crate::capture::{ConfigError, Frame};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Preprocessing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Luminance multiplier applied before thresholding.
    pub contrast: f32,
    /// Binary cutoff on the boosted luminance (0-255).
    pub threshold: u8,
    /// Centre strip height as a fraction of frame height.
    pub strip_height_fraction: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            contrast: 1.5,
            threshold: 120,
            strip_height_fraction: 0.2,
        }
    }
}

impl PreprocessConfig {
    /// Checks contrast is positive and the strip fraction lies in (0, 1].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.contrast.is_finite() && self.contrast > 0.0) {
            return Err(ConfigError::InvalidPreprocess(format!(
                "contrast must be positive, got {}",
                self.contrast
            )));
        }
        if !(self.strip_height_fraction > 0.0 && self.strip_height_fraction <= 1.0) {
            return Err(ConfigError::InvalidPreprocess(format!(
                "strip height fraction must be in (0, 1], got {}",
                self.strip_height_fraction
            )));
        }
        Ok(())
    }
}

/// Derives decode candidates from frames.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    /// Creates a preprocessor with `config`.
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Contrast-enhanced binary copy of `frame`.
    pub fn enhance(&self, frame: &Frame) -> Frame {
        enhance(frame, self.config.contrast, self.config.threshold)
    }

    /// Centre strip of `frame` at the configured height fraction.
    pub fn center_strip(&self, frame: &Frame) -> Frame {
        center_strip(frame, self.config.strip_height_fraction)
    }

    /// Iterates candidates for `frame` in decode priority order.
    pub fn candidates<'a>(&'a self, frame: &'a Frame) -> Candidates<'a> {
        Candidates::new(self, frame)
    }

    /// Builds one candidate of the given kind.
    pub fn derive<'a>(&self, frame: &'a Frame, kind: CandidateKind) -> DecodeCandidate<'a> {
        let raster = match kind {
            CandidateKind::Raw => Cow::Borrowed(frame),
            CandidateKind::Enhanced => Cow::Owned(self.enhance(frame)),
            CandidateKind::CenterStrip => Cow::Owned(self.center_strip(frame)),
        };
        DecodeCandidate::new(kind, raster)
    }
}
