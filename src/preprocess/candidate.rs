//! Decode candidates derived from a single frame.

use super::Preprocessor;
use crate::capture::Frame;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// How a candidate raster was derived from its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    /// The captured frame as-is.
    Raw,
    /// Contrast-boosted binary version of the frame.
    Enhanced,
    /// Horizontal band through the vertical centre.
    CenterStrip,
}

impl CandidateKind {
    /// Decode priority: cheapest and most common case first.
    pub const ORDER: [CandidateKind; 3] = [
        CandidateKind::Raw,
        CandidateKind::Enhanced,
        CandidateKind::CenterStrip,
    ];

    /// Stable name used in logs and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateKind::Raw => "raw",
            CandidateKind::Enhanced => "enhanced",
            CandidateKind::CenterStrip => "center_strip",
        }
    }
}

impl std::fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raster submitted to the decode engine.
#[derive(Debug, Clone)]
pub struct DecodeCandidate<'a> {
    /// How the raster was derived.
    pub kind: CandidateKind,
    /// Pixels to decode; borrowed for the raw frame.
    pub raster: Cow<'a, Frame>,
}

impl<'a> DecodeCandidate<'a> {
    /// Wraps a raster as a candidate of `kind`.
    pub fn new(kind: CandidateKind, raster: Cow<'a, Frame>) -> Self {
        Self { kind, raster }
    }

    /// Sequence number of the frame this candidate came from.
    pub fn sequence(&self) -> u64 {
        self.raster.sequence()
    }
}

/// Lazily derives candidates in [`CandidateKind::ORDER`].
///
/// Derived rasters are only computed when the previous candidate failed,
/// so a hit on the raw frame costs no preprocessing.
pub struct Candidates<'a> {
    preprocessor: &'a Preprocessor,
    frame: &'a Frame,
    next: usize,
}

impl<'a> Candidates<'a> {
    pub(super) fn new(preprocessor: &'a Preprocessor, frame: &'a Frame) -> Self {
        Self {
            preprocessor,
            frame,
            next: 0,
        }
    }
}

impl<'a> Iterator for Candidates<'a> {
    type Item = DecodeCandidate<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = *CandidateKind::ORDER.get(self.next)?;
        self.next += 1;
        Some(self.preprocessor.derive(self.frame, kind))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = CandidateKind::ORDER.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Candidates<'_> {}
