//! Barcode decode engine.
//!
//! A [`Decoder`] looks for one symbol in one [`DecodeCandidate`]. Not
//! finding a symbol is the normal outcome of almost every frame, so it is
//! modelled as `None` rather than an error.

mod config;
mod engine;
mod symbology;

pub use config::DecodeConfig;
pub use engine::RxingDecoder;
pub use symbology::Symbology;

use crate::preprocess::{CandidateKind, DecodeCandidate};
use serde::{Deserialize, Serialize};

/// Binarization strategy that produced a decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binarization {
    /// Locally adaptive thresholding.
    Hybrid,
    /// Single global threshold from the luminance histogram.
    GlobalHistogram,
}

impl Binarization {
    /// Stable name used in logs and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Binarization::Hybrid => "hybrid",
            Binarization::GlobalHistogram => "global_histogram",
        }
    }
}

/// Opaque metadata about how a result was decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeContext {
    /// Candidate that produced the result.
    pub candidate: Option<CandidateKind>,
    /// Binarizer that found the symbol.
    pub binarization: Option<Binarization>,
}

/// A decoded symbol, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Symbol payload.
    pub text: String,
    /// Symbology, when the decoder reports one.
    pub format: Option<Symbology>,
    /// Decode metadata, carried through untouched.
    pub context: DecodeContext,
}

impl ScanResult {
    /// Result with empty decode metadata.
    pub fn new(text: impl Into<String>, format: Option<Symbology>) -> Self {
        Self {
            text: text.into(),
            format,
            context: DecodeContext::default(),
        }
    }
}

/// Trait for decode engines.
pub trait Decoder: Send {
    /// Attempts to decode a symbol from `candidate`. Never fails hard.
    fn decode(&mut self, candidate: &DecodeCandidate<'_>) -> Option<ScanResult>;
}

impl<T: Decoder + ?Sized> Decoder for Box<T> {
    fn decode(&mut self, candidate: &DecodeCandidate<'_>) -> Option<ScanResult> {
        (**self).decode(candidate)
    }
}

/// Tries `candidates` in order and returns the first decode.
///
/// Candidates after the first hit are never derived.
pub fn decode_first<'a, D, I>(decoder: &mut D, candidates: I) -> Option<ScanResult>
where
    D: Decoder + ?Sized,
    I: IntoIterator<Item = DecodeCandidate<'a>>,
{
    candidates.into_iter().find_map(|candidate| match decoder.decode(&candidate) {
        Some(mut result) => {
            result.context.candidate.get_or_insert(candidate.kind);
            Some(result)
        }
        None => {
            tracing::trace!(
                sequence = candidate.sequence(),
                candidate = candidate.kind.as_str(),
                "No symbol in candidate"
            );
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Frame;
    use crate::preprocess::Preprocessor;

    /// Records attempts and succeeds only on one candidate kind.
    struct OnlyOn {
        kind: CandidateKind,
        attempts: Vec<CandidateKind>,
    }

    impl Decoder for OnlyOn {
        fn decode(&mut self, candidate: &DecodeCandidate<'_>) -> Option<ScanResult> {
            self.attempts.push(candidate.kind);
            (candidate.kind == self.kind)
                .then(|| ScanResult::new("4006381333931", Some(Symbology::Ean13)))
        }
    }

    #[test]
    fn test_stops_at_first_success() {
        let preprocessor = Preprocessor::default();
        let frame = Frame::new(vec![0; 100], 10, 10, 1);
        let mut decoder = OnlyOn {
            kind: CandidateKind::Enhanced,
            attempts: Vec::new(),
        };

        let result = decode_first(&mut decoder, preprocessor.candidates(&frame)).unwrap();

        assert_eq!(result.text, "4006381333931");
        assert_eq!(result.context.candidate, Some(CandidateKind::Enhanced));
        assert_eq!(
            decoder.attempts,
            vec![CandidateKind::Raw, CandidateKind::Enhanced]
        );
    }

    #[test]
    fn test_strip_reached_after_two_misses() {
        let preprocessor = Preprocessor::default();
        let frame = Frame::new(vec![0; 100], 10, 10, 1);
        let mut decoder = OnlyOn {
            kind: CandidateKind::CenterStrip,
            attempts: Vec::new(),
        };

        assert!(decode_first(&mut decoder, preprocessor.candidates(&frame)).is_some());
        assert_eq!(decoder.attempts.len(), 3);
    }
}
