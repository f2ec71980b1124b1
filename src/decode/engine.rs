//! Multi-format decoding with binarization fallback.

use super::{Binarization, DecodeConfig, DecodeContext, Decoder, ScanResult, Symbology};
use crate::preprocess::DecodeCandidate;
use rxing::common::{GlobalHistogramBinarizer, HybridBinarizer};
use rxing::{
    Binarizer, BinaryBitmap, DecodeHints, Exceptions, Luma8LuminanceSource, MultiFormatReader,
    RXingResult, Reader,
};
use std::panic::{self, AssertUnwindSafe};

/// Decoder backed by the `rxing` multi-format reader.
///
/// Tries the hybrid (locally adaptive) binarizer first, which copes with
/// uneven lighting, then retries once with the global-histogram binarizer
/// that does better on evenly lit scenes. A miss is `None`; decode errors
/// other than "not found" are logged and also reported as a miss, and so
/// is a panic inside the reader on a degenerate raster.
///
/// Hints are fixed at construction. The reader itself is per decode so no
/// state leaks from one frame into the next.
pub struct RxingDecoder {
    config: DecodeConfig,
    hints: DecodeHints,
}

impl RxingDecoder {
    /// Builds the engine and its reader hints from `config`.
    pub fn new(config: &DecodeConfig) -> Self {
        tracing::debug!(formats = ?config.formats, "Decode engine constructed");
        Self {
            config: config.clone(),
            hints: config.hints(),
        }
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    fn attempt<B, F>(
        reader: &mut MultiFormatReader,
        hints: &DecodeHints,
        bitmap: F,
        binarization: Binarization,
        sequence: u64,
    ) -> Option<RXingResult>
    where
        B: Binarizer,
        F: FnOnce() -> BinaryBitmap<B>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            reader.decode_with_hints(&mut bitmap(), hints)
        }));
        match outcome {
            Ok(Ok(result)) => Some(result),
            Ok(Err(Exceptions::NotFoundException(_))) => None,
            Ok(Err(e)) => {
                tracing::debug!(
                    sequence,
                    binarization = binarization.as_str(),
                    error = %e,
                    "Decode error treated as miss"
                );
                None
            }
            Err(_) => {
                tracing::debug!(
                    sequence,
                    binarization = binarization.as_str(),
                    "Reader panicked; treated as miss"
                );
                None
            }
        }
    }
}

impl Default for RxingDecoder {
    fn default() -> Self {
        Self::new(&DecodeConfig::default())
    }
}

impl Decoder for RxingDecoder {
    fn decode(&mut self, candidate: &DecodeCandidate<'_>) -> Option<ScanResult> {
        let raster = &candidate.raster;
        if !raster.is_valid() {
            return None;
        }
        let sequence = raster.sequence();
        let luminance =
            || Luma8LuminanceSource::new(raster.pixels().to_vec(), raster.width(), raster.height());

        let hints = &self.hints;
        let mut reader = MultiFormatReader::default();

        let hybrid = || BinaryBitmap::new(HybridBinarizer::new(luminance()));
        let first = Self::attempt(&mut reader, hints, hybrid, Binarization::Hybrid, sequence);
        let (result, binarization) = match first {
            Some(result) => (result, Binarization::Hybrid),
            None if self.config.global_histogram_fallback => {
                let global = || BinaryBitmap::new(GlobalHistogramBinarizer::new(luminance()));
                let result = Self::attempt(
                    &mut reader,
                    hints,
                    global,
                    Binarization::GlobalHistogram,
                    sequence,
                )?;
                (result, Binarization::GlobalHistogram)
            }
            None => return None,
        };

        Some(ScanResult {
            text: result.getText().to_owned(),
            format: Symbology::from_barcode_format(result.getBarcodeFormat()),
            context: DecodeContext {
                candidate: Some(candidate.kind),
                binarization: Some(binarization),
            },
        })
    }
}
