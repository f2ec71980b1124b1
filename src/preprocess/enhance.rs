//! Contrast boost and binary threshold.

use crate::capture::Frame;

/// Binarizes a frame: each luminance value is scaled by `contrast` and
/// mapped to pure white if the result exceeds `threshold`, else black.
///
/// Returns a new frame of identical dimensions; the input is untouched.
pub fn enhance(frame: &Frame, contrast: f32, threshold: u8) -> Frame {
    let lut = threshold_table(contrast, threshold);
    let pixels = frame.pixels().iter().map(|&p| lut[p as usize]).collect();
    frame.derive(pixels, frame.width(), frame.height())
}

/// Precomputes the output for every input level.
fn threshold_table(contrast: f32, threshold: u8) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (level, out) in lut.iter_mut().enumerate() {
        let boosted = level as f32 * contrast;
        *out = if boosted > f32::from(threshold) { 255 } else { 0 };
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_with_default_contrast() {
        // 80 * 1.5 = 120 (not above cutoff), 81 * 1.5 = 121.5
        let frame = Frame::new(vec![0, 79, 80, 81, 200, 255], 6, 1, 3);
        let out = enhance(&frame, 1.5, 120);

        assert_eq!(out.pixels(), &[0, 0, 0, 255, 255, 255]);
        assert_eq!(out.sequence(), 3);
    }

    #[test]
    fn test_output_is_binary_and_same_size() {
        let frame = Frame::new((0..=255).collect(), 16, 16, 1);
        let out = enhance(&frame, 1.5, 120);

        assert_eq!(out.width(), 16);
        assert_eq!(out.height(), 16);
        assert!(out.pixels().iter().all(|&p| p == 0 || p == 255));
    }

    #[test]
    fn test_input_not_mutated() {
        let frame = Frame::new(vec![100; 4], 2, 2, 1);
        let _ = enhance(&frame, 1.5, 120);
        assert_eq!(frame.pixels(), &[100; 4]);
    }
}
