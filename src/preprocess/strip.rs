//! Centre strip extraction.
//!
//! Barcodes are usually held horizontally across the middle of the view,
//! so a thin band through the vertical centre holds the whole symbol while
//! skipping most of the background.

use crate::capture::Frame;

/// Returns the full-width horizontal band of height
/// `round(height_fraction * frame.height)` centred vertically.
///
/// The band is clamped to at least one row and at most the full frame.
pub fn center_strip(frame: &Frame, height_fraction: f32) -> Frame {
    let height = frame.height();
    let band = ((height as f32 * height_fraction).round() as u32)
        .clamp(1, height.max(1))
        .min(height);
    let top = (height - band) / 2;

    let width = frame.width() as usize;
    let start = top as usize * width;
    let end = start + band as usize * width;
    let pixels = frame
        .pixels()
        .get(start..end)
        .map(<[u8]>::to_vec)
        .unwrap_or_default();

    frame.derive(pixels, frame.width(), band)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_frame(height: u32) -> Frame {
        // Each row filled with its own index
        let pixels = (0..height).flat_map(|y| [y as u8; 4]).collect();
        Frame::new(pixels, 4, height, 1)
    }

    #[test]
    fn test_strip_is_centred() {
        let frame = rows_frame(10);
        let strip = center_strip(&frame, 0.2);

        assert_eq!(strip.width(), 4);
        assert_eq!(strip.height(), 2);
        assert_eq!(strip.row(0), &[4; 4]);
        assert_eq!(strip.row(1), &[5; 4]);
        assert!(strip.is_valid());
    }

    #[test]
    fn test_strip_of_real_resolution() {
        let frame = Frame::new(vec![0; 1280 * 720], 1280, 720, 1);
        let strip = center_strip(&frame, 0.2);

        assert_eq!(strip.height(), 144);
        assert!(strip.is_valid());
    }

    #[test]
    fn test_tiny_frame_keeps_one_row() {
        let frame = rows_frame(3);
        let strip = center_strip(&frame, 0.01);

        assert_eq!(strip.height(), 1);
        assert_eq!(strip.row(0), &[1; 4]);
    }

    #[test]
    fn test_fraction_above_one_is_whole_frame() {
        let frame = rows_frame(5);
        let strip = center_strip(&frame, 2.0);
        assert_eq!(strip.pixels(), frame.pixels());
    }
}
