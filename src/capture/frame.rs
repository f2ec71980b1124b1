//! Frame type representing a captured luminance raster with metadata.

use std::time::Instant;

/// A single captured frame from the camera.
///
/// Pixels are 8-bit luminance, one byte per pixel, row-major. A frame is
/// produced fresh by every scan tick and dropped when the tick ends.
#[derive(Clone)]
pub struct Frame {
    /// Luminance pixel data.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Capture timestamp.
    timestamp: Instant,
    /// Monotonic sequence number.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame from luminance pixels.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Creates a frame from packed RGB8 pixels, converting to luminance.
    ///
    /// Uses Rec.601 weights (0.299, 0.587, 0.114) in fixed point.
    pub fn from_rgb(rgb: &[u8], width: u32, height: u32, sequence: u64) -> Self {
        let pixels = rgb
            .chunks_exact(3)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect();
        Self::new(pixels, width, height, sequence)
    }

    /// Derives a new raster sharing this frame's timestamp and sequence.
    pub(crate) fn derive(&self, pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
            timestamp: self.timestamp,
            sequence: self.sequence,
        }
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns row `y` of the raster.
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of bounds or the buffer is short.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let width = self.width as usize;
        let start = y as usize * width;
        &self.pixels[start..start + width]
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixel_count() > 0 && self.pixels.len() == self.pixel_count()
    }
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let pixels = vec![0u8; 640 * 480];
        let frame = Frame::new(pixels, 640, 480, 1);

        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert_eq!(frame.sequence(), 1);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_frame_invalid_size() {
        let pixels = vec![0u8; 100]; // Wrong size
        let frame = Frame::new(pixels, 640, 480, 1);

        assert!(!frame.is_valid());
    }

    #[test]
    fn test_row_access() {
        let frame = Frame::new(vec![1, 1, 1, 2, 2, 2], 3, 2, 1);

        assert_eq!(frame.row(0), &[1, 1, 1]);
        assert_eq!(frame.row(1), &[2, 2, 2]);
    }

    #[test]
    fn test_rgb_conversion() {
        // white, black, pure red
        let rgb = [255, 255, 255, 0, 0, 0, 255, 0, 0];
        let frame = Frame::from_rgb(&rgb, 3, 1, 7);

        assert_eq!(frame.pixels(), &[255, 0, 76]);
        assert_eq!(frame.sequence(), 7);
        assert!(frame.is_valid());
    }
}
