//! Diagnostic camera image entity.
//!
//! Unlike profiles, images are not assembled fragment by fragment: the
//! transport layer hands over one fully decoded image record and this type
//! only validates and stores it.

use std::collections::BTreeMap;

use crate::error::{ScanError, ScanResult};

use super::profile::Encoder;

/// Native sensor width in pixels.
pub const IMAGE_WIDTH: u32 = 1456;
/// Native sensor height in pixels.
pub const IMAGE_HEIGHT: u32 = 1088;

/// One diagnostic camera frame plus capture metadata.
///
/// Pixel data is stored row-major, one byte per pixel.
#[derive(Debug, Clone)]
pub struct CameraImage {
    /// Identifier of the scan head that produced this image.
    pub scan_head_id: u32,
    /// Camera id.
    pub camera: u32,
    /// Laser id (the laser that was on during capture, if any).
    pub laser: u32,
    /// Capture timestamp in nanoseconds.
    pub timestamp_ns: u64,
    /// Encoder counts latched at capture time.
    pub encoder_values: BTreeMap<Encoder, i64>,
    /// Laser-on time in microseconds.
    pub laser_on_time_us: u32,
    /// Camera exposure in microseconds.
    pub exposure_us: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,

    pixels: Vec<u8>,
}

impl CameraImage {
    /// Build an image from a decoded record, validating that the pixel
    /// buffer matches the stated dimensions.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scan_head_id: u32,
        camera: u32,
        laser: u32,
        timestamp_ns: u64,
        encoder_values: BTreeMap<Encoder, i64>,
        laser_on_time_us: u32,
        exposure_us: u32,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> ScanResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(ScanError::Format(format!(
                "pixel buffer size mismatch: expected {expected} bytes for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            scan_head_id,
            camera,
            laser,
            timestamp_ns,
            encoder_values,
            laser_on_time_us,
            exposure_us,
            width,
            height,
            pixels,
        })
    }

    /// Raw pixel buffer, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel value at (x, y), or `None` outside the image.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_image() -> CameraImage {
        CameraImage::new(
            3,
            0,
            1,
            55,
            BTreeMap::new(),
            20,
            500,
            4,
            2,
            vec![0, 1, 2, 3, 10, 11, 12, 13],
        )
        .unwrap()
    }

    #[test]
    fn pixel_lookup_is_row_major() {
        let image = small_image();
        assert_eq!(image.get(0, 0), Some(0));
        assert_eq!(image.get(3, 0), Some(3));
        assert_eq!(image.get(0, 1), Some(10));
        assert_eq!(image.get(3, 1), Some(13));
    }

    #[test]
    fn out_of_bounds_lookup_is_none() {
        let image = small_image();
        assert_eq!(image.get(4, 0), None);
        assert_eq!(image.get(0, 2), None);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let result = CameraImage::new(
            3,
            0,
            1,
            55,
            BTreeMap::new(),
            20,
            500,
            4,
            2,
            vec![0; 7],
        );
        assert!(matches!(result, Err(ScanError::Format(_))));
    }
}
