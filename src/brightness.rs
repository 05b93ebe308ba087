//! Per-column brightness calibration.
//!
//! Sensor columns do not respond uniformly; the head calibration supplies a
//! per-column scale factor plus a global offset that flatten the response.
//! Elements are validated individually: one bad factor is rejected without
//! touching the rest of the table.

use crate::data::{INVALID_BRIGHTNESS, MAX_PROFILE_COLUMNS};
use crate::error::{ScanError, ScanResult};

/// Upper bound of the corrected brightness range.
const BRIGHTNESS_MAX: i32 = 1023;

/// Per-column brightness correction table for one camera.
#[derive(Debug, Clone)]
pub struct BrightnessCorrection {
    offset: i32,
    scale_factors: Vec<f64>,
}

impl Default for BrightnessCorrection {
    fn default() -> Self {
        Self::new()
    }
}

impl BrightnessCorrection {
    /// Identity correction: zero offset, unit scale everywhere.
    #[must_use]
    pub fn new() -> Self {
        Self {
            offset: 0,
            scale_factors: vec![1.0; MAX_PROFILE_COLUMNS],
        }
    }

    /// Global brightness offset.
    #[must_use]
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Set the global brightness offset.
    pub fn set_offset(&mut self, offset: i32) {
        self.offset = offset;
    }

    /// Scale factor for one column.
    pub fn scale_factor(&self, column: usize) -> ScanResult<f64> {
        self.scale_factors
            .get(column)
            .copied()
            .ok_or(ScanError::InvalidColumn { column })
    }

    /// Set the scale factor for one column.
    ///
    /// A factor that is NaN, infinite, or not strictly positive is rejected;
    /// the rest of the table is unaffected.
    pub fn set_scale_factor(&mut self, column: usize, value: f64) -> ScanResult<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ScanError::InvalidScaleFactor { column, value });
        }
        let slot = self
            .scale_factors
            .get_mut(column)
            .ok_or(ScanError::InvalidColumn { column })?;
        *slot = value;
        Ok(())
    }

    /// Apply the correction for one column, saturating into the sensor's
    /// brightness range. The invalid sentinel passes through unchanged.
    #[must_use]
    pub fn apply(&self, brightness: i32, column: usize) -> i32 {
        if brightness == INVALID_BRIGHTNESS {
            return brightness;
        }
        let scale = self
            .scale_factors
            .get(column)
            .copied()
            .unwrap_or(1.0);
        let corrected = (f64::from(brightness) * scale).round() as i32 + self.offset;
        corrected.clamp(0, BRIGHTNESS_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_correction_passes_values_through() {
        let correction = BrightnessCorrection::new();
        assert_eq!(correction.apply(200, 10), 200);
    }

    #[test]
    fn scale_and_offset_are_applied() {
        let mut correction = BrightnessCorrection::new();
        correction.set_scale_factor(4, 1.5).unwrap();
        correction.set_offset(10);
        assert_eq!(correction.apply(100, 4), 160);
        // Other columns keep unit scale.
        assert_eq!(correction.apply(100, 5), 110);
    }

    #[test]
    fn bad_factors_are_rejected_per_element() {
        let mut correction = BrightnessCorrection::new();
        correction.set_scale_factor(0, 2.0).unwrap();

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                correction.set_scale_factor(1, bad),
                Err(ScanError::InvalidScaleFactor { column: 1, .. })
            ));
        }

        // The previously accepted element is unaffected.
        assert_eq!(correction.scale_factor(0).unwrap(), 2.0);
        assert_eq!(correction.scale_factor(1).unwrap(), 1.0);
    }

    #[test]
    fn out_of_range_column_is_rejected() {
        let mut correction = BrightnessCorrection::new();
        assert!(matches!(
            correction.set_scale_factor(MAX_PROFILE_COLUMNS, 1.0),
            Err(ScanError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn correction_saturates_into_sensor_range() {
        let mut correction = BrightnessCorrection::new();
        correction.set_scale_factor(0, 100.0).unwrap();
        assert_eq!(correction.apply(255, 0), BRIGHTNESS_MAX);

        correction.set_offset(-500);
        assert_eq!(correction.apply(1, 1), 0);
    }

    #[test]
    fn sentinel_brightness_passes_through() {
        let correction = BrightnessCorrection::new();
        assert_eq!(correction.apply(INVALID_BRIGHTNESS, 0), INVALID_BRIGHTNESS);
    }
}
