//! Rigid transform between camera space and mill space.
//!
//! One `AlignmentParameters` instance exists per camera/laser pairing on a
//! sensor head and lives as long as that head's calibration. Every mutation
//! recomputes the derived matrices synchronously, so the matrices are never
//! stale with respect to the last-set orientation, roll, or scale.

use serde::{Deserialize, Serialize};

use crate::data::Point;
use crate::error::{ScanError, ScanResult};

/// Fixed ratio between the sensor's native subpixel unit and its physical
/// unit.
const CAMERA_UNITS_PER_MILL_UNIT: f64 = 1000.0;

/// Mounting orientation of the sensor head relative to material flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CableOrientation {
    /// Cable exits toward the upstream side; yaw is 180 degrees.
    CableUpstream,
    /// Cable exits toward the downstream side; yaw is zero.
    CableDownstream,
}

/// Per-pairing rigid transform between camera space and mill space.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentParameters {
    orientation: CableOrientation,
    roll_degrees: f64,
    shift_x: f64,
    shift_y: f64,
    camera_to_mill_scale: f64,

    // Derived forward (camera -> mill) matrix.
    xx: f64,
    xy: f64,
    yx: f64,
    yy: f64,
    // Derived inverse (mill -> camera) matrix, built from negated roll and
    // yaw with the reciprocal scale path. Not a bit-exact matrix inverse of
    // the forward entries; the asymmetry is part of the calibration
    // contract and is preserved as-is.
    ixx: f64,
    ixy: f64,
    iyx: f64,
    iyy: f64,
}

fn require_finite(name: &'static str, value: f64) -> ScanResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ScanError::InvalidAlignment { name, value })
    }
}

impl AlignmentParameters {
    /// Create alignment parameters, rejecting NaN or infinite roll/shift.
    pub fn new(
        orientation: CableOrientation,
        roll_degrees: f64,
        shift_x: f64,
        shift_y: f64,
        camera_to_mill_scale: f64,
    ) -> ScanResult<Self> {
        require_finite("roll_degrees", roll_degrees)?;
        require_finite("shift_x", shift_x)?;
        require_finite("shift_y", shift_y)?;

        let mut params = Self {
            orientation,
            roll_degrees,
            shift_x,
            shift_y,
            camera_to_mill_scale,
            xx: 0.0,
            xy: 0.0,
            yx: 0.0,
            yy: 0.0,
            ixx: 0.0,
            ixy: 0.0,
            iyx: 0.0,
            iyy: 0.0,
        };
        params.recompute();
        Ok(params)
    }

    /// Mounting orientation.
    #[must_use]
    pub fn orientation(&self) -> CableOrientation {
        self.orientation
    }

    /// Roll about the optical axis, degrees.
    #[must_use]
    pub fn roll_degrees(&self) -> f64 {
        self.roll_degrees
    }

    /// X translation from camera origin to mill origin, mill units.
    #[must_use]
    pub fn shift_x(&self) -> f64 {
        self.shift_x
    }

    /// Y translation from camera origin to mill origin, mill units.
    #[must_use]
    pub fn shift_y(&self) -> f64 {
        self.shift_y
    }

    /// Scale from camera units to mill units.
    #[must_use]
    pub fn camera_to_mill_scale(&self) -> f64 {
        self.camera_to_mill_scale
    }

    /// Set the mounting orientation and recompute the matrices.
    pub fn set_orientation(&mut self, orientation: CableOrientation) {
        self.orientation = orientation;
        self.recompute();
    }

    /// Set the roll angle and recompute the matrices.
    ///
    /// Fails on NaN or infinite input, leaving prior state untouched.
    pub fn set_roll_degrees(&mut self, roll_degrees: f64) -> ScanResult<()> {
        require_finite("roll_degrees", roll_degrees)?;
        self.roll_degrees = roll_degrees;
        self.recompute();
        Ok(())
    }

    /// Set the translation and recompute the matrices.
    ///
    /// Fails on NaN or infinite input, leaving prior state untouched.
    pub fn set_shift(&mut self, shift_x: f64, shift_y: f64) -> ScanResult<()> {
        require_finite("shift_x", shift_x)?;
        require_finite("shift_y", shift_y)?;
        self.shift_x = shift_x;
        self.shift_y = shift_y;
        self.recompute();
        Ok(())
    }

    /// Set the camera-to-mill scale and recompute the matrices.
    pub fn set_camera_to_mill_scale(&mut self, scale: f64) {
        self.camera_to_mill_scale = scale;
        self.recompute();
    }

    fn recompute(&mut self) {
        let yaw = match self.orientation {
            CableOrientation::CableUpstream => 180f64.to_radians(),
            CableOrientation::CableDownstream => 0.0,
        };
        let roll = self.roll_degrees.to_radians();

        let forward = self.camera_to_mill_scale / CAMERA_UNITS_PER_MILL_UNIT;
        self.xx = yaw.cos() * roll.cos() * forward;
        self.xy = roll.sin() * forward;
        self.yx = yaw.cos() * roll.sin() * forward;
        self.yy = roll.cos() * forward;

        let inverse = CAMERA_UNITS_PER_MILL_UNIT / self.camera_to_mill_scale;
        let neg_roll = -roll;
        let neg_yaw = -yaw;
        self.ixx = neg_yaw.cos() * neg_roll.cos() * inverse;
        self.ixy = neg_roll.sin() * inverse;
        self.iyx = neg_yaw.cos() * neg_roll.sin() * inverse;
        self.iyy = neg_roll.cos() * inverse;
    }

    /// Transform a camera-space sample into mill space.
    #[must_use]
    pub fn camera_to_mill(&self, x: f64, y: f64, brightness: i32) -> Point {
        Point::new(
            x * self.xx - y * self.xy + self.shift_x,
            x * self.yx + y * self.yy + self.shift_y,
            brightness,
        )
    }

    /// Transform a mill-space point back into camera space.
    ///
    /// Approximate round trip: the inverse is rebuilt from negated angles,
    /// not inverted from the forward matrix.
    #[must_use]
    pub fn mill_to_camera(&self, x: f64, y: f64, brightness: i32) -> Point {
        let dx = x - self.shift_x;
        let dy = y - self.shift_y;
        Point::new(
            dx * self.ixx - dy * self.ixy,
            dx * self.iyx + dy * self.iyy,
            brightness,
        )
    }
}
