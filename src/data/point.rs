//! Profile point type and the invalid-sample sentinels.

use serde::{Deserialize, Serialize};

/// Sentinel X/Y coordinate marking "no valid sample at this position".
///
/// The value sits far outside any physical mill-space coordinate, so a point
/// whose x or y equals it can never be confused with real geometry.
pub const INVALID_XY: f64 = -32768.0;

/// Sentinel brightness for points that carry no brightness measurement.
pub const INVALID_BRIGHTNESS: i32 = -1;

/// Hardware sentinel for an invalid raw sample on the wire (0x8000).
pub const RAW_INVALID_XY: u16 = 0x8000;

/// One calibrated scan sample: mill-space coordinates plus brightness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate in mill units.
    pub x: f64,
    /// Y coordinate in mill units.
    pub y: f64,
    /// Measured brightness, or [`INVALID_BRIGHTNESS`] when absent.
    pub brightness: i32,
}

impl Point {
    /// The all-sentinel point written wherever no sample arrived.
    pub const INVALID: Point = Point {
        x: INVALID_XY,
        y: INVALID_XY,
        brightness: INVALID_BRIGHTNESS,
    };

    /// Create a point from explicit coordinates and brightness.
    #[must_use]
    pub const fn new(x: f64, y: f64, brightness: i32) -> Self {
        Self { x, y, brightness }
    }

    /// A point is valid iff neither coordinate equals the sentinel.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x != INVALID_XY && self.y != INVALID_XY
    }
}
