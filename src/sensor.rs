//! Sensor head specification: physical port to logical id mapping.

use serde::{Deserialize, Serialize};

use crate::error::{ScanError, ScanResult};

/// Port lookup tables for one sensor head.
///
/// Packet headers carry physical camera/laser port numbers; consumers work
/// with the logical ids assigned by the head specification. Index in each
/// table is the port number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSpec {
    cameras: Vec<u32>,
    lasers: Vec<u32>,
}

impl SensorSpec {
    /// Build a spec from port-indexed id tables.
    #[must_use]
    pub fn new(cameras: Vec<u32>, lasers: Vec<u32>) -> Self {
        Self { cameras, lasers }
    }

    /// Logical camera id for a physical camera port.
    pub fn camera_id(&self, port: u32) -> ScanResult<u32> {
        self.cameras
            .get(port as usize)
            .copied()
            .ok_or(ScanError::UnknownPort {
                kind: "camera",
                port,
            })
    }

    /// Logical laser id for a physical laser port.
    pub fn laser_id(&self, port: u32) -> ScanResult<u32> {
        self.lasers
            .get(port as usize)
            .copied()
            .ok_or(ScanError::UnknownPort {
                kind: "laser",
                port,
            })
    }

    /// Number of camera ports defined.
    #[must_use]
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Number of laser ports defined.
    #[must_use]
    pub fn laser_count(&self) -> usize {
        self.lasers.len()
    }
}
