//! The assembled profile entity: one calibrated row of scan samples.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ScanError, ScanResult};

use super::format::DataFormat;
use super::point::Point;

/// Encoder channel identifier.
///
/// The ordering matters: persisted records store encoder counts by channel
/// index, so the `Ord` derive drives the on-disk layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Encoder {
    /// Primary position-feedback channel.
    Main = 0,
    /// First auxiliary channel.
    Auxiliary1 = 1,
    /// Second auxiliary channel.
    Auxiliary2 = 2,
}

impl Encoder {
    /// Channel for a zero-based index, as stored in persisted records.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Encoder::Main),
            1 => Some(Encoder::Auxiliary1),
            2 => Some(Encoder::Auxiliary2),
            _ => None,
        }
    }
}

/// Encoder fault and sync conditions latched at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileFlags(u16);

impl ProfileFlags {
    /// No condition flagged.
    pub const NONE: Self = Self(0);
    /// Main encoder quadrature fault, channel A.
    pub const ENCODER_MAIN_FAULT_A: Self = Self(0x0001);
    /// Main encoder quadrature fault, channel B.
    pub const ENCODER_MAIN_FAULT_B: Self = Self(0x0002);
    /// Main encoder index-pulse fault.
    pub const ENCODER_MAIN_FAULT_INDEX: Self = Self(0x0004);
    /// Main encoder count overrun.
    pub const ENCODER_MAIN_OVERRUN: Self = Self(0x0008);
    /// Auxiliary encoder quadrature fault, channel A.
    pub const ENCODER_AUX_FAULT_A: Self = Self(0x0010);
    /// Auxiliary encoder quadrature fault, channel B.
    pub const ENCODER_AUX_FAULT_B: Self = Self(0x0020);
    /// Auxiliary encoder count overrun.
    pub const ENCODER_AUX_OVERRUN: Self = Self(0x0040);

    /// Build from the raw header bits.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether all of `other`'s bits are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no condition is flagged.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// One assembled row of calibrated scan samples plus capture metadata, for
/// one camera/laser pairing, for one scan cycle.
///
/// A profile is created by the assembler when the first fragment of a
/// sequence arrives and mutated only by the assembler until
/// [`Profile::is_complete`] holds; ownership then passes to the consumer.
///
/// `Clone` duplicates the point buffers (an explicit deep copy). Callers that
/// want cheap sharing of a completed profile should wrap it in an
/// `Arc<Profile>` instead.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Identifier of the scan head that produced this profile.
    pub scan_head_id: u32,
    /// Camera id (resolved from the camera port via the sensor spec).
    pub camera: u32,
    /// Laser id (resolved from the laser port via the sensor spec).
    pub laser: u32,
    /// Monotonic sequence number assigned by the head.
    pub sequence_number: u32,
    /// Capture timestamp in nanoseconds.
    pub timestamp_ns: u64,
    /// Encoder counts latched at capture time.
    pub encoder_values: BTreeMap<Encoder, i64>,
    /// Laser-on time in microseconds.
    pub laser_on_time_us: u32,
    /// Camera exposure in microseconds.
    pub exposure_us: u32,
    /// Logical sampling format of the stream this profile came from.
    pub format: DataFormat,
    /// Encoder fault/sync conditions at capture time.
    pub flags: ProfileFlags,

    points: Box<[Point]>,
    camera_coords: Option<Box<[Point]>>,
    valid_point_count: usize,
    packets_received: u32,
    packets_expected: u32,
}

impl Profile {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        scan_head_id: u32,
        camera: u32,
        laser: u32,
        sequence_number: u32,
        timestamp_ns: u64,
        encoder_values: BTreeMap<Encoder, i64>,
        laser_on_time_us: u32,
        exposure_us: u32,
        format: DataFormat,
        flags: ProfileFlags,
        packets_expected: u32,
        points: Box<[Point]>,
        camera_coords: Option<Box<[Point]>>,
    ) -> Self {
        Self {
            scan_head_id,
            camera,
            laser,
            sequence_number,
            timestamp_ns,
            encoder_values,
            laser_on_time_us,
            exposure_us,
            format,
            flags,
            points,
            camera_coords,
            valid_point_count: 0,
            packets_received: 0,
            packets_expected,
        }
    }

    /// The raw point buffer, including invalid sentinel entries.
    #[must_use]
    pub fn raw_points(&self) -> &[Point] {
        &self.points
    }

    /// The camera-space subpixel buffer, present only for subpixel formats.
    #[must_use]
    pub fn camera_coords(&self) -> Option<&[Point]> {
        self.camera_coords.as_deref()
    }

    /// Number of valid points folded in so far.
    #[must_use]
    pub fn valid_point_count(&self) -> usize {
        self.valid_point_count
    }

    /// Fragments folded in so far.
    #[must_use]
    pub fn packets_received(&self) -> u32 {
        self.packets_received
    }

    /// Fragments the head announced for this profile.
    #[must_use]
    pub fn packets_expected(&self) -> u32 {
        self.packets_expected
    }

    /// A profile is complete exactly when every announced fragment arrived.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.packets_received == self.packets_expected
    }

    /// Column stride implied by this profile's sampling format.
    ///
    /// Always 1, 2, or 4; the format enum is closed, so there is no
    /// unrecognized-format path.
    #[must_use]
    pub fn data_stride(&self) -> usize {
        self.format.step()
    }

    /// Lazy, restartable iteration over the valid points, walking the raw
    /// buffer at the format's stride.
    pub fn valid_points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.points
            .iter()
            .step_by(self.data_stride())
            .filter(|p| p.is_valid())
    }

    /// Copy the valid points into `dest` in buffer order.
    ///
    /// Fails with [`ScanError::BufferTooSmall`] before any copy when `dest`
    /// cannot hold the recorded valid-point count. Returns the number of
    /// points copied.
    pub fn copy_valid_points(&self, dest: &mut [Point]) -> ScanResult<usize> {
        if dest.len() < self.valid_point_count {
            return Err(ScanError::BufferTooSmall {
                needed: self.valid_point_count,
                capacity: dest.len(),
            });
        }
        let mut copied = 0;
        for (slot, point) in dest.iter_mut().zip(self.valid_points()) {
            *slot = *point;
            copied += 1;
        }
        Ok(copied)
    }

    pub(crate) fn set_point(&mut self, column: usize, point: Point) -> ScanResult<()> {
        let slot = self
            .points
            .get_mut(column)
            .ok_or(ScanError::InvalidColumn { column })?;
        *slot = point;
        Ok(())
    }

    pub(crate) fn set_camera_coord(&mut self, column: usize, point: Point) -> ScanResult<()> {
        let buffer = self
            .camera_coords
            .as_deref_mut()
            .ok_or_else(|| {
                ScanError::MalformedPacket("subpixel data for a non-subpixel profile".into())
            })?;
        let slot = buffer
            .get_mut(column)
            .ok_or(ScanError::InvalidColumn { column })?;
        *slot = point;
        Ok(())
    }

    pub(crate) fn count_valid_point(&mut self) {
        self.valid_point_count += 1;
    }

    pub(crate) fn set_valid_point_count(&mut self, count: usize) {
        self.valid_point_count = count;
    }

    /// Record one received fragment; returns `true` exactly when this call
    /// completes the profile.
    pub(crate) fn record_packet(&mut self) -> bool {
        self.packets_received += 1;
        self.packets_received == self.packets_expected
    }
}
