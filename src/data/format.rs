//! Sampling formats, wire data types, and the resolution preset table.
//!
//! A scan head streams each profile as a set of datagrams. The logical
//! sampling format (`DataFormat`) determines which wire data types those
//! datagrams carry and at what column stride the head sub-samples the full
//! sensor row. The mapping is fixed by the hardware protocol; the preset
//! table is built eagerly once and shared by reference so there is no
//! initialization-order ambiguity.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// One wire data type a datagram can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    /// One brightness byte per sample.
    Brightness = 0x01,
    /// Big-endian 16-bit X/Y pairs, already in camera space.
    XY = 0x02,
    /// Big-endian 16-bit subpixel row positions, kept in camera space.
    Subpixel = 0x04,
}

/// Bit set over [`DataType`] values, as carried in a packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataTypeSet(u8);

impl DataTypeSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);
    /// XY geometry only.
    pub const XY_ONLY: Self = Self(DataType::XY as u8);
    /// XY geometry plus brightness.
    pub const XY_BRIGHTNESS: Self = Self(DataType::XY as u8 | DataType::Brightness as u8);
    /// Subpixel rows plus brightness.
    pub const SUBPIXEL_BRIGHTNESS: Self =
        Self(DataType::Subpixel as u8 | DataType::Brightness as u8);

    /// Build a set from raw header bits.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Add one data type to the set.
    #[must_use]
    pub const fn with(self, data_type: DataType) -> Self {
        Self(self.0 | data_type as u8)
    }

    /// Whether the set contains the given data type.
    #[must_use]
    pub const fn contains(self, data_type: DataType) -> bool {
        self.0 & data_type as u8 != 0
    }

    /// Raw bit representation, as found in the packet header.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Logical sampling format of a profile stream.
///
/// Full/Half/Quarter name the column-sampling stride (1/2/4); the Brightness
/// variants additionally carry one brightness byte per sample. Subpixel
/// streams raw camera-row positions for calibration use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFormat {
    /// Every column, XY plus brightness.
    XYBrightnessFull = 0,
    /// Every other column, XY plus brightness.
    XYBrightnessHalf = 1,
    /// Every fourth column, XY plus brightness.
    XYBrightnessQuarter = 2,
    /// Every column, XY only.
    XYFull = 3,
    /// Every other column, XY only.
    XYHalf = 4,
    /// Every fourth column, XY only.
    XYQuarter = 5,
    /// Every column, camera-space subpixel rows plus brightness.
    SubpixelBrightnessFull = 6,
}

impl DataFormat {
    const COUNT: usize = 7;

    /// Column-sampling stride for this format (1, 2, or 4).
    #[must_use]
    pub fn step(self) -> usize {
        presets().get(self).step
    }

    /// Wire data types a datagram of this format carries.
    #[must_use]
    pub fn data_types(self) -> DataTypeSet {
        presets().get(self).data_types
    }

    /// Whether samples of this format carry a brightness byte.
    #[must_use]
    pub fn has_brightness(self) -> bool {
        self.data_types().contains(DataType::Brightness)
    }

    /// Whether this format streams camera-space subpixel data.
    #[must_use]
    pub fn has_subpixel(self) -> bool {
        self.data_types().contains(DataType::Subpixel)
    }
}

/// The wire data types and sampling stride one format implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionPreset {
    /// Data types the assembler must expect per datagram.
    pub data_types: DataTypeSet,
    /// Column-sampling stride: 1, 2, or 4.
    pub step: usize,
}

/// Immutable registry mapping each [`DataFormat`] to its preset.
///
/// Indexed by format discriminant, so a lookup on the closed enum is total;
/// there is no unrecognized-format path at runtime.
#[derive(Debug)]
pub struct ResolutionPresets {
    table: [ResolutionPreset; DataFormat::COUNT],
}

impl ResolutionPresets {
    /// Build the standard hardware preset table.
    #[must_use]
    pub fn standard() -> Self {
        let entry = |data_types, step| ResolutionPreset { data_types, step };
        Self {
            table: [
                entry(DataTypeSet::XY_BRIGHTNESS, 1),
                entry(DataTypeSet::XY_BRIGHTNESS, 2),
                entry(DataTypeSet::XY_BRIGHTNESS, 4),
                entry(DataTypeSet::XY_ONLY, 1),
                entry(DataTypeSet::XY_ONLY, 2),
                entry(DataTypeSet::XY_ONLY, 4),
                entry(DataTypeSet::SUBPIXEL_BRIGHTNESS, 1),
            ],
        }
    }

    /// Preset for the given format.
    #[must_use]
    pub fn get(&self, format: DataFormat) -> ResolutionPreset {
        self.table[format as usize]
    }
}

static PRESETS: Lazy<ResolutionPresets> = Lazy::new(ResolutionPresets::standard);

/// Shared reference to the process-wide preset table.
#[must_use]
pub fn presets() -> &'static ResolutionPresets {
    &PRESETS
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_FORMATS: [DataFormat; 7] = [
        DataFormat::XYBrightnessFull,
        DataFormat::XYBrightnessHalf,
        DataFormat::XYBrightnessQuarter,
        DataFormat::XYFull,
        DataFormat::XYHalf,
        DataFormat::XYQuarter,
        DataFormat::SubpixelBrightnessFull,
    ];

    #[test]
    fn every_step_is_one_two_or_four() {
        for format in ALL_FORMATS {
            assert!(
                matches!(format.step(), 1 | 2 | 4),
                "{format:?} has step {}",
                format.step()
            );
        }
    }

    #[test]
    fn steps_match_resolution_names() {
        assert_eq!(DataFormat::XYBrightnessFull.step(), 1);
        assert_eq!(DataFormat::XYBrightnessHalf.step(), 2);
        assert_eq!(DataFormat::XYBrightnessQuarter.step(), 4);
        assert_eq!(DataFormat::XYFull.step(), 1);
        assert_eq!(DataFormat::XYHalf.step(), 2);
        assert_eq!(DataFormat::XYQuarter.step(), 4);
        assert_eq!(DataFormat::SubpixelBrightnessFull.step(), 1);
    }

    #[test]
    fn brightness_formats_expect_brightness_bytes() {
        assert!(DataFormat::XYBrightnessHalf.has_brightness());
        assert!(!DataFormat::XYHalf.has_brightness());
        assert!(DataFormat::SubpixelBrightnessFull.has_brightness());
    }

    #[test]
    fn only_subpixel_formats_expect_subpixel_data() {
        for format in ALL_FORMATS {
            assert_eq!(
                format.has_subpixel(),
                format == DataFormat::SubpixelBrightnessFull
            );
        }
    }

    #[test]
    fn data_type_set_operations() {
        let set = DataTypeSet::EMPTY
            .with(DataType::XY)
            .with(DataType::Brightness);
        assert!(set.contains(DataType::XY));
        assert!(set.contains(DataType::Brightness));
        assert!(!set.contains(DataType::Subpixel));
        assert_eq!(set, DataTypeSet::XY_BRIGHTNESS);
        assert_eq!(DataTypeSet::from_bits(set.bits()), set);
        assert!(DataTypeSet::EMPTY.is_empty());
    }
}
