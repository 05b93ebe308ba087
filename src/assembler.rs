//! Profile reassembly from out-of-order datagram fragments.
//!
//! One `ProfileAssembler` serves one logical source (a camera/laser pairing
//! on one sensor head) and is driven by a single caller: the transport layer
//! creates a profile when the first fragment of a sequence arrives, then
//! folds every fragment of that sequence into it. Fragments may arrive in
//! any order; each one carries its absolute destination columns via
//! `start_column`, `datagram_index`, and the sampling stride, so folding is
//! order-independent. The alignment transform is applied per sample during
//! ingestion, which keeps the hot path to a single traversal and leaves
//! partially assembled profiles with correctly transformed data for whatever
//! columns did arrive.
//!
//! Completion is signalled purely by fragment accounting; deciding when to
//! abandon a profile that never completes is the caller's concern.

use bytes::Buf;
use tracing::{debug, trace};

use crate::alignment::AlignmentParameters;
use crate::config::{AssemblerConfig, SourceConfig};
use crate::data::{
    DataFormat, DataType, Point, Profile, ProfileArena, INVALID_BRIGHTNESS, RAW_INVALID_XY,
};
use crate::error::{ScanError, ScanResult};
use crate::net::packet::{FragmentLayout, PacketHeader};
use crate::sensor::SensorSpec;

/// Reassembles complete profiles for one scan source.
pub struct ProfileAssembler {
    alignment: AlignmentParameters,
    sensor: SensorSpec,
    format: DataFormat,
    arena: ProfileArena,
}

impl ProfileAssembler {
    /// Create an assembler for one source.
    #[must_use]
    pub fn new(
        alignment: AlignmentParameters,
        sensor: SensorSpec,
        format: DataFormat,
        config: &AssemblerConfig,
    ) -> Self {
        Self {
            alignment,
            sensor,
            format,
            arena: ProfileArena::new(config.profiles_per_arena),
        }
    }

    /// Create an assembler from a validated source configuration.
    pub fn from_config(config: &SourceConfig) -> ScanResult<Self> {
        config.assembler.validate()?;
        Ok(Self::new(
            config.alignment.build()?,
            config.sensor_spec(),
            config.format,
            &config.assembler,
        ))
    }

    /// The source's sampling format.
    #[must_use]
    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// The current alignment calibration.
    #[must_use]
    pub fn alignment(&self) -> &AlignmentParameters {
        &self.alignment
    }

    /// Mutable access for recalibration between profiles.
    pub fn alignment_mut(&mut self) -> &mut AlignmentParameters {
        &mut self.alignment
    }

    /// Start a new profile from the first fragment's header.
    ///
    /// Allocates the profile's point buffer (and the camera-space buffer for
    /// subpixel formats) from the arena and records how many fragments the
    /// head announced.
    pub fn create_new_profile(&mut self, header: &PacketHeader) -> ScanResult<Profile> {
        let camera = self.sensor.camera_id(header.camera_port)?;
        let laser = self.sensor.laser_id(header.laser_port)?;

        let points = self.arena.take();
        let camera_coords = if self.format.has_subpixel() {
            Some(self.arena.take())
        } else {
            None
        };

        debug!(
            scan_head_id = header.scan_head_id,
            sequence = header.sequence_number,
            expected = header.total_datagrams,
            "starting profile assembly"
        );

        Ok(Profile::new(
            header.scan_head_id,
            camera,
            laser,
            header.sequence_number,
            header.timestamp_ns,
            header.encoder_values.clone(),
            ns_to_us(header.laser_on_time_ns),
            ns_to_us(header.exposure_ns),
            self.format,
            header.flags,
            header.total_datagrams,
            points,
            camera_coords,
        ))
    }

    /// Fold one fragment into the profile.
    ///
    /// Returns `true` exactly when this fragment completes the profile.
    /// An unrecognized data-type combination is a protocol-version mismatch
    /// and is surfaced as an error, never retried.
    pub fn process_packet(
        &mut self,
        profile: &mut Profile,
        header: &PacketHeader,
        payload: &[u8],
    ) -> ScanResult<bool> {
        let has_xy = header.data_types.contains(DataType::XY);
        let has_subpixel = header.data_types.contains(DataType::Subpixel);
        match (has_xy, has_subpixel) {
            (true, false) => self.fold_xy(profile, header, payload)?,
            (false, true) => self.fold_subpixel(profile, header, payload)?,
            _ => return Err(ScanError::UnsupportedDataTypes(header.data_types.bits())),
        }

        let complete = profile.record_packet();
        if complete {
            debug!(
                sequence = profile.sequence_number,
                valid_points = profile.valid_point_count(),
                "profile complete"
            );
        } else {
            trace!(
                sequence = header.sequence_number,
                datagram = header.datagram_index,
                "fragment folded"
            );
        }
        Ok(complete)
    }

    fn fold_xy(
        &self,
        profile: &mut Profile,
        header: &PacketHeader,
        payload: &[u8],
    ) -> ScanResult<()> {
        let xy = required_layout(header, DataType::XY)?;
        let brightness = if header.data_types.contains(DataType::Brightness) {
            Some(required_layout(header, DataType::Brightness)?)
        } else {
            None
        };

        check_region(payload, xy, 4, "XY")?;
        if let Some(b) = brightness {
            check_region(payload, b, 1, "brightness")?;
            if b.num_vals != xy.num_vals {
                return Err(ScanError::MalformedPacket(format!(
                    "brightness sample count {} does not match XY sample count {}",
                    b.num_vals, xy.num_vals
                )));
            }
        }

        let columns = column_walk(header, xy, profile.raw_points().len())?;
        let mut region = &payload[xy.offset..xy.offset + xy.num_vals * 4];
        for (i, column) in columns.enumerate() {
            let raw_x = region.get_u16();
            let raw_y = region.get_u16();
            let brightness_val = match brightness {
                Some(b) => i32::from(payload[b.offset + i]),
                None => INVALID_BRIGHTNESS,
            };

            if raw_x != RAW_INVALID_XY && raw_y != RAW_INVALID_XY {
                let point =
                    self.alignment
                        .camera_to_mill(f64::from(raw_x), f64::from(raw_y), brightness_val);
                profile.set_point(column, point)?;
                profile.count_valid_point();
            } else {
                profile.set_point(column, Point::INVALID)?;
            }
        }
        Ok(())
    }

    fn fold_subpixel(
        &self,
        profile: &mut Profile,
        header: &PacketHeader,
        payload: &[u8],
    ) -> ScanResult<()> {
        let subpixel = required_layout(header, DataType::Subpixel)?;
        let brightness = if header.data_types.contains(DataType::Brightness) {
            Some(required_layout(header, DataType::Brightness)?)
        } else {
            None
        };

        check_region(payload, subpixel, 2, "subpixel")?;
        if let Some(b) = brightness {
            check_region(payload, b, 1, "brightness")?;
            if b.num_vals != subpixel.num_vals {
                return Err(ScanError::MalformedPacket(format!(
                    "brightness sample count {} does not match subpixel sample count {}",
                    b.num_vals, subpixel.num_vals
                )));
            }
        }

        let capacity = profile.camera_coords().map(<[Point]>::len).ok_or_else(|| {
            ScanError::MalformedPacket("subpixel data for a non-subpixel profile".into())
        })?;

        let columns = column_walk(header, subpixel, capacity)?;
        let mut region = &payload[subpixel.offset..subpixel.offset + subpixel.num_vals * 2];
        for (i, column) in columns.enumerate() {
            let raw_row = region.get_u16();
            let brightness_val = match brightness {
                Some(b) => i32::from(payload[b.offset + i]),
                None => INVALID_BRIGHTNESS,
            };

            // Subpixel samples stay in camera space for downstream
            // calibration; no mill transform is applied.
            let point = if raw_row != RAW_INVALID_XY {
                Point::new(f64::from(raw_row), column as f64, brightness_val)
            } else {
                Point::INVALID
            };
            profile.set_camera_coord(column, point)?;
        }
        Ok(())
    }
}

fn ns_to_us(ns: u64) -> u32 {
    u32::try_from(ns / 1000).unwrap_or(u32::MAX)
}

fn required_layout(header: &PacketHeader, data_type: DataType) -> ScanResult<&FragmentLayout> {
    header.layout(data_type).ok_or_else(|| {
        ScanError::MalformedPacket(format!("missing fragment layout for {data_type:?}"))
    })
}

fn check_region(
    payload: &[u8],
    layout: &FragmentLayout,
    element_size: usize,
    label: &str,
) -> ScanResult<()> {
    let end = layout.offset + layout.num_vals * element_size;
    if end > payload.len() {
        return Err(ScanError::MalformedPacket(format!(
            "{label} region [{}..{end}) exceeds payload of {} bytes",
            layout.offset,
            payload.len()
        )));
    }
    Ok(())
}

/// Destination columns for one fragment: the datagram's sample set starts at
/// `start_column + datagram_index * step` and advances by
/// `total_datagrams * step` per sample, reconstructing the head's column
/// interleaving across datagrams.
fn column_walk(
    header: &PacketHeader,
    layout: &FragmentLayout,
    capacity: usize,
) -> ScanResult<impl Iterator<Item = usize>> {
    let step = layout.step.max(1);
    let first = header.start_column as usize + header.datagram_index as usize * step;
    let advance = (header.total_datagrams as usize).max(1) * step;

    if layout.num_vals > 0 {
        let last = first + (layout.num_vals - 1) * advance;
        if last >= capacity {
            return Err(ScanError::MalformedPacket(format!(
                "fragment addresses column {last} beyond buffer of {capacity} columns"
            )));
        }
    }
    Ok((0..layout.num_vals).map(move |i| first + i * advance))
}
