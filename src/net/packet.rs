//! Decoded datagram header model handed in by the transport layer.
//!
//! Socket handling, datagram receipt, and header byte decoding live in the
//! transport layer; the assembler only consumes these already-decoded
//! structures together with the raw payload byte span they describe.

use std::collections::{BTreeMap, HashMap};

use crate::data::{DataType, DataTypeSet, Encoder, ProfileFlags};

/// Where one data type's samples live inside a datagram payload.
///
/// A datagram carries a strided subset of a full sensor row; `num_vals`
/// samples of each advertised data type are packed at `offset`, and `step`
/// is the column stride the head used when sub-sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentLayout {
    /// Byte offset of this data type's region inside the payload.
    pub offset: usize,
    /// Number of samples in the region.
    pub num_vals: usize,
    /// Column-sampling stride the head applied.
    pub step: usize,
}

/// Decoded header of one profile datagram.
#[derive(Debug, Clone)]
pub struct PacketHeader {
    /// Transport-level source identifier.
    pub source_id: u32,
    /// Identifier of the originating scan head.
    pub scan_head_id: u32,
    /// Physical camera port on the head.
    pub camera_port: u32,
    /// Physical laser port on the head.
    pub laser_port: u32,
    /// Encoder fault/sync conditions at capture time.
    pub flags: ProfileFlags,
    /// Capture timestamp in nanoseconds.
    pub timestamp_ns: u64,
    /// Laser-on time in nanoseconds.
    pub laser_on_time_ns: u64,
    /// Camera exposure in nanoseconds.
    pub exposure_ns: u64,
    /// Profile sequence number; all fragments of one profile share it.
    pub sequence_number: u32,
    /// Total datagrams the head will send for this profile.
    pub total_datagrams: u32,
    /// Index of this datagram within the profile's sequence.
    pub datagram_index: u32,
    /// First column this datagram's sample set starts from.
    pub start_column: u32,
    /// Data types present in the payload.
    pub data_types: DataTypeSet,
    /// Encoder counts latched at capture time.
    pub encoder_values: BTreeMap<Encoder, i64>,
    /// Payload layout per data type present.
    pub fragment_layouts: HashMap<DataType, FragmentLayout>,
}

impl PacketHeader {
    /// Layout of the given data type's payload region, if present.
    #[must_use]
    pub fn layout(&self, data_type: DataType) -> Option<&FragmentLayout> {
        self.fragment_layouts.get(&data_type)
    }
}
