//! Wire-facing types consumed from the transport layer.

pub mod packet;

pub use packet::{FragmentLayout, PacketHeader};
