//! Custom error types for the scanner receive path.
//!
//! This module defines the primary error type, `ScanError`, for the whole
//! crate. Using the `thiserror` crate, it provides a centralized and
//! consistent way to classify the failure conditions the receive path can
//! hit, from invalid calibration input to corrupted binary records.
//!
//! ## Error Hierarchy
//!
//! - **`InvalidAlignment`**: a NaN or infinite roll/shift was passed to an
//!   alignment constructor or mutator. No partial state is applied.
//! - **`UnsupportedDataTypes`**: a packet advertised a data-type combination
//!   the assembler does not understand. This indicates a protocol-version
//!   mismatch, not a transient condition, and is never retried internally.
//! - **`MalformedPacket`**: a fragment layout points outside the payload, or
//!   the payload is otherwise inconsistent with its header.
//! - **`BufferTooSmall`**: a caller-supplied destination buffer cannot hold
//!   the requested data. Reported before any copy takes place.
//! - **`BadMagic` / `Format`**: a persisted record failed validation; the
//!   whole record is rejected and no partial object is returned.
//! - **`Io`**: wraps `std::io::Error` for record file access.
//! - **`InvalidScaleFactor` / `InvalidColumn`**: per-element rejection in the
//!   brightness-correction tables; the rest of the collection is unaffected.
//! - **`UnknownPort`**: a packet referenced a camera or laser port the sensor
//!   specification does not define.
//! - **`Config` / `ConfigParse`**: configuration that parsed but is logically
//!   invalid, or failed TOML parsing outright.
//!
//! All conditions are surfaced to the caller synchronously; recovery (for
//! example re-requesting a dropped fragment) is a transport-layer concern.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Error type for every fallible operation in the receive path.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid alignment parameter {name}: {value} is not finite")]
    InvalidAlignment { name: &'static str, value: f64 },

    #[error("Unsupported data type combination 0x{0:02x} in packet")]
    UnsupportedDataTypes(u8),

    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    #[error("Destination buffer too small: need {needed}, have {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    #[error("Bad record magic: expected 0x0CBD, found 0x{found:04X}")]
    BadMagic { found: u16 },

    #[error("Record format error: {0}")]
    Format(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid brightness scale factor at column {column}: {value}")]
    InvalidScaleFactor { column: usize, value: f64 },

    #[error("Column index {column} is out of range")]
    InvalidColumn { column: usize },

    #[error("Unknown {kind} port {port}")]
    UnknownPort { kind: &'static str, port: u32 },

    #[error("Configuration validation error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
