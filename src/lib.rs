//! # triscan
//!
//! Client-side receive path for laser-triangulation scan heads. The crate
//! turns streams of already-decoded datagram fragments into complete,
//! calibrated, mill-space scan profiles (or diagnostic camera images) and
//! persists/restores those profiles in a compact binary record format.
//!
//! Transport concerns — sockets, datagram receipt, retransmission policy,
//! device discovery, session management — live outside this crate; it only
//! consumes decoded packet headers plus raw payload byte spans and produces
//! finished data entities.
//!
//! ## Crate Structure
//!
//! - **`alignment`**: per camera/laser pairing rigid transform between the
//!   sensor's camera space and machine ("mill") space, recomputed eagerly on
//!   every calibration change.
//! - **`assembler`**: the orchestrator. Owns an arena of pre-allocated point
//!   buffers, creates one `Profile` per incoming sequence, and folds each
//!   arriving fragment into its absolute destination columns, applying the
//!   alignment transform inline.
//! - **`brightness`**: per-column brightness calibration with per-element
//!   validation.
//! - **`codec`**: the exact binary layout used to persist and restore
//!   profiles and camera images, including the legacy format-inference
//!   heuristic for records written without a format tag.
//! - **`config`**: TOML-deserializable source configuration (format, port
//!   tables, alignment calibration, assembler tuning) with validation.
//! - **`data`**: the data entities — points and sentinels, sampling formats
//!   and the resolution preset table, profiles, camera images, and the
//!   buffer arena.
//! - **`error`**: the crate-wide `ScanError` type and `ScanResult` alias.
//! - **`net`**: the decoded packet-header model consumed from the transport
//!   layer.
//! - **`sensor`**: physical port to logical id mapping for one head.

pub mod alignment;
pub mod assembler;
pub mod brightness;
pub mod codec;
pub mod config;
pub mod data;
pub mod error;
pub mod net;
pub mod sensor;

pub use alignment::{AlignmentParameters, CableOrientation};
pub use assembler::ProfileAssembler;
pub use brightness::BrightnessCorrection;
pub use config::{AlignmentConfig, AssemblerConfig, SourceConfig, DEFAULT_PROFILES_PER_ARENA};
pub use data::{
    CameraImage, DataFormat, DataType, DataTypeSet, Encoder, Point, Profile, ProfileFlags,
    INVALID_BRIGHTNESS, INVALID_XY, MAX_PROFILE_COLUMNS, RAW_INVALID_XY,
};
pub use error::{ScanError, ScanResult};
pub use net::{FragmentLayout, PacketHeader};
pub use sensor::SensorSpec;
