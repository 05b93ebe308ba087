//! Configuration for one logical scan source.
//!
//! A source is one camera/laser pairing on one sensor head. Its configuration
//! bundles the sampling format, the port tables, the alignment calibration,
//! and the assembler tuning knobs, and can be deserialized from TOML.

use serde::{Deserialize, Serialize};

use crate::alignment::{AlignmentParameters, CableOrientation};
use crate::data::DataFormat;
use crate::error::{ScanError, ScanResult};
use crate::sensor::SensorSpec;

/// Default number of profile buffers allocated ahead per arena batch.
pub const DEFAULT_PROFILES_PER_ARENA: usize = 100;

/// Assembler tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Profile buffers pre-allocated per arena batch.
    pub profiles_per_arena: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            profiles_per_arena: DEFAULT_PROFILES_PER_ARENA,
        }
    }
}

impl AssemblerConfig {
    /// Check semantic validity of values that parsed successfully.
    pub fn validate(&self) -> ScanResult<()> {
        if self.profiles_per_arena == 0 {
            return Err(ScanError::Config(
                "profiles_per_arena must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Alignment calibration values as found in configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Mounting orientation of the head.
    pub orientation: CableOrientation,
    /// Roll about the optical axis, degrees.
    pub roll_degrees: f64,
    /// X translation, mill units.
    pub shift_x: f64,
    /// Y translation, mill units.
    pub shift_y: f64,
    /// Scale from camera units to mill units.
    pub camera_to_mill_scale: f64,
}

impl AlignmentConfig {
    /// Build validated alignment parameters from the configured values.
    pub fn build(&self) -> ScanResult<AlignmentParameters> {
        AlignmentParameters::new(
            self.orientation,
            self.roll_degrees,
            self.shift_x,
            self.shift_y,
            self.camera_to_mill_scale,
        )
    }
}

/// Full configuration of one scan source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Logical sampling format the head streams for this source.
    pub format: DataFormat,
    /// Camera ids indexed by physical port.
    pub cameras: Vec<u32>,
    /// Laser ids indexed by physical port.
    pub lasers: Vec<u32>,
    /// Alignment calibration for this pairing.
    pub alignment: AlignmentConfig,
    /// Assembler tuning.
    #[serde(default)]
    pub assembler: AssemblerConfig,
}

impl SourceConfig {
    /// Parse and validate a source configuration from TOML text.
    pub fn from_toml(text: &str) -> ScanResult<Self> {
        let config: SourceConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check semantic validity of values that parsed successfully.
    pub fn validate(&self) -> ScanResult<()> {
        if self.cameras.is_empty() {
            return Err(ScanError::Config("camera port table is empty".into()));
        }
        if self.lasers.is_empty() {
            return Err(ScanError::Config("laser port table is empty".into()));
        }
        self.alignment.build()?;
        self.assembler.validate()
    }

    /// Port lookup tables for this source's head.
    #[must_use]
    pub fn sensor_spec(&self) -> SensorSpec {
        SensorSpec::new(self.cameras.clone(), self.lasers.clone())
    }
}
