//! Encoder configuration
//!
//! Loaded from an optional TOML file. Every field has a default, so a file
//! only needs to list what it overrides:
//!
//! ```toml
//! precision = "adaptive"
//! position_divisor = 10000.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::converter::gltf_to_pmo::PrecisionPolicy;
use crate::error::Result;

/// Divisor applied to imported positions before they are stored.
pub const DEFAULT_POSITION_DIVISOR: f32 = 10000.0;

/// Settings for glTF → PMO encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Precision policy for texture coordinates and positions.
    pub precision: PrecisionPolicy,
    /// Positions are divided by this before being written.
    pub position_divisor: f32,
    /// Store `1 - v` instead of `v` (glTF and the PSP disagree on the origin).
    pub flip_texture_v: bool,
    /// Encode chunks on the rayon thread pool.
    pub parallel: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            precision: PrecisionPolicy::default(),
            position_divisor: DEFAULT_POSITION_DIVISOR,
            flip_texture_v: true,
            parallel: true,
        }
    }
}

impl EncoderConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Load `path` if given, defaults otherwise.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
