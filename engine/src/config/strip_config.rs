//! Strip Configuration
//!
//! Centralizes every tunable of a strip render: which stage features run,
//! how the position field decodes into physical space, seam targets, the
//! output viewport and the initial navigation state. Loaded from JSON; any
//! field left out keeps its default.

use std::path::Path;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::strip::{SeamTargets, StageFeatures, SurfaceDecode};

/// Render and navigation settings for one strip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    // Stages
    /// Stage feature switches
    pub features: StageFeatures,
    /// Position field decoding and roll/unroll axes
    pub decode: SurfaceDecode,
    /// Neighbour values at each tile seam
    pub seam_targets: SeamTargets,

    // Layout
    /// Axis units per chunk pixel for naturally sized chunks
    pub units_per_pixel: f32,

    // Output
    /// Output image width in pixels
    pub width: u32,
    /// Output image height in pixels
    pub height: u32,
    /// Background colour (linear RGBA)
    pub clear_color: Vec4,
    /// Extra margin around the laid-out strip, as a fraction of its size
    pub fit_padding: f32,
    /// Depth of the orthographic view volume, centred on the strip plane
    pub depth_range: f32,

    // Navigation
    /// Initial wrap index
    pub wrap: f32,
    /// Wrap units advanced per second when animating
    pub speed: f32,
    /// Flatten override in [0, 1]
    pub flatten: f32,
}

impl Default for StripConfig {
    /// Defaults for a pixel-unit grid:
    /// - all stage features except label mode
    /// - 1 axis unit per pixel
    /// - unit decode extent; set `decode.extent` to the scan size in axis
    ///   units or the rolled surface stays a speck next to the flat strip
    /// - 1024x512 output on a black transparent background, 5% padding
    /// - wrap 0, no animation, no flatten override
    fn default() -> Self {
        Self {
            features: StageFeatures::default(),
            decode: SurfaceDecode::default(),
            seam_targets: SeamTargets::default(),

            units_per_pixel: 1.0,

            width: 1024,
            height: 512,
            clear_color: Vec4::ZERO,
            fit_padding: 0.05,
            depth_range: 10_000.0,

            wrap: 0.0,
            speed: 0.0,
            flatten: 0.0,
        }
    }
}

impl StripConfig {
    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config = Self::from_json(&data)?;
        log::info!("[StripConfig] Loaded {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AssetError> {
        if !(self.units_per_pixel > 0.0) || !self.units_per_pixel.is_finite() {
            return Err(AssetError::Invalid(format!(
                "units_per_pixel {} must be positive",
                self.units_per_pixel
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(AssetError::Invalid(format!(
                "output size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        if !(self.depth_range > 0.0) {
            return Err(AssetError::Invalid(format!(
                "depth_range {} must be positive",
                self.depth_range
            )));
        }
        Ok(())
    }
}
