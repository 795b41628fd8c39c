//! Stage Configuration Records
//!
//! Statically typed parameter records consumed by the per-vertex and
//! per-fragment stages. One parameterized stage pair replaces the family of
//! near-identical shader variants; each variant is now a combination of
//! [`StageFeatures`] flags.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Feature switches selecting which parts of the stage pair run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageFeatures {
    /// Rotate/translate the reconstruction by the wrap value and blend it
    /// against the flat layout around the unroll boundary.
    pub wrap: bool,
    /// Apply the user `flatten` override to the interpolation weight.
    pub flatten: bool,
    /// Add the fine-offset field to the coarse position field.
    pub fine_offset: bool,
    /// Map chunk-local UVs through the chunk's UV field before sampling the
    /// segment position field.
    pub uv_remap: bool,
    /// Remap the fragment sampling coordinate across overlap seams.
    pub seam_blend: bool,
    /// Treat the tile as an ink-label overlay (label threshold, opaque output).
    pub label: bool,
    /// The colour field spans the whole segment; the fragment stage maps its
    /// coordinate through the chunk UV field before sampling it. Set per
    /// chunk by the renderer from the loaded colour source.
    pub segment_color: bool,
}

impl Default for StageFeatures {
    fn default() -> Self {
        Self {
            wrap: true,
            flatten: true,
            fine_offset: true,
            uv_remap: true,
            seam_blend: true,
            label: false,
            segment_color: false,
        }
    }
}

impl StageFeatures {
    pub const WRAP: u32 = 1 << 0;
    pub const FLATTEN: u32 = 1 << 1;
    pub const FINE_OFFSET: u32 = 1 << 2;
    pub const UV_REMAP: u32 = 1 << 3;
    pub const SEAM_BLEND: u32 = 1 << 4;
    pub const LABEL: u32 = 1 << 5;
    pub const SEGMENT_COLOR: u32 = 1 << 6;

    /// Only the plain reconstruction: no wrap, no flatten, no seam handling.
    pub fn reconstruction_only() -> Self {
        Self {
            wrap: false,
            flatten: false,
            fine_offset: true,
            uv_remap: true,
            seam_blend: false,
            label: false,
            segment_color: false,
        }
    }

    /// Pack into the bit set carried by the GPU uniform record.
    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.wrap {
            bits |= Self::WRAP;
        }
        if self.flatten {
            bits |= Self::FLATTEN;
        }
        if self.fine_offset {
            bits |= Self::FINE_OFFSET;
        }
        if self.uv_remap {
            bits |= Self::UV_REMAP;
        }
        if self.seam_blend {
            bits |= Self::SEAM_BLEND;
        }
        if self.label {
            bits |= Self::LABEL;
        }
        if self.segment_color {
            bits |= Self::SEGMENT_COLOR;
        }
        bits
    }

    /// Inverse of [`StageFeatures::bits`]; unknown bits are ignored.
    pub fn from_bits(bits: u32) -> Self {
        Self {
            wrap: bits & Self::WRAP != 0,
            flatten: bits & Self::FLATTEN != 0,
            fine_offset: bits & Self::FINE_OFFSET != 0,
            uv_remap: bits & Self::UV_REMAP != 0,
            seam_blend: bits & Self::SEAM_BLEND != 0,
            label: bits & Self::LABEL != 0,
            segment_color: bits & Self::SEGMENT_COLOR != 0,
        }
    }

    /// Tile kind implied by the label flag.
    pub fn tile_kind(&self) -> TileKind {
        if self.label { TileKind::Label } else { TileKind::Color }
    }
}

/// What a tile's colour field holds, which decides its discard threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Photographic colour; fragments with alpha below 0.01 are dropped.
    Color,
    /// Ink label mask; fragments whose label channel is below 0.5 are dropped.
    Label,
}

impl TileKind {
    /// Visibility threshold below which a fragment is discarded.
    pub fn discard_threshold(&self) -> f32 {
        match self {
            TileKind::Color => 0.01,
            TileKind::Label => 0.5,
        }
    }
}

/// Fixed decoding of the position field into physical space, plus the axes
/// the roll and unroll happen around.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceDecode {
    /// Normalized field value mapped to the origin.
    pub center: Vec3,
    /// Physical extent of the unit field cube along each axis, in grid axis
    /// units. The default of 1 suits a unit grid; a pixel-width grid needs
    /// the scan's size in pixels here.
    pub extent: Vec3,
    /// Axis the rolled surface is rotated around (unit length).
    pub roll_axis: Vec3,
    /// Direction of the unrolled strip (unit length).
    pub unrolled_axis: Vec3,
    /// Direction of the constant anti z-fighting offset (unit length).
    pub normal_axis: Vec3,
    /// Length of the constant offset along `normal_axis`.
    pub normal_offset: f32,
    /// Width `ε` of the rolled/flat transition band.
    pub transition_width: f32,
}

impl Default for SurfaceDecode {
    fn default() -> Self {
        Self {
            center: Vec3::splat(0.5),
            extent: Vec3::splat(1.0),
            roll_axis: Vec3::Y,
            unrolled_axis: Vec3::X,
            normal_axis: Vec3::Z,
            normal_offset: 0.001,
            transition_width: 0.02,
        }
    }
}

impl SurfaceDecode {
    /// Copy with every axis normalized and the transition width kept positive.
    pub fn normalized(mut self) -> Self {
        self.roll_axis = self.roll_axis.normalize_or(Vec3::Y);
        self.unrolled_axis = self.unrolled_axis.normalize_or(Vec3::X);
        self.normal_axis = self.normal_axis.normalize_or(Vec3::Z);
        if self.transition_width.is_nan() || self.transition_width <= 0.0 {
            self.transition_width = SurfaceDecode::default().transition_width;
        }
        self
    }
}

/// Per-frame values pushed by the navigation collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct SurfaceParams {
    /// Current wrap index.
    pub wrap: f32,
    /// Physical offset of `wrap` on the grid axis.
    pub wrap_position: f32,
    /// User flatten override in `[0, 1]`; 0 keeps the computed weight.
    pub flatten: f32,
}

/// Per-tile seam blend targets: the neighbour's edge value at each seam.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeamTargets {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for SeamTargets {
    /// Nominal seam values: a left neighbour meets this tile at its own
    /// `u = 1`, a right neighbour at `u = 0`, likewise for top and bottom.
    fn default() -> Self {
        Self {
            left: 1.0,
            right: 0.0,
            top: 1.0,
            bottom: 0.0,
        }
    }
}

impl SeamTargets {
    pub fn to_vec4(&self) -> Vec4 {
        Vec4::new(self.left, self.right, self.top, self.bottom)
    }
}

/// Hermite smoothstep matching WGSL `smoothstep(edge0, edge1, x)`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_bits_round_trip() {
        let features = StageFeatures {
            wrap: true,
            flatten: false,
            fine_offset: true,
            uv_remap: false,
            seam_blend: true,
            label: true,
            segment_color: true,
        };
        let bits = features.bits();
        assert_eq!(bits, 0b1110101);
        assert_eq!(StageFeatures::from_bits(bits), features);
    }

    #[test]
    fn test_tile_kind_thresholds() {
        assert_eq!(TileKind::Color.discard_threshold(), 0.01);
        assert_eq!(TileKind::Label.discard_threshold(), 0.5);
        let label = StageFeatures { label: true, ..Default::default() };
        assert_eq!(label.tile_kind(), TileKind::Label);
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_decode_normalized_repairs_axes() {
        let decode = SurfaceDecode {
            roll_axis: Vec3::new(0.0, 0.0, 4.0),
            unrolled_axis: Vec3::ZERO,
            transition_width: 0.0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(decode.roll_axis, Vec3::Z);
        assert_eq!(decode.unrolled_axis, Vec3::X);
        assert_eq!(decode.transition_width, 0.02);
    }
}
