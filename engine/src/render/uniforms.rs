//! Uniform Structs for GPU Shaders
//!
//! GPU-compatible uniform record consumed by the strip stage pair. Must match
//! the `ChunkUniforms` struct in [`super::shader::SHADER_SOURCE`] exactly.

use glam::Mat4;

use crate::strip::{
    ChunkPlacement, DEGENERATE_EPSILON, SeamTargets, StageFeatures, SurfaceDecode, SurfaceParams,
};

/// Per-chunk uniforms for `vs_main` / `fs_main`.
///
/// WGSL uniform layout (240 bytes total, every vec3 shares its 16-byte slot
/// with the scalar that follows it):
///   offset   0: view_proj (mat4x4<f32>)         = 64 bytes
///   offset  64: model (mat4x4<f32>)             = 64 bytes
///   offset 128: roll_axis (vec3<f32>)           = 12 bytes
///   offset 140: wrap (f32)                      = 4 bytes
///   offset 144: unrolled_axis (vec3<f32>)       = 12 bytes
///   offset 156: wrap_position (f32)             = 4 bytes
///   offset 160: normal_axis (vec3<f32>)         = 12 bytes
///   offset 172: normal_offset (f32)             = 4 bytes
///   offset 176: decode_center (vec3<f32>)       = 12 bytes
///   offset 188: transition_width (f32)          = 4 bytes
///   offset 192: decode_extent (vec3<f32>)       = 12 bytes
///   offset 204: flatten (f32)                   = 4 bytes
///   offset 208: seam_targets (vec4<f32>)        = 16 bytes (left, right, top, bottom)
///   offset 224: features (u32)                  = 4 bytes
///   offset 228: discard_threshold (f32)         = 4 bytes
///   offset 232: degenerate_epsilon (f32)        = 4 bytes
///   offset 236: _pad (u32)                      = 4 bytes
///   Total: 240 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ChunkUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub roll_axis: [f32; 3],
    /// Current wrap index
    pub wrap: f32,
    pub unrolled_axis: [f32; 3],
    /// Physical offset of the wrap on the grid axis
    pub wrap_position: f32,
    pub normal_axis: [f32; 3],
    pub normal_offset: f32,
    pub decode_center: [f32; 3],
    pub transition_width: f32,
    pub decode_extent: [f32; 3],
    /// User flatten override in [0, 1]
    pub flatten: f32,
    pub seam_targets: [f32; 4],
    /// `StageFeatures::bits()`
    pub features: u32,
    pub discard_threshold: f32,
    pub degenerate_epsilon: f32,
    pub _pad: u32,
}

static_assertions::assert_eq_size!(ChunkUniforms, [u8; 240]);

impl Default for ChunkUniforms {
    fn default() -> Self {
        Self::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            StageFeatures::default(),
            &SurfaceDecode::default(),
            &SeamTargets::default(),
        )
    }
}

impl ChunkUniforms {
    /// Build the static part of a chunk's uniforms; frame values start at 0.
    pub fn new(
        view_proj: Mat4,
        model: Mat4,
        features: StageFeatures,
        decode: &SurfaceDecode,
        targets: &SeamTargets,
    ) -> Self {
        let decode = decode.normalized();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            roll_axis: decode.roll_axis.to_array(),
            wrap: 0.0,
            unrolled_axis: decode.unrolled_axis.to_array(),
            wrap_position: 0.0,
            normal_axis: decode.normal_axis.to_array(),
            normal_offset: decode.normal_offset,
            decode_center: decode.center.to_array(),
            transition_width: decode.transition_width,
            decode_extent: decode.extent.to_array(),
            flatten: 0.0,
            seam_targets: targets.to_vec4().to_array(),
            features: features.bits(),
            discard_threshold: features.tile_kind().discard_threshold(),
            degenerate_epsilon: DEGENERATE_EPSILON,
            _pad: 0,
        }
    }

    /// Uniforms for a placed chunk.
    pub fn for_placement(
        view_proj: Mat4,
        placement: &ChunkPlacement,
        features: StageFeatures,
        decode: &SurfaceDecode,
        targets: &SeamTargets,
    ) -> Self {
        Self::new(view_proj, placement.model_matrix(), features, decode, targets)
    }

    /// Apply this frame's navigation values.
    pub fn set_frame(&mut self, params: &SurfaceParams) {
        self.wrap = params.wrap;
        self.wrap_position = params.wrap_position;
        self.flatten = params.flatten;
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
