//! Surface Transform (per-vertex stage)
//!
//! CPU reference of `vs_main` in [`crate::render::shader`]. For every
//! reference-mesh vertex it:
//!
//! 1. resolves the segment coordinate (optionally through the chunk UV field),
//! 2. decodes the true surface point from the coarse + fine position fields,
//! 3. rotates it about the roll axis by `wrap * 2π` and shifts it by
//!    `wrap_position` along the unrolled axis,
//! 4. blends it with the flat layout position using a smoothstep weight
//!    centred on the unroll boundary.
//!
//! Every step is a total function; out-of-range field coordinates are clamped
//! by the sampling policy of [`super::field`].

use std::f32::consts::TAU;

use glam::{Mat4, Quat, Vec2, Vec3, Vec4Swizzles};

use super::field::EncodedField;
use super::stage::{StageFeatures, SurfaceDecode, SurfaceParams, smoothstep};

/// One vertex of the flat reference mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceVertex {
    /// Position in the unit reference plane.
    pub position: Vec3,
    /// Chunk-local normalized texture coordinate.
    pub uv: Vec2,
}

/// Fields a chunk's vertices are decoded from.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceSampler<'a> {
    /// Segment position field (coarse + fine).
    pub position: &'a EncodedField,
    /// Chunk UV field mapping chunk UVs into segment UVs.
    pub uv: Option<&'a EncodedField>,
}

/// Output of the per-vertex stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformedVertex {
    /// Blended world-space position.
    pub position: Vec3,
    /// `view_proj * position`.
    pub clip: glam::Vec4,
    /// Pass-through texture coordinate.
    pub uv: Vec2,
    /// Interpolation weight `t`: 1 fully rolled, 0 fully flat.
    pub weight: f32,
}

/// Parameterized per-vertex stage.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceTransform {
    features: StageFeatures,
    decode: SurfaceDecode,
}

impl SurfaceTransform {
    pub fn new(features: StageFeatures, decode: SurfaceDecode) -> Self {
        Self {
            features,
            decode: decode.normalized(),
        }
    }

    pub fn features(&self) -> StageFeatures {
        self.features
    }

    pub fn decode(&self) -> &SurfaceDecode {
        &self.decode
    }

    /// Segment-space coordinate for a chunk-local `uv`.
    pub fn segment_uv(&self, uv: Vec2, sampler: &SurfaceSampler<'_>) -> Vec2 {
        match (self.features.uv_remap, sampler.uv) {
            (true, Some(field)) => field.decode(uv, self.features.fine_offset).xy(),
            _ => uv,
        }
    }

    /// Reconstructed 3D surface point before any wrap motion.
    pub fn reconstruct(&self, uv: Vec2, sampler: &SurfaceSampler<'_>) -> Vec3 {
        let seg_uv = self.segment_uv(uv, sampler);
        let p = sampler.position.decode(seg_uv, self.features.fine_offset).xyz();
        (p - self.decode.center) * self.decode.extent
    }

    /// Apply the roll rotation and unroll translation for this frame.
    pub fn wrap_point(&self, point: Vec3, params: &SurfaceParams) -> Vec3 {
        if !self.features.wrap {
            return point;
        }
        let rotation = Quat::from_axis_angle(self.decode.roll_axis, params.wrap * TAU);
        rotation * point + self.decode.unrolled_axis * params.wrap_position
    }

    /// Rolled/flat interpolation weight for a flat-layout x coordinate.
    ///
    /// Always in `[0, 1]`.
    pub fn weight(&self, flat_x: f32, params: &SurfaceParams) -> f32 {
        let mut t = if self.features.wrap {
            let edge1 = params.wrap_position;
            let edge0 = edge1 - self.decode.transition_width;
            1.0 - smoothstep(edge0, edge1, flat_x)
        } else {
            1.0
        };
        if self.features.flatten {
            let flatten = if params.flatten.is_finite() {
                params.flatten.clamp(0.0, 1.0)
            } else {
                0.0
            };
            t *= 1.0 - flatten;
        }
        t.clamp(0.0, 1.0)
    }

    /// Run the full per-vertex stage.
    pub fn apply(
        &self,
        vertex: &ReferenceVertex,
        sampler: &SurfaceSampler<'_>,
        params: &SurfaceParams,
        model: Mat4,
        view_proj: Mat4,
    ) -> TransformedVertex {
        let rolled = self.wrap_point(self.reconstruct(vertex.uv, sampler), params)
            + self.decode.normal_axis * self.decode.normal_offset;
        let flat = model.transform_point3(vertex.position);
        let t = self.weight(flat.x, params);
        let position = rolled * t + flat * (1.0 - t);

        TransformedVertex {
            position,
            clip: view_proj * position.extend(1.0),
            uv: vertex.uv,
            weight: t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::field::SurfaceField;
    use glam::Vec4;

    fn flat_position_field() -> EncodedField {
        // x follows u, y follows v, z constant 0.5
        EncodedField::new(
            SurfaceField::from_fn(16, 16, |x, y| {
                Vec4::new(x as f32 / 15.0, y as f32 / 15.0, 0.5, 1.0)
            }),
            None,
        )
    }

    #[test]
    fn test_reconstruct_recenters_and_scales() {
        let field = flat_position_field();
        let sampler = SurfaceSampler { position: &field, uv: None };
        let decode = SurfaceDecode {
            extent: Vec3::new(2.0, 4.0, 1.0),
            ..Default::default()
        };
        let stage = SurfaceTransform::new(StageFeatures::reconstruction_only(), decode);
        let p = stage.reconstruct(Vec2::new(1.0, 0.0), &sampler);
        assert!((p.x - 1.0).abs() < 1e-5);
        assert!((p.y - (-2.0)).abs() < 1e-5);
        assert!(p.z.abs() < 1e-5);
    }

    #[test]
    fn test_wrap_rotates_full_turn_per_unit() {
        let stage = SurfaceTransform::new(StageFeatures::default(), SurfaceDecode::default());
        let params = SurfaceParams { wrap: 1.0, wrap_position: 3.0, flatten: 0.0 };
        let p = stage.wrap_point(Vec3::new(1.0, 0.0, 0.0), &params);
        assert!((p - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);

        let quarter = SurfaceParams { wrap: 0.25, wrap_position: 0.0, flatten: 0.0 };
        let q = stage.wrap_point(Vec3::new(1.0, 0.0, 0.0), &quarter);
        // +x turns towards -z about the vertical roll axis
        assert!((q - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_weight_is_rolled_left_and_flat_right() {
        let stage = SurfaceTransform::new(StageFeatures::default(), SurfaceDecode::default());
        let params = SurfaceParams { wrap: 0.3, wrap_position: -10.0, flatten: 0.0 };
        assert_eq!(stage.weight(-20.0, &params), 1.0);
        assert_eq!(stage.weight(0.0, &params), 0.0);
        let mid = stage.weight(-10.01, &params);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_flatten_override_forces_flat() {
        let stage = SurfaceTransform::new(StageFeatures::default(), SurfaceDecode::default());
        let params = SurfaceParams { wrap: 0.3, wrap_position: 0.0, flatten: 1.0 };
        assert_eq!(stage.weight(-5.0, &params), 0.0);
        let half = SurfaceParams { flatten: 0.5, ..params };
        assert!((stage.weight(-5.0, &half) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_without_wrap_weight_is_one() {
        let stage = SurfaceTransform::new(StageFeatures::reconstruction_only(), SurfaceDecode::default());
        let params = SurfaceParams { wrap: 0.7, wrap_position: -100.0, flatten: 1.0 };
        assert_eq!(stage.weight(50.0, &params), 1.0);
    }

    #[test]
    fn test_apply_fully_flat_returns_model_position() {
        let field = flat_position_field();
        let sampler = SurfaceSampler { position: &field, uv: None };
        let stage = SurfaceTransform::new(StageFeatures::default(), SurfaceDecode::default());
        let params = SurfaceParams { wrap: 0.0, wrap_position: -100.0, flatten: 0.0 };
        let model = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let vertex = ReferenceVertex { position: Vec3::new(0.25, 0.1, 0.0), uv: Vec2::new(0.75, 0.6) };

        let out = stage.apply(&vertex, &sampler, &params, model, Mat4::IDENTITY);
        assert_eq!(out.weight, 0.0);
        assert!((out.position - Vec3::new(5.25, 0.1, 0.0)).length() < 1e-5);
        assert_eq!(out.uv, vertex.uv);
        assert_eq!(out.clip, out.position.extend(1.0));
    }
}
