//! Surface Transform Tests - Reconstruction, Roll and Rolled/Flat Blend

use glam::{Mat4, Vec2, Vec3, Vec4};
use scroll_unroll_engine::strip::{
    EncodedField, ReferenceVertex, StageFeatures, SurfaceDecode, SurfaceField, SurfaceParams,
    SurfaceSampler, SurfaceTransform,
};

const EPS: f32 = 1e-4;

/// Position field whose x channel follows u and y channel follows v.
fn ramp_field() -> EncodedField {
    EncodedField::new(
        SurfaceField::from_fn(16, 16, |x, y| Vec4::new(x as f32 / 15.0, y as f32 / 15.0, 0.5, 1.0)),
        None,
    )
}

fn features(wrap: bool, flatten: bool, uv_remap: bool) -> StageFeatures {
    StageFeatures {
        wrap,
        flatten,
        uv_remap,
        ..StageFeatures::default()
    }
}

// ============================================================================
// Reconstruction
// ============================================================================

#[test]
fn test_uv_field_remaps_segment_coordinate() {
    let position = ramp_field();
    // mirror u: chunk u maps to segment 1 - u
    let mirror = EncodedField::new(
        SurfaceField::from_fn(16, 16, |x, y| Vec4::new(1.0 - x as f32 / 15.0, y as f32 / 15.0, 0.0, 1.0)),
        None,
    );
    let sampler = SurfaceSampler { position: &position, uv: Some(&mirror) };
    let uv = Vec2::new(0.0, 0.5);

    let remapped = SurfaceTransform::new(features(false, false, true), SurfaceDecode::default());
    assert!((remapped.reconstruct(uv, &sampler).x - 0.5).abs() < EPS);

    let direct = SurfaceTransform::new(features(false, false, false), SurfaceDecode::default());
    assert!((direct.reconstruct(uv, &sampler).x + 0.5).abs() < EPS);
}

#[test]
fn test_fine_offset_refines_coarse_value() {
    let field = EncodedField::new(
        SurfaceField::constant(Vec4::new(0.5, 0.5, 0.5, 1.0)),
        Some(SurfaceField::constant(Vec4::new(1.0, 0.0, 0.0, 0.0))),
    );
    let sampler = SurfaceSampler { position: &field, uv: None };

    let with_fine = SurfaceTransform::new(StageFeatures::reconstruction_only(), SurfaceDecode::default());
    let p = with_fine.reconstruct(Vec2::splat(0.5), &sampler);
    assert!((p.x - 1.0 / 255.0).abs() < 1e-6);

    let coarse_only = SurfaceTransform::new(
        StageFeatures { fine_offset: false, ..StageFeatures::reconstruction_only() },
        SurfaceDecode::default(),
    );
    assert_eq!(coarse_only.reconstruct(Vec2::splat(0.5), &sampler).x, 0.0);
}

#[test]
fn test_out_of_range_uv_is_clamped() {
    let field = ramp_field();
    let sampler = SurfaceSampler { position: &field, uv: None };
    let stage = SurfaceTransform::new(StageFeatures::reconstruction_only(), SurfaceDecode::default());
    let inside = stage.reconstruct(Vec2::new(1.0, 1.0), &sampler);
    let outside = stage.reconstruct(Vec2::new(3.0, 9.0), &sampler);
    assert_eq!(inside, outside);
}

// ============================================================================
// Rolled / Flat Blend
// ============================================================================

#[test]
fn test_weight_is_monotone_across_transition() {
    let stage = SurfaceTransform::new(features(true, true, true), SurfaceDecode::default());
    let params = SurfaceParams { wrap: 1.5, wrap_position: -60.0, flatten: 0.0 };
    let width = stage.decode().transition_width;

    assert_eq!(stage.weight(-60.0 - width, &params), 1.0);
    assert_eq!(stage.weight(-60.0, &params), 0.0);
    let mut prev = 1.0;
    for i in 0..=20 {
        let x = -60.0 - width + width * i as f32 / 20.0;
        let t = stage.weight(x, &params);
        assert!((0.0..=1.0).contains(&t));
        assert!(t <= prev + 1e-6);
        prev = t;
    }
}

#[test]
fn test_fully_rolled_vertex_follows_reconstruction() {
    let field = ramp_field();
    let sampler = SurfaceSampler { position: &field, uv: None };
    let decode = SurfaceDecode::default();
    let stage = SurfaceTransform::new(features(true, false, false), decode);
    let params = SurfaceParams { wrap: 0.0, wrap_position: 100.0, flatten: 0.0 };
    let vertex = ReferenceVertex { position: Vec3::new(0.5, 0.5, 0.0), uv: Vec2::new(1.0, 0.0) };

    let out = stage.apply(&vertex, &sampler, &params, Mat4::IDENTITY, Mat4::IDENTITY);
    assert_eq!(out.weight, 1.0);
    let expected = Vec3::new(0.5, -0.5, 0.0) + Vec3::X * 100.0 + decode.normal_axis * decode.normal_offset;
    assert!((out.position - expected).length() < EPS, "got {:?}", out.position);
}

#[test]
fn test_flatten_one_lays_every_vertex_flat() {
    let field = ramp_field();
    let sampler = SurfaceSampler { position: &field, uv: None };
    let stage = SurfaceTransform::new(StageFeatures::default(), SurfaceDecode::default());
    let params = SurfaceParams { wrap: 0.8, wrap_position: 40.0, flatten: 1.0 };
    let model = Mat4::from_scale_rotation_translation(
        Vec3::new(100.0, 80.0, 1.0),
        glam::Quat::IDENTITY,
        Vec3::new(-30.0, 0.0, 0.0),
    );

    for (x, y) in [(-0.5, 0.5), (0.0, 0.0), (0.5, -0.5)] {
        let vertex = ReferenceVertex { position: Vec3::new(x, y, 0.0), uv: Vec2::new(x + 0.5, 0.5 - y) };
        let out = stage.apply(&vertex, &sampler, &params, model, Mat4::IDENTITY);
        assert_eq!(out.weight, 0.0);
        assert!((out.position - model.transform_point3(vertex.position)).length() < EPS);
    }
}

#[test]
fn test_half_turn_reverses_unrolled_axis() {
    let stage = SurfaceTransform::new(features(true, false, true), SurfaceDecode::default());
    let params = SurfaceParams { wrap: 0.5, wrap_position: 0.0, flatten: 0.0 };
    let p = stage.wrap_point(Vec3::new(0.3, 0.2, 0.0), &params);
    assert!((p - Vec3::new(-0.3, 0.2, 0.0)).length() < EPS);
}
