//! Shader Source
//!
//! WGSL source of the strip stage pair. `vs_main` is the GPU form of
//! [`crate::strip::SurfaceTransform`], `fs_main` of
//! [`crate::strip::SeamBlend`]; both read fields with clamped `textureLoad`
//! so results match the CPU reference texel for texel.

/// Entry point of the per-vertex stage
pub const VERTEX_ENTRY: &str = "vs_main";
/// Entry point of the per-fragment stage
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Strip shader: surface reconstruction, wrap blend and seam blend
pub const SHADER_SOURCE: &str = r#"
struct ChunkUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    roll_axis: vec3<f32>,
    wrap: f32,
    unrolled_axis: vec3<f32>,
    wrap_position: f32,
    normal_axis: vec3<f32>,
    normal_offset: f32,
    decode_center: vec3<f32>,
    transition_width: f32,
    decode_extent: vec3<f32>,
    flatten: f32,
    seam_targets: vec4<f32>,
    features: u32,
    discard_threshold: f32,
    degenerate_epsilon: f32,
    _pad: u32,
}

const FEATURE_WRAP: u32 = 1u;
const FEATURE_FLATTEN: u32 = 2u;
const FEATURE_FINE_OFFSET: u32 = 4u;
const FEATURE_UV_REMAP: u32 = 8u;
const FEATURE_SEAM_BLEND: u32 = 16u;
const FEATURE_LABEL: u32 = 32u;
const FEATURE_SEGMENT_COLOR: u32 = 64u;

const FINE_SCALE: f32 = 255.0;
const TAU: f32 = 6.283185307179586;

@group(0) @binding(0) var<uniform> chunk: ChunkUniforms;
@group(0) @binding(1) var position_coarse: texture_2d<f32>;
@group(0) @binding(2) var position_fine: texture_2d<f32>;
@group(0) @binding(3) var uv_coarse: texture_2d<f32>;
@group(0) @binding(4) var uv_fine: texture_2d<f32>;
@group(0) @binding(5) var edge_distance: texture_2d<f32>;
@group(0) @binding(6) var color_field: texture_2d<f32>;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

fn has_feature(flag: u32) -> bool {
    return (chunk.features & flag) != 0u;
}

// Nearest texel, clamp-to-edge
fn load_nearest(tex: texture_2d<f32>, uv: vec2<f32>) -> vec4<f32> {
    let size = vec2<f32>(textureDimensions(tex, 0));
    let texel = clamp(floor(uv * size), vec2<f32>(0.0), size - vec2<f32>(1.0));
    return textureLoad(tex, vec2<i32>(texel), 0);
}

fn decode_field(coarse: texture_2d<f32>, fine: texture_2d<f32>, uv: vec2<f32>) -> vec4<f32> {
    var value = load_nearest(coarse, uv);
    if (has_feature(FEATURE_FINE_OFFSET)) {
        value = value + load_nearest(fine, uv) / FINE_SCALE;
    }
    return value;
}

// Rodrigues rotation of v about a unit axis
fn rotate_about(v: vec3<f32>, axis: vec3<f32>, angle: f32) -> vec3<f32> {
    let c = cos(angle);
    let s = sin(angle);
    return v * c + cross(axis, v) * s + axis * dot(axis, v) * (1.0 - c);
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var seg_uv = in.uv;
    if (has_feature(FEATURE_UV_REMAP)) {
        seg_uv = decode_field(uv_coarse, uv_fine, in.uv).xy;
    }

    let p = decode_field(position_coarse, position_fine, seg_uv).xyz;
    var rolled = (p - chunk.decode_center) * chunk.decode_extent;
    if (has_feature(FEATURE_WRAP)) {
        rolled = rotate_about(rolled, chunk.roll_axis, chunk.wrap * TAU)
            + chunk.unrolled_axis * chunk.wrap_position;
    }
    rolled = rolled + chunk.normal_axis * chunk.normal_offset;

    let flat_pos = (chunk.model * vec4<f32>(in.position, 1.0)).xyz;

    var t = 1.0;
    if (has_feature(FEATURE_WRAP)) {
        t = 1.0 - smoothstep(chunk.wrap_position - chunk.transition_width, chunk.wrap_position, flat_pos.x);
    }
    if (has_feature(FEATURE_FLATTEN)) {
        t = t * (1.0 - clamp(chunk.flatten, 0.0, 1.0));
    }
    t = clamp(t, 0.0, 1.0);

    let world = rolled * t + flat_pos * (1.0 - t);

    var out: VertexOutput;
    out.clip_position = chunk.view_proj * vec4<f32>(world, 1.0);
    out.uv = in.uv;
    return out;
}

fn blend_axis(x: f32, near: f32, far: f32, u_near: f32, u_far: f32) -> f32 {
    let inner = 1.0 - near - far;
    let num = inner * x + near * u_near + near * far * (u_near - u_far);
    let den = inner + near * u_near + far * u_far;
    if (!(abs(den) >= chunk.degenerate_epsilon)) {
        return x;
    }
    return num / den;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var coord = in.uv;
    if (has_feature(FEATURE_SEAM_BLEND)) {
        // stored channels hold 1 - proximity
        let e = vec4<f32>(1.0) - load_nearest(edge_distance, in.uv);
        let targets = chunk.seam_targets;
        coord = vec2<f32>(
            blend_axis(in.uv.x, e.x, e.y, targets.x, targets.y),
            blend_axis(in.uv.y, e.z, e.w, targets.z, targets.w),
        );
    }

    // segment-wide fields are addressed in segment space
    if (has_feature(FEATURE_SEGMENT_COLOR) && has_feature(FEATURE_UV_REMAP)) {
        coord = decode_field(uv_coarse, uv_fine, coord).xy;
    }

    let color = load_nearest(color_field, coord);
    if (has_feature(FEATURE_LABEL)) {
        if (color.r < chunk.discard_threshold) {
            discard;
        }
        return vec4<f32>(color.rgb, 1.0);
    }
    if (color.a < chunk.discard_threshold) {
        discard;
    }
    return color;
}
"#;
