//! Sampled Fields
//!
//! CPU-side 2-D fields addressed by normalized coordinates. Sampling is
//! nearest-neighbour with clamp-to-edge addressing, identical to the
//! `textureLoad` lookups in the GPU stage:
//!
//! ```text
//! texel.x = clamp(floor(u * width),  0, width  - 1)
//! texel.y = clamp(floor(v * height), 0, height - 1)
//! ```
//!
//! No interpolation is ever applied so encoded integer values survive intact.

use glam::{Vec2, Vec4};

/// Scale of the fine-offset field relative to the coarse field.
pub const FINE_SCALE: f32 = 255.0;

/// RGBA field with channels normalized to `[0, 1]`, row-major, row 0 at `v = 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceField {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
}

impl SurfaceField {
    /// Build from RGBA8 bytes (`width * height * 4` long).
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || bytes.len() != expected {
            return None;
        }
        let texels = bytes
            .chunks_exact(4)
            .map(|px| {
                Vec4::new(
                    px[0] as f32 / 255.0,
                    px[1] as f32 / 255.0,
                    px[2] as f32 / 255.0,
                    px[3] as f32 / 255.0,
                )
            })
            .collect();
        Some(Self {
            width,
            height,
            texels,
        })
    }

    /// Build by evaluating `f(x, y)` for every texel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Vec4) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut texels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                texels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            texels,
        }
    }

    /// 1x1 field holding a single value.
    pub fn constant(value: Vec4) -> Self {
        Self {
            width: 1,
            height: 1,
            texels: vec![value],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texel addressed by `uv` under the clamp-to-edge nearest policy.
    pub fn texel_coords(&self, uv: Vec2) -> (u32, u32) {
        (
            nearest_index(uv.x, self.width),
            nearest_index(uv.y, self.height),
        )
    }

    /// Sample the field at normalized coordinates.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let (x, y) = self.texel_coords(uv);
        self.texels[(y * self.width + x) as usize]
    }

    /// Raw texels, row-major.
    pub fn texels(&self) -> &[Vec4] {
        &self.texels
    }

    /// Quantize back to RGBA8 for GPU upload.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.texels
            .iter()
            .flat_map(|t| {
                t.to_array()
                    .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
            })
            .collect()
    }
}

fn nearest_index(coord: f32, size: u32) -> u32 {
    if !coord.is_finite() {
        return 0;
    }
    let scaled = (coord * size as f32).floor();
    scaled.clamp(0.0, (size - 1) as f32) as u32
}

/// A coarse field with an optional co-registered fine-offset field.
///
/// The fine field stores a fractional correction scaled by [`FINE_SCALE`],
/// extending the precision of the 8-bit coarse field.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedField {
    pub coarse: SurfaceField,
    pub fine: Option<SurfaceField>,
}

impl EncodedField {
    pub fn new(coarse: SurfaceField, fine: Option<SurfaceField>) -> Self {
        Self { coarse, fine }
    }

    /// Decode `coarse + fine / 255`, ignoring the fine field when
    /// `use_fine` is false or no fine field is present.
    pub fn decode(&self, uv: Vec2, use_fine: bool) -> Vec4 {
        let coarse = self.coarse.sample(uv);
        match (&self.fine, use_fine) {
            (Some(fine), true) => coarse + fine.sample(uv) / FINE_SCALE,
            _ => coarse,
        }
    }
}

/// Four decoded edge proximities of one sample, `1` at the edge.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct EdgeSample {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl EdgeSample {
    /// Decode stored channels, which hold `1 - proximity`.
    pub fn from_channels(channels: Vec4) -> Self {
        Self {
            left: 1.0 - channels.x,
            right: 1.0 - channels.y,
            top: 1.0 - channels.z,
            bottom: 1.0 - channels.w,
        }
    }

    /// Far from every edge.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Edge-distance field of one tile (channels: left, right, top, bottom).
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeDistanceField {
    field: SurfaceField,
}

impl EdgeDistanceField {
    pub fn new(field: SurfaceField) -> Self {
        Self { field }
    }

    /// Field whose every sample is far from all edges.
    pub fn far() -> Self {
        Self::new(SurfaceField::constant(Vec4::ONE))
    }

    pub fn field(&self) -> &SurfaceField {
        &self.field
    }

    pub fn sample(&self, uv: Vec2) -> EdgeSample {
        EdgeSample::from_channels(self.field.sample(uv))
    }
}
