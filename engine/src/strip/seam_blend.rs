//! Seam Blend (per-fragment stage)
//!
//! CPU reference of `fs_main` in [`crate::render::shader`]. Near a border
//! shared with a neighbour, sampling the colour field at the raw fragment
//! coordinate counts the overlap band twice. The rational blend below remaps
//! the coordinate so both tiles agree across the seam:
//!
//! ```text
//! num = (1 - a - b) * x + a * u_near + a * b * (u_near - u_far)
//! den =  1 - a - b      + a * u_near + b * u_far
//! r   = num / den
//! ```
//!
//! with `a`, `b` the near/far edge proximities. Far from both edges `r = x`;
//! at the near edge `r` no longer depends on `x`. The vertical axis uses the
//! same expression with top/bottom and `y`.
//!
//! A vanishing denominator resolves to the input coordinate.
//!
//! The resolved coordinate is chunk-local. A per-chunk colour tile is sampled
//! there directly; a segment-wide colour or label field is sampled at the
//! segment position the chunk UV field decodes from it.

use glam::{Vec2, Vec4, Vec4Swizzles};

use super::field::{EdgeDistanceField, EdgeSample, EncodedField, SurfaceField};
use super::stage::{SeamTargets, StageFeatures, TileKind};
use crate::error::StripError;

/// Denominator magnitude below which the blend is treated as degenerate.
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// Field a chunk's fragments take their colour from.
#[derive(Clone, Copy, Debug)]
pub enum ColorSource<'a> {
    /// Colour tile of the chunk itself, addressed by the chunk coordinate.
    Tile(&'a SurfaceField),
    /// Colour or label field of the whole segment, addressed through the
    /// chunk's UV field.
    Segment {
        field: &'a SurfaceField,
        uv: &'a EncodedField,
    },
}

impl ColorSource<'_> {
    pub fn is_segment(&self) -> bool {
        matches!(self, ColorSource::Segment { .. })
    }
}

/// Parameterized per-fragment stage.
#[derive(Clone, Copy, Debug)]
pub struct SeamBlend {
    features: StageFeatures,
    epsilon: f32,
}

impl SeamBlend {
    pub fn new(features: StageFeatures) -> Self {
        Self::with_epsilon(features, DEGENERATE_EPSILON)
    }

    pub fn with_epsilon(features: StageFeatures, epsilon: f32) -> Self {
        Self {
            features,
            epsilon: epsilon.abs(),
        }
    }

    pub fn tile_kind(&self) -> TileKind {
        self.features.tile_kind()
    }

    /// Blend one axis.
    ///
    /// `near`/`far` are the proximities of the edge whose target is
    /// `u_near`/`u_far` (left/right horizontally, top/bottom vertically).
    pub fn blend_axis(
        &self,
        x: f32,
        near: f32,
        far: f32,
        u_near: f32,
        u_far: f32,
    ) -> Result<f32, StripError> {
        let inner = 1.0 - near - far;
        let num = inner * x + near * u_near + near * far * (u_near - u_far);
        let den = inner + near * u_near + far * u_far;
        if !(den.abs() >= self.epsilon) {
            return Err(StripError::DegenerateBlend { denominator: den });
        }
        Ok(num / den)
    }

    /// Remapped sampling coordinate for one fragment.
    ///
    /// Degenerate axes keep the input coordinate; this path never fails.
    pub fn resolve(&self, coord: Vec2, edge: EdgeSample, targets: &SeamTargets) -> Vec2 {
        if !self.features.seam_blend {
            return coord;
        }
        let r = self
            .blend_axis(coord.x, edge.left, edge.right, targets.left, targets.right)
            .unwrap_or(coord.x);
        let s = self
            .blend_axis(coord.y, edge.top, edge.bottom, targets.top, targets.bottom)
            .unwrap_or(coord.y);
        Vec2::new(r, s)
    }

    /// Sample `source` at a resolved chunk coordinate.
    pub fn sample(&self, resolved: Vec2, source: ColorSource<'_>) -> Vec4 {
        match source {
            ColorSource::Tile(field) => field.sample(resolved),
            ColorSource::Segment { field, uv } => {
                let at = if self.features.uv_remap {
                    uv.decode(resolved, self.features.fine_offset).xy()
                } else {
                    resolved
                };
                field.sample(at)
            }
        }
    }

    /// Resolve and sample the colour source; `None` when the fragment is
    /// discarded by the tile kind's visibility threshold.
    pub fn shade(
        &self,
        coord: Vec2,
        edges: &EdgeDistanceField,
        source: ColorSource<'_>,
        targets: &SeamTargets,
    ) -> Option<Vec4> {
        let resolved = self.resolve(coord, edges.sample(coord), targets);
        let texel = self.sample(resolved, source);
        match self.tile_kind() {
            TileKind::Color => {
                (texel.w >= TileKind::Color.discard_threshold()).then_some(texel)
            }
            TileKind::Label => {
                (texel.x >= TileKind::Label.discard_threshold()).then(|| texel.truncate().extend(1.0))
            }
        }
    }
}
