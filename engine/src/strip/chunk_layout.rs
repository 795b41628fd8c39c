//! Chunk Layout
//!
//! Places each chunk of a segment on the grid axis so that the chunks'
//! visible (non-overlap) regions tile the axis with no gap and no double
//! coverage.
//!
//! Conventions:
//! - A chunk's local `+u` runs along world `+x`. Its left margin `l` is the
//!   `u = 0` side, its right margin `r` the `u = 1` side.
//! - Cell `c` covers the physical interval `[offset[c+1], offset[c]]`.
//! - Middle chunks are stretched so their visible width equals the cell
//!   width. First/last chunks keep their natural size and anchor the visible
//!   edge that faces their neighbour to the shared cell boundary.

use glam::{Mat4, Vec3};

use super::grid_axis::GridAxis;
use crate::error::StripError;

/// Declared geometry of one chunk, in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkGeometry {
    pub id: String,
    pub cell: usize,
    pub width: f32,
    pub height: f32,
    pub l: f32,
    pub r: f32,
}

impl ChunkGeometry {
    /// Width of the region not shared with a neighbour.
    pub fn visible_width(&self) -> f32 {
        self.width - self.l - self.r
    }

    fn validate(&self) -> Result<(), StripError> {
        let reason = if !(self.width > 0.0) {
            Some(format!("width {} must be positive", self.width))
        } else if !(self.height > 0.0) {
            Some(format!("height {} must be positive", self.height))
        } else if !(self.l >= 0.0) || !(self.r >= 0.0) {
            Some(format!("margins l={} r={} must be non-negative", self.l, self.r))
        } else if self.l + self.r >= self.width {
            Some(format!(
                "margins l={} + r={} leave no visible width of {}",
                self.l, self.r, self.width
            ))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(StripError::Layout {
                chunk: self.id.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Position of a chunk within its segment, which decides how it is anchored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkRole {
    /// First chunk: open on the `offset[cell]` side.
    First,
    /// Neighbours on both sides.
    Middle,
    /// Last chunk: open on the `offset[cell+1]` side.
    Last,
    /// Only chunk of its segment; anchored like `First`.
    Lone,
}

impl ChunkRole {
    /// Role of chunk `index` in a segment of `count` chunks.
    pub fn for_index(index: usize, count: usize) -> Self {
        match (index, count) {
            (_, 1) => ChunkRole::Lone,
            (0, _) => ChunkRole::First,
            (i, n) if i + 1 == n => ChunkRole::Last,
            _ => ChunkRole::Middle,
        }
    }
}

/// Computed placement of one chunk along the axis.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkPlacement {
    pub id: String,
    pub cell: usize,
    pub role: ChunkRole,
    /// Centre of the whole chunk (margins included) on the axis.
    pub center_x: f32,
    /// Rendered width of the whole chunk.
    pub scale_x: f32,
    /// Rendered height of the chunk.
    pub scale_y: f32,
    pub width_px: f32,
    pub l: f32,
    pub r: f32,
}

impl ChunkPlacement {
    /// Axis units per chunk pixel along x.
    pub fn units_per_pixel_x(&self) -> f32 {
        self.scale_x / self.width_px
    }

    /// Interval `(min, max)` covered by the visible region.
    pub fn visible_span(&self) -> (f32, f32) {
        let k = self.units_per_pixel_x();
        let half = self.scale_x * 0.5;
        (
            self.center_x - half + self.l * k,
            self.center_x + half - self.r * k,
        )
    }

    /// Model transform mapping the unit reference plane
    /// (`x, y ∈ [-0.5, 0.5]`) onto the chunk's placement.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::new(self.scale_x, self.scale_y, 1.0),
            glam::Quat::IDENTITY,
            Vec3::new(self.center_x, 0.0, 0.0),
        )
    }
}

/// Layout pass over a fixed grid axis.
pub struct ChunkLayout<'a> {
    axis: &'a GridAxis,
    units_per_pixel: f32,
}

impl<'a> ChunkLayout<'a> {
    /// Create a layout pass.
    ///
    /// `units_per_pixel` converts chunk pixels into axis units for chunks
    /// that keep their natural size (first/last) and for chunk heights.
    /// With grid widths given in pixels this is 1.
    pub fn new(axis: &'a GridAxis, units_per_pixel: f32) -> Self {
        Self {
            axis,
            units_per_pixel,
        }
    }

    pub fn axis(&self) -> &GridAxis {
        self.axis
    }

    /// Place every chunk of one segment, in segment order.
    pub fn place_segment(&self, chunks: &[ChunkGeometry]) -> Result<Vec<ChunkPlacement>, StripError> {
        let placements = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| self.place(chunk, ChunkRole::for_index(i, chunks.len())))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("[ChunkLayout] placed {} chunks", placements.len());
        Ok(placements)
    }

    /// Place a single chunk with an explicit role.
    pub fn place(&self, chunk: &ChunkGeometry, role: ChunkRole) -> Result<ChunkPlacement, StripError> {
        chunk.validate()?;
        let (lo, hi) = self.axis.cell_span(chunk.cell).ok_or_else(|| StripError::Layout {
            chunk: chunk.id.clone(),
            reason: format!(
                "cell {} needs a following cell on an axis of {}",
                chunk.cell,
                self.axis.len()
            ),
        })?;
        let upp = self.units_per_pixel;

        let (center_x, scale_x) = match role {
            ChunkRole::Middle => {
                let grid_width = hi - lo;
                let overlap = (chunk.l + chunk.r) / chunk.width;
                let d = overlap / (1.0 - overlap);
                let nudge = if chunk.l + chunk.r > 0.0 {
                    d * grid_width * (chunk.r - chunk.l) / (chunk.r + chunk.l) * 0.5
                } else {
                    0.0
                };
                ((lo + hi) * 0.5 + nudge, (1.0 + d) * grid_width)
            }
            ChunkRole::First | ChunkRole::Lone => {
                (lo + (chunk.width * 0.5 - chunk.l) * upp, chunk.width * upp)
            }
            ChunkRole::Last => (hi - (chunk.width * 0.5 - chunk.r) * upp, chunk.width * upp),
        };

        Ok(ChunkPlacement {
            id: chunk.id.clone(),
            cell: chunk.cell,
            role,
            center_x,
            scale_x,
            scale_y: chunk.height * upp,
            width_px: chunk.width,
            l: chunk.l,
            r: chunk.r,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn chunk(cell: usize, width: f32, l: f32, r: f32) -> ChunkGeometry {
        ChunkGeometry {
            id: format!("c{cell}"),
            cell,
            width,
            height: 200.0,
            l,
            r,
        }
    }

    #[test]
    fn test_role_for_index() {
        assert_eq!(ChunkRole::for_index(0, 1), ChunkRole::Lone);
        assert_eq!(ChunkRole::for_index(0, 3), ChunkRole::First);
        assert_eq!(ChunkRole::for_index(1, 3), ChunkRole::Middle);
        assert_eq!(ChunkRole::for_index(2, 3), ChunkRole::Last);
    }

    #[test]
    fn test_middle_without_margins_matches_cell() {
        let axis = GridAxis::build(&[50.0; 4]).unwrap();
        let layout = ChunkLayout::new(&axis, 1.0);
        let p = layout.place(&chunk(1, 100.0, 0.0, 0.0), ChunkRole::Middle).unwrap();
        assert!((p.scale_x - 50.0).abs() < EPS);
        assert!((p.center_x - (-75.0)).abs() < EPS);
        let (a, b) = p.visible_span();
        assert!((a - (-100.0)).abs() < EPS && (b - (-50.0)).abs() < EPS);
    }

    #[test]
    fn test_middle_asymmetric_margins_cover_cell() {
        let axis = GridAxis::build(&[50.0; 4]).unwrap();
        let layout = ChunkLayout::new(&axis, 1.0);
        let p = layout.place(&chunk(1, 100.0, 10.0, 30.0), ChunkRole::Middle).unwrap();
        // overlap 0.4, d = 2/3, scale = 250/3
        assert!((p.scale_x - 250.0 / 3.0).abs() < EPS);
        let (a, b) = p.visible_span();
        assert!((a - (-100.0)).abs() < EPS);
        assert!((b - (-50.0)).abs() < EPS);
    }

    #[test]
    fn test_first_and_last_anchor_shared_boundary() {
        let axis = GridAxis::build(&[50.0; 5]).unwrap();
        let layout = ChunkLayout::new(&axis, 1.0);
        let first = layout.place(&chunk(1, 100.0, 10.0, 10.0), ChunkRole::First).unwrap();
        assert_eq!(first.visible_span().0, -100.0);
        let last = layout.place(&chunk(3, 100.0, 10.0, 10.0), ChunkRole::Last).unwrap();
        assert_eq!(last.visible_span().1, -150.0);
    }

    #[test]
    fn test_first_matches_aspect_form() {
        // With units_per_pixel = 1/height the anchor is
        // offset[c+1] + width/height * (0.5 - l/width).
        let axis = GridAxis::build(&[0.5, 0.5, 0.5]).unwrap();
        let layout = ChunkLayout::new(&axis, 1.0 / 200.0);
        let p = layout.place(&chunk(0, 100.0, 20.0, 5.0), ChunkRole::First).unwrap();
        let expected = -0.5 + 100.0 / 200.0 * (0.5 - 20.0 / 100.0);
        assert!((p.center_x - expected).abs() < 1e-6);
        assert!((p.scale_y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_malformed_chunks() {
        let axis = GridAxis::build(&[50.0; 3]).unwrap();
        let layout = ChunkLayout::new(&axis, 1.0);
        for bad in [
            chunk(0, 0.0, 0.0, 0.0),
            chunk(0, 100.0, 60.0, 40.0),
            chunk(0, 100.0, -1.0, 0.0),
            chunk(2, 100.0, 10.0, 10.0),
        ] {
            assert!(matches!(
                layout.place(&bad, ChunkRole::Middle),
                Err(StripError::Layout { .. })
            ));
        }
    }

    #[test]
    fn test_model_matrix_maps_reference_plane() {
        let axis = GridAxis::build(&[50.0; 4]).unwrap();
        let layout = ChunkLayout::new(&axis, 1.0);
        let p = layout.place(&chunk(1, 100.0, 0.0, 0.0), ChunkRole::Middle).unwrap();
        let right = p.model_matrix().transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!((right.x - (-50.0)).abs() < EPS);
        assert!((right.y - 100.0).abs() < EPS);
    }
}
