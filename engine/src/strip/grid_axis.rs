//! Grid Axis Module
//!
//! One-dimensional coordinate system of the virtual unrolled strip.
//! Built once from the manifest's ordered grid-cell widths and read-only
//! afterwards, so it can be shared between the layout pass, the per-frame
//! parameter builder and camera tracking without synchronization.
//!
//! ## Offsets
//! Each cell contributes one centre offset. Consecutive centres are half a
//! cell apart on each side:
//! - `offset[0] = 0`
//! - `offset[i] = offset[i-1] - (w[i-1] + w[i]) / 2`
//!
//! The axis therefore extends in the negative direction and offsets are
//! strictly decreasing.
//!
//! ## Wrap index
//! A continuous scalar whose integer part selects the interval
//! `[offset[s], offset[s+1]]` and whose fractional part interpolates inside
//! it. Valid domain: `[0, N - 1)`.

use crate::error::StripError;

/// Ordered grid-cell axis with precomputed centre offsets.
#[derive(Clone, Debug, PartialEq)]
pub struct GridAxis {
    widths: Vec<f32>,
    offsets: Vec<f32>,
}

impl GridAxis {
    /// Build the axis from nominal cell widths.
    ///
    /// Fails when fewer than two cells are given (the domain would be empty)
    /// or when any width is non-finite or not strictly positive.
    pub fn build(widths: &[f32]) -> Result<Self, StripError> {
        if widths.len() < 2 {
            return Err(StripError::Axis(format!(
                "need at least 2 grid cells, got {}",
                widths.len()
            )));
        }
        if let Some((i, w)) = widths
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w <= 0.0)
        {
            return Err(StripError::Axis(format!("cell {i} has width {w}")));
        }

        let mut offsets = Vec::with_capacity(widths.len());
        offsets.push(0.0);
        for pair in widths.windows(2) {
            let prev = offsets[offsets.len() - 1];
            offsets.push(prev - (pair[0] + pair[1]) * 0.5);
        }

        log::debug!(
            "[GridAxis] built {} cells, extent {:.2}",
            widths.len(),
            offsets[0] - offsets[offsets.len() - 1]
        );

        Ok(Self {
            widths: widths.to_vec(),
            offsets,
        })
    }

    /// Number of grid cells.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Always false for a built axis; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Centre offsets, one per cell, strictly decreasing.
    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    /// Nominal widths the axis was built from.
    pub fn widths(&self) -> &[f32] {
        &self.widths
    }

    /// Valid wrap-index range as `(min, max)`, max exclusive.
    pub fn wrap_domain(&self) -> (f32, f32) {
        (0.0, (self.len() - 1) as f32)
    }

    /// Total physical length between the first and last cell centres.
    pub fn extent(&self) -> f32 {
        self.offsets[0] - self.offsets[self.len() - 1]
    }

    /// Distance between the centres of `cell` and `cell + 1`.
    ///
    /// Returns `None` when `cell + 1` is not on the axis.
    pub fn cell_width(&self, cell: usize) -> Option<f32> {
        let (lo, hi) = self.cell_span(cell)?;
        Some((hi - lo).abs())
    }

    /// Physical interval `(offset[cell+1], offset[cell])` covered by `cell`,
    /// lower bound first.
    pub fn cell_span(&self, cell: usize) -> Option<(f32, f32)> {
        let hi = *self.offsets.get(cell)?;
        let lo = *self.offsets.get(cell + 1)?;
        Some((lo, hi))
    }

    /// Map a wrap index to its physical offset along the axis.
    ///
    /// Linear interpolation between the two neighbouring cell centres; the
    /// exact inverse of [`GridAxis::wrap_of`] inside the domain.
    pub fn position(&self, wrap: f32) -> Result<f32, StripError> {
        let (min, max) = self.wrap_domain();
        if !wrap.is_finite() || wrap < min {
            return Err(StripError::Domain { value: wrap, min, max });
        }
        let s = wrap.floor();
        let f = wrap - s;
        let s = s as usize;
        if s + 1 >= self.len() {
            return Err(StripError::Domain { value: wrap, min, max });
        }
        Ok((1.0 - f) * self.offsets[s] + f * self.offsets[s + 1])
    }

    /// Map a physical offset back to its wrap index.
    ///
    /// Finds the first interval whose far end `offset[s+1]` is at or below
    /// `pos` and interpolates inside it. Binary search over the decreasing
    /// offsets gives the same interval as a linear scan from the start.
    /// Domain: `(offset[N-1], offset[0]]`.
    pub fn wrap_of(&self, pos: f32) -> Result<f32, StripError> {
        let first = self.offsets[0];
        let last = self.offsets[self.len() - 1];
        if !pos.is_finite() || pos > first || pos <= last {
            return Err(StripError::Domain {
                value: pos,
                min: last,
                max: first,
            });
        }

        let s = self.offsets[1..].partition_point(|&o| o > pos);
        let (a, b) = (self.offsets[s], self.offsets[s + 1]);
        let f = (pos - a) / (b - a);
        Ok(s as f32 + f)
    }

    /// Clamp a wrap index into the axis domain.
    ///
    /// The upper bound is pulled just below `N - 1` so the result is always
    /// accepted by [`GridAxis::position`]. Non-finite input maps to 0.
    pub fn clamp_wrap(&self, wrap: f32) -> f32 {
        let (min, max) = self.wrap_domain();
        if !wrap.is_finite() {
            return min;
        }
        let upper = max - max.max(1.0) * f32::EPSILON * 4.0;
        wrap.clamp(min, upper)
    }
}
