//! Strip Geometry Core
//!
//! Pure CPU side of the reconstruction: the physical grid axis, chunk
//! placement along it, and the reference implementations of the per-vertex
//! and per-fragment stages that the GPU shader mirrors.

pub mod chunk_layout;
pub mod field;
pub mod grid_axis;
pub mod seam_blend;
pub mod stage;
pub mod surface_transform;

pub use chunk_layout::{ChunkGeometry, ChunkLayout, ChunkPlacement, ChunkRole};
pub use field::{EdgeDistanceField, EdgeSample, EncodedField, FINE_SCALE, SurfaceField};
pub use grid_axis::GridAxis;
pub use seam_blend::{ColorSource, DEGENERATE_EPSILON, SeamBlend};
pub use stage::{SeamTargets, StageFeatures, SurfaceDecode, SurfaceParams, TileKind, smoothstep};
pub use surface_transform::{
    ReferenceVertex, SurfaceSampler, SurfaceTransform, TransformedVertex,
};
