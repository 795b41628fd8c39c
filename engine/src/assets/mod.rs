//! Asset Loading
//!
//! Segment manifests and the field images they reference.

pub mod field_loader;
pub mod manifest;

pub use field_loader::{LoadedChunk, LoadedSegment, load_edges, load_encoded, load_field, load_segment};
pub use manifest::{Chunk, ChunkEntry, FieldPaths, FieldRef, Manifest, Segment, SegmentEntry};
