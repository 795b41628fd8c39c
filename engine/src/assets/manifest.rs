//! Segment Manifest
//!
//! JSON description of a scan: the grid cell widths and, per segment, the
//! field files and the ordered chunk list.
//!
//! ```json
//! {
//!   "grid": [120.0, 118.5, 121.0],
//!   "segments": [{
//!     "id": "20230702185753",
//!     "position": { "coarse": "pos.png", "fine": "pos_fine.png" },
//!     "color": "color.png",
//!     "chunks": [{
//!       "id": "c0", "cell": 0,
//!       "uv": { "coarse": "c0_uv.png" }, "distance": "c0_edge.png",
//!       "width": 1200, "height": 800, "l": 40, "r": 35
//!     }]
//!   }]
//! }
//! ```
//!
//! File paths are relative to the manifest's directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::strip::{ChunkGeometry, ChunkLayout, GridAxis};

/// Coarse field file plus an optional fine-offset file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRef {
    pub coarse: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fine: Option<String>,
}

/// One chunk as written in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkEntry {
    pub id: String,
    /// Grid cell the chunk's visible region covers.
    pub cell: usize,
    /// Chunk UV field (chunk UV -> segment UV).
    pub uv: FieldRef,
    /// Edge-distance field.
    pub distance: String,
    pub width: f32,
    pub height: f32,
    /// Left overlap margin in pixels.
    #[serde(default)]
    pub l: f32,
    /// Right overlap margin in pixels.
    #[serde(default)]
    pub r: f32,
    /// Colour tile of this chunk alone; without one the chunk reads the
    /// segment colour through its UV field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ChunkEntry {
    pub fn geometry(&self) -> ChunkGeometry {
        ChunkGeometry {
            id: self.id.clone(),
            cell: self.cell,
            width: self.width,
            height: self.height,
            l: self.l,
            r: self.r,
        }
    }
}

/// One segment as written in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentEntry {
    pub id: String,
    pub position: FieldRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub chunks: Vec<ChunkEntry>,
}

/// Parsed manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Nominal pixel width of each grid cell, in axis order.
    pub grid: Vec<f32>,
    pub segments: Vec<SegmentEntry>,
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Resolved field file paths.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPaths {
    pub coarse: PathBuf,
    pub fine: Option<PathBuf>,
}

/// A chunk with resolved paths. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: String,
    pub cell: usize,
    pub width: f32,
    pub height: f32,
    pub l: f32,
    pub r: f32,
    pub uv: FieldPaths,
    pub distance: PathBuf,
    pub color: Option<PathBuf>,
}

impl Chunk {
    pub fn geometry(&self) -> ChunkGeometry {
        ChunkGeometry {
            id: self.id.clone(),
            cell: self.cell,
            width: self.width,
            height: self.height,
            l: self.l,
            r: self.r,
        }
    }
}

/// A segment with resolved paths; owns its chunks in axis order.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: String,
    pub position: FieldPaths,
    pub label: Option<PathBuf>,
    pub color: Option<PathBuf>,
    pub chunks: Vec<Chunk>,
}

impl Segment {
    pub fn geometry(&self) -> Vec<ChunkGeometry> {
        self.chunks.iter().map(Chunk::geometry).collect()
    }
}

impl Manifest {
    /// Load and validate a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let manifest = Self::from_json(&data)?.with_base_dir(base_dir);
        log::info!(
            "[Manifest] Loaded {}: {} cells, {} segments",
            path.display(),
            manifest.grid.len(),
            manifest.segments.len()
        );
        Ok(manifest)
    }

    /// Parse and validate manifest JSON. Paths resolve against the current
    /// directory until [`Manifest::with_base_dir`] is applied.
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Check ids, the grid and every chunk's geometry against the grid.
    pub fn validate(&self) -> Result<(), AssetError> {
        let axis = self.grid_axis()?;
        let layout = ChunkLayout::new(&axis, 1.0);

        let mut seen = HashSet::new();
        for segment in &self.segments {
            if segment.id.is_empty() {
                return Err(AssetError::Invalid("segment with empty id".into()));
            }
            if !seen.insert(segment.id.as_str()) {
                return Err(AssetError::Invalid(format!(
                    "duplicate segment id '{}'",
                    segment.id
                )));
            }
            if segment.chunks.is_empty() {
                return Err(AssetError::Invalid(format!(
                    "segment '{}' has no chunks",
                    segment.id
                )));
            }
            let geometry: Vec<ChunkGeometry> =
                segment.chunks.iter().map(ChunkEntry::geometry).collect();
            layout.place_segment(&geometry)?;
        }
        Ok(())
    }

    pub fn grid_axis(&self) -> Result<GridAxis, AssetError> {
        Ok(GridAxis::build(&self.grid)?)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of a manifest-relative file.
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    fn resolve_field(&self, field: &FieldRef) -> FieldPaths {
        FieldPaths {
            coarse: self.resolve_path(&field.coarse),
            fine: field.fine.as_deref().map(|f| self.resolve_path(f)),
        }
    }

    /// Segments with every path resolved against the manifest directory.
    pub fn segments(&self) -> Vec<Segment> {
        self.segments
            .iter()
            .map(|entry| Segment {
                id: entry.id.clone(),
                position: self.resolve_field(&entry.position),
                label: entry.label.as_deref().map(|p| self.resolve_path(p)),
                color: entry.color.as_deref().map(|p| self.resolve_path(p)),
                chunks: entry
                    .chunks
                    .iter()
                    .map(|c| Chunk {
                        id: c.id.clone(),
                        cell: c.cell,
                        width: c.width,
                        height: c.height,
                        l: c.l,
                        r: c.r,
                        uv: self.resolve_field(&c.uv),
                        distance: self.resolve_path(&c.distance),
                        color: c.color.as_deref().map(|p| self.resolve_path(p)),
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "grid": [50, 50, 50, 50],
        "segments": [{
            "id": "s1",
            "position": { "coarse": "pos.png", "fine": "pos_fine.png" },
            "color": "seg.png",
            "chunks": [
                { "id": "a", "cell": 0, "uv": { "coarse": "a_uv.png" }, "distance": "a_edge.png",
                  "width": 100, "height": 80, "l": 10, "r": 10 },
                { "id": "b", "cell": 1, "uv": { "coarse": "b_uv.png" }, "distance": "b_edge.png",
                  "width": 100, "height": 80, "l": 10, "r": 10, "color": "b.png" }
            ]
        }]
    }"#;

    #[test]
    fn test_parse_and_resolve() {
        let manifest = Manifest::from_json(SAMPLE).unwrap().with_base_dir("/data/scroll");
        let segments = manifest.segments();
        assert_eq!(segments.len(), 1);
        let seg = &segments[0];
        assert_eq!(seg.position.fine, Some(PathBuf::from("/data/scroll/pos_fine.png")));
        assert_eq!(seg.color, Some(PathBuf::from("/data/scroll/seg.png")));
        assert_eq!(seg.chunks[0].color, None);
        assert_eq!(seg.chunks[1].color, Some(PathBuf::from("/data/scroll/b.png")));
        assert_eq!(seg.geometry()[1].cell, 1);
    }

    #[test]
    fn test_rejects_chunk_on_last_cell() {
        let json = SAMPLE.replace("\"cell\": 1", "\"cell\": 3");
        assert!(matches!(Manifest::from_json(&json), Err(AssetError::Strip(_))));
    }

    #[test]
    fn test_rejects_duplicate_segments() {
        let mut manifest = Manifest::from_json(SAMPLE).unwrap();
        manifest.segments.push(manifest.segments[0].clone());
        assert!(matches!(manifest.validate(), Err(AssetError::Invalid(_))));
    }

    #[test]
    fn test_rejects_short_grid() {
        let json = SAMPLE.replace("[50, 50, 50, 50]", "[50]");
        assert!(Manifest::from_json(&json).is_err());
    }
}
