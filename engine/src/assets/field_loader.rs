//! Field Loader
//!
//! Decodes field images (PNG, TIFF, JPEG) into [`SurfaceField`]s. Every
//! image is expanded to RGBA8; channel values are normalized to `[0, 1]`.

use std::path::Path;

use crate::error::AssetError;
use crate::strip::{
    ChunkGeometry, ColorSource, EdgeDistanceField, EncodedField, SurfaceField, TileKind,
};

use super::manifest::{FieldPaths, Segment};

/// Decode one image file.
pub fn load_field(path: &Path) -> Result<SurfaceField, AssetError> {
    let image = image::open(path)
        .map_err(|source| AssetError::Image {
            path: path.display().to_string(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();
    log::debug!("[FieldLoader] {} ({}x{})", path.display(), width, height);
    SurfaceField::from_rgba8(width, height, image.as_raw()).ok_or_else(|| {
        AssetError::Invalid(format!("empty field image '{}'", path.display()))
    })
}

/// Decode a coarse field and its fine-offset companion, if any.
pub fn load_encoded(paths: &FieldPaths) -> Result<EncodedField, AssetError> {
    let coarse = load_field(&paths.coarse)?;
    let fine = paths.fine.as_deref().map(load_field).transpose()?;
    if let Some(fine) = &fine {
        if (fine.width(), fine.height()) != (coarse.width(), coarse.height()) {
            log::warn!(
                "[FieldLoader] fine field {:?} is {}x{}, coarse is {}x{}",
                paths.fine,
                fine.width(),
                fine.height(),
                coarse.width(),
                coarse.height()
            );
        }
    }
    Ok(EncodedField::new(coarse, fine))
}

pub fn load_edges(path: &Path) -> Result<EdgeDistanceField, AssetError> {
    Ok(EdgeDistanceField::new(load_field(path)?))
}

/// Fields of one chunk, ready for either stage.
#[derive(Debug, Clone)]
pub struct LoadedChunk {
    pub geometry: ChunkGeometry,
    pub uv: EncodedField,
    pub edges: EdgeDistanceField,
    /// Colour tile of this chunk; `None` reads the segment surface.
    pub color: Option<SurfaceField>,
}

/// A segment with every field decoded.
#[derive(Debug, Clone)]
pub struct LoadedSegment {
    pub id: String,
    pub position: EncodedField,
    /// Segment-wide colour or label field, shared by every chunk without a
    /// tile of its own.
    pub surface: Option<SurfaceField>,
    pub chunks: Vec<LoadedChunk>,
}

impl LoadedSegment {
    pub fn geometry(&self) -> Vec<ChunkGeometry> {
        self.chunks.iter().map(|c| c.geometry.clone()).collect()
    }

    /// Where `chunk`'s fragments read their colour: its own tile if it has
    /// one, else the segment surface through the chunk UV field.
    pub fn color_source<'a>(&'a self, chunk: &'a LoadedChunk) -> Option<ColorSource<'a>> {
        match (&chunk.color, &self.surface) {
            (Some(tile), _) => Some(ColorSource::Tile(tile)),
            (None, Some(field)) => Some(ColorSource::Segment {
                field,
                uv: &chunk.uv,
            }),
            (None, None) => None,
        }
    }
}

/// Decode all fields of `segment`.
///
/// Label tiles read the segment's label field. Colour tiles read the
/// chunk's own colour field, falling back to the segment colour field. A
/// chunk with no source is an error.
pub fn load_segment(segment: &Segment, kind: TileKind) -> Result<LoadedSegment, AssetError> {
    let position = load_encoded(&segment.position)?;
    let surface = match kind {
        TileKind::Label => {
            let path = segment.label.as_deref().ok_or_else(|| {
                AssetError::Invalid(format!("segment '{}' has no label field", segment.id))
            })?;
            Some(load_field(path)?)
        }
        TileKind::Color => segment.color.as_deref().map(load_field).transpose()?,
    };

    let mut chunks = Vec::with_capacity(segment.chunks.len());
    for chunk in &segment.chunks {
        let color = match (kind, chunk.color.as_deref()) {
            (TileKind::Color, Some(path)) => Some(load_field(path)?),
            (TileKind::Color, None) if surface.is_none() => {
                return Err(AssetError::Invalid(format!(
                    "chunk '{}' of segment '{}' has no colour field",
                    chunk.id, segment.id
                )));
            }
            _ => None,
        };
        chunks.push(LoadedChunk {
            geometry: chunk.geometry(),
            uv: load_encoded(&chunk.uv)?,
            edges: load_edges(&chunk.distance)?,
            color,
        });
    }

    log::info!(
        "[FieldLoader] Segment '{}': {} chunks loaded ({} own tiles)",
        segment.id,
        chunks.len(),
        chunks.iter().filter(|c| c.color.is_some()).count()
    );
    Ok(LoadedSegment {
        id: segment.id.clone(),
        position,
        surface,
        chunks,
    })
}
