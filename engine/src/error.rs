//! Error Types
//!
//! Error taxonomy for the strip engine. Construction-time components
//! (`GridAxis`, `ChunkLayout`, manifest loading) fail fast with these errors.
//! The per-vertex and per-fragment stages never return them from their batch
//! entry points; they substitute a defined limit instead.

use thiserror::Error;

/// Errors raised by the strip geometry core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StripError {
    /// The grid axis could not be built from the given cell widths.
    #[error("invalid grid axis: {0}")]
    Axis(String),

    /// A wrap index or axis position fell outside the axis domain.
    #[error("value {value} outside axis domain [{min}, {max})")]
    Domain { value: f32, min: f32, max: f32 },

    /// A chunk's declared geometry cannot be placed on the axis.
    #[error("chunk '{chunk}' cannot be laid out: {reason}")]
    Layout { chunk: String, reason: String },

    /// The seam-blend denominator vanished for this edge combination.
    #[error("degenerate seam blend (denominator {denominator})")]
    DegenerateBlend { denominator: f32 },
}

/// Errors raised while loading manifests and field files.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error for '{path}': {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid asset data: {0}")]
    Invalid(String),

    #[error(transparent)]
    Strip(#[from] StripError),
}

/// Errors raised by the headless renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no compatible GPU adapter: {0}")]
    NoAdapter(String),

    #[error("failed to create GPU device: {0}")]
    RequestDevice(String),

    #[error("readback failed: {0}")]
    Readback(String),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Strip(#[from] StripError),
}

/// Errors raised while computing segment metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("mesh has no faces")]
    Empty,
}
