//! Scroll Unroll Engine Library
//!
//! Reconstructs a scanned scroll surface from encoded position fields and
//! animates it between its rolled and unrolled states. Adjacent chunks are
//! laid out on a shared physical grid axis and their overlap seams are
//! blended per fragment.
//!
//! # Modules
//!
//! - [`strip`] - Grid axis, chunk layout and CPU reference stages
//! - [`assets`] - Segment manifest and field image loading
//! - [`config`] - JSON render configuration
//! - [`navigation`] - Wrap/flatten state driven by time or camera position
//! - [`metrics`] - Segment metrics from OBJ meshes
//! - [`render`] - Headless wgpu renderer for the stage pair
//!
//! # Example
//!
//! ```ignore
//! use scroll_unroll_engine::assets::Manifest;
//! use scroll_unroll_engine::strip::ChunkLayout;
//!
//! let manifest = Manifest::load("data/manifest.json")?;
//! let axis = manifest.grid_axis()?;
//! let layout = ChunkLayout::new(&axis, 1.0);
//! for segment in manifest.segments() {
//!     let placements = layout.place_segment(&segment.geometry())?;
//! }
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod metrics;
pub mod navigation;
pub mod render;
pub mod strip;

pub use error::{AssetError, MetricsError, RenderError, StripError};
pub use strip::{ChunkLayout, GridAxis, SeamBlend, SurfaceTransform};
