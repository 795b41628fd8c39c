//! Render Module
//!
//! Headless wgpu rendering of the strip stage pair: GPU context and
//! readback, uniform records, the WGSL source, the material pipeline and the
//! renderer that ties them together.

pub mod binding_validator;
pub mod gpu_context;
pub mod scroll_material;
pub mod shader;
pub mod shader_loader;
pub mod strip_renderer;
pub mod uniforms;

pub use binding_validator::validate_strip_bindings;
pub use gpu_context::{COLOR_FORMAT, DEPTH_FORMAT, GpuContext, GpuContextConfig};
pub use scroll_material::{CHUNK_LAYOUT_ENTRIES, ChunkBinding, ChunkTextures, ChunkVertex, ScrollMaterial};
pub use shader::SHADER_SOURCE;
pub use shader_loader::{ShaderSource, create_shader_module, load_shader_file};
pub use strip_renderer::{PLANE_SUBDIVISIONS, StripRenderer, fit_view_proj};
pub use uniforms::ChunkUniforms;
