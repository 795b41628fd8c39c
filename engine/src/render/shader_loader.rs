//! Shader Loading Utilities
//!
//! Loading and compiling WGSL shaders for the strip pipeline.
//! Supports both the embedded source and a runtime override file.

use std::path::Path;

use super::shader::SHADER_SOURCE;

/// Shader source that can be either embedded at compile time or loaded at runtime.
pub enum ShaderSource {
    /// Embedded shader source (no file I/O at runtime)
    Embedded(&'static str),
    /// Runtime-loaded shader source
    Runtime(String),
}

impl ShaderSource {
    /// The built-in strip shader.
    pub fn strip() -> Self {
        ShaderSource::Embedded(SHADER_SOURCE)
    }

    /// Get the shader source as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            ShaderSource::Embedded(s) => s,
            ShaderSource::Runtime(s) => s.as_str(),
        }
    }
}

impl Default for ShaderSource {
    fn default() -> Self {
        Self::strip()
    }
}

/// Load a shader from the filesystem at runtime.
///
/// # Arguments
/// * `path` - Path to the WGSL shader file
pub fn load_shader_file(path: impl AsRef<Path>) -> Result<ShaderSource, std::io::Error> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    log::info!("[ShaderLoader] Loaded {}", path.display());
    Ok(ShaderSource::Runtime(source))
}

/// Create a wgpu shader module from the given source.
///
/// # Arguments
/// * `device` - The wgpu device to create the shader module on
/// * `label` - Label for debugging
/// * `source` - The WGSL shader source
pub fn create_shader_module(
    device: &wgpu::Device,
    label: &str,
    source: &ShaderSource,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.as_str().into()),
    })
}
