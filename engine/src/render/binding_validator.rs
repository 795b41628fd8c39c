//! Shader Binding Validator
//!
//! Validates that the strip bind group layout matches the bindings declared
//! in the WGSL source. Catches mismatches between Rust-side layouts and WGSL
//! declarations before they cause GPU validation errors at render time.
//!
//! The expected bindings are defined here as the canonical source of truth,
//! matching the declarations in [`super::shader::SHADER_SOURCE`].

use std::fmt;

/// Describes a single expected binding in a bind group layout.
#[derive(Debug, Clone)]
struct ExpectedBinding {
    binding: u32,
    binding_type: ExpectedBindingType,
    label: &'static str,
}

/// The type of a binding, matching wgpu::BindingType variants we use.
#[derive(Debug, Clone, PartialEq)]
enum ExpectedBindingType {
    UniformBuffer,
    Texture2d,
    Other,
}

impl fmt::Display for ExpectedBindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UniformBuffer => write!(f, "uniform buffer"),
            Self::Texture2d => write!(f, "texture 2d (float)"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Describes the expected layout for one bind group of a pipeline.
struct ExpectedBindGroup {
    pipeline_name: &'static str,
    group_index: u32,
    bindings: Vec<ExpectedBinding>,
}

/// Classifies a wgpu::BindGroupLayoutEntry into our ExpectedBindingType.
fn classify_entry(entry: &wgpu::BindGroupLayoutEntry) -> ExpectedBindingType {
    match &entry.ty {
        wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            ..
        } => ExpectedBindingType::UniformBuffer,
        wgpu::BindingType::Texture {
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { .. },
            multisampled: false,
        } => ExpectedBindingType::Texture2d,
        _ => ExpectedBindingType::Other,
    }
}

/// Validates actual bind group layout entries against expected bindings.
/// Returns the number of mismatches found.
fn validate_bind_group(
    expected: &ExpectedBindGroup,
    actual_entries: &[wgpu::BindGroupLayoutEntry],
) -> u32 {
    let mut mismatches = 0u32;

    for exp in &expected.bindings {
        match actual_entries.iter().find(|e| e.binding == exp.binding) {
            None => {
                log::warn!(
                    "[BindingValidator] MISMATCH in '{}' group {} binding {}: expected {} ({}), actual: MISSING",
                    expected.pipeline_name, expected.group_index, exp.binding, exp.binding_type, exp.label
                );
                mismatches += 1;
            }
            Some(actual) => {
                let actual_type = classify_entry(actual);
                if actual_type != exp.binding_type {
                    log::warn!(
                        "[BindingValidator] MISMATCH in '{}' group {} binding {}: expected {} ({}), actual: {}",
                        expected.pipeline_name, expected.group_index, exp.binding,
                        exp.binding_type, exp.label, actual_type
                    );
                    mismatches += 1;
                }
                let stages = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
                if !actual.visibility.contains(stages) {
                    log::warn!(
                        "[BindingValidator] MISMATCH in '{}' group {} binding {}: {} must be visible to both stages",
                        expected.pipeline_name, expected.group_index, exp.binding, exp.label
                    );
                    mismatches += 1;
                }
            }
        }
    }

    for actual in actual_entries {
        if !expected.bindings.iter().any(|e| e.binding == actual.binding) {
            let actual_type = classify_entry(actual);
            log::warn!(
                "[BindingValidator] EXTRA binding in '{}' group {} binding {}: type {} not in shader expectations",
                expected.pipeline_name, expected.group_index, actual.binding, actual_type
            );
            mismatches += 1;
        }
    }

    mismatches
}

/// Validate the strip pipeline's group 0 against the WGSL declarations.
///
/// Pass the same entry slice used for layout creation. Returns the number of
/// mismatches.
pub fn validate_strip_bindings(group0_entries: &[wgpu::BindGroupLayoutEntry]) -> u32 {
    use ExpectedBindingType::{Texture2d, UniformBuffer};

    let strip_g0 = ExpectedBindGroup {
        pipeline_name: "Strip",
        group_index: 0,
        bindings: vec![
            ExpectedBinding { binding: 0, binding_type: UniformBuffer, label: "ChunkUniforms" },
            ExpectedBinding { binding: 1, binding_type: Texture2d, label: "position_coarse" },
            ExpectedBinding { binding: 2, binding_type: Texture2d, label: "position_fine" },
            ExpectedBinding { binding: 3, binding_type: Texture2d, label: "uv_coarse" },
            ExpectedBinding { binding: 4, binding_type: Texture2d, label: "uv_fine" },
            ExpectedBinding { binding: 5, binding_type: Texture2d, label: "edge_distance" },
            ExpectedBinding { binding: 6, binding_type: Texture2d, label: "color_field" },
        ],
    };
    let total = validate_bind_group(&strip_g0, group0_entries);

    if total == 0 {
        log::info!("[BindingValidator] Strip bindings validated OK");
    } else {
        log::warn!(
            "[BindingValidator] WARNING: {} binding mismatch(es) found! GPU validation errors may occur.",
            total
        );
    }
    total
}
