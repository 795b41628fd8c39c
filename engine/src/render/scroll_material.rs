//! Scroll Material Module
//!
//! Pipeline and per-chunk bindings for the strip stage pair.
//! Every chunk gets its own uniform buffer and bind group holding the
//! segment position field, its UV field, its edge-distance field and its
//! colour (or label) field. Optional fine fields are bound to a 1x1 zero
//! texture when absent, so the fine offset decodes to nothing.
//!
//! # Usage
//!
//! ```rust,ignore
//! let material = ScrollMaterial::new(&device, &queue, COLOR_FORMAT);
//! let binding = material.create_chunk_binding(&device, &textures, &uniforms);
//!
//! material.bind(&mut render_pass, &binding);
//! render_pass.draw_indexed(0..index_count, 0, 0..1);
//! ```

use bytemuck::{Pod, Zeroable};

use super::binding_validator::validate_strip_bindings;
use super::gpu_context::DEPTH_FORMAT;
use super::shader::{FRAGMENT_ENTRY, VERTEX_ENTRY};
use super::shader_loader::{ShaderSource, create_shader_module};
use super::uniforms::ChunkUniforms;

const fn field_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Bind group layout entries of the strip shader's group 0.
pub const CHUNK_LAYOUT_ENTRIES: [wgpu::BindGroupLayoutEntry; 7] = [
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    },
    field_entry(1),
    field_entry(2),
    field_entry(3),
    field_entry(4),
    field_entry(5),
    field_entry(6),
];

/// Texture views bound for one chunk.
pub struct ChunkTextures<'a> {
    pub position_coarse: &'a wgpu::TextureView,
    pub position_fine: Option<&'a wgpu::TextureView>,
    pub uv_coarse: &'a wgpu::TextureView,
    pub uv_fine: Option<&'a wgpu::TextureView>,
    pub edge_distance: &'a wgpu::TextureView,
    pub color: &'a wgpu::TextureView,
}

/// Bind group of one chunk; it keeps the chunk's uniform buffer alive.
pub struct ChunkBinding {
    bind_group: wgpu::BindGroup,
}

impl ChunkBinding {
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Strip material renderer
pub struct ScrollMaterial {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    zero_field: wgpu::TextureView,
}

impl ScrollMaterial {
    /// Create the material with the embedded shader
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, target_format: wgpu::TextureFormat) -> Self {
        Self::with_shader(device, queue, target_format, &ShaderSource::strip())
    }

    /// Create the material with a custom WGSL source exposing the same interface
    pub fn with_shader(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target_format: wgpu::TextureFormat,
        source: &ShaderSource,
    ) -> Self {
        let shader = create_shader_module(device, "Strip Shader", source);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Strip Bind Group Layout"),
            entries: &CHUNK_LAYOUT_ENTRIES,
        });
        validate_strip_bindings(&CHUNK_LAYOUT_ENTRIES);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Strip Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Strip Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[ChunkVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // the rolled surface shows both sides
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let zero_field = create_zero_field(device, queue);

        log::info!("[ScrollMaterial] Initialized strip pipeline ({:?})", target_format);

        Self {
            pipeline,
            bind_group_layout,
            zero_field,
        }
    }

    /// Get the bind group layout for external use
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Get the render pipeline
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Create the uniform buffer and bind group of one chunk
    pub fn create_chunk_binding(
        &self,
        device: &wgpu::Device,
        textures: &ChunkTextures<'_>,
        uniforms: &ChunkUniforms,
    ) -> ChunkBinding {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Chunk Uniform Buffer"),
            size: std::mem::size_of::<ChunkUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });
        uniform_buffer
            .slice(..)
            .get_mapped_range_mut()
            .copy_from_slice(uniforms.as_bytes());
        uniform_buffer.unmap();

        let views = [
            textures.position_coarse,
            textures.position_fine.unwrap_or(&self.zero_field),
            textures.uv_coarse,
            textures.uv_fine.unwrap_or(&self.zero_field),
            textures.edge_distance,
            textures.color,
        ];
        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }];
        entries.extend(views.into_iter().enumerate().map(|(i, view)| wgpu::BindGroupEntry {
            binding: i as u32 + 1,
            resource: wgpu::BindingResource::TextureView(view),
        }));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Chunk Bind Group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        });

        ChunkBinding { bind_group }
    }

    /// Bind the material and one chunk for rendering
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>, binding: &ChunkBinding) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, binding.bind_group(), &[]);
    }
}

fn create_zero_field(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: 1,
        height: 1,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Zero Field"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &[0u8; 4],
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4),
            rows_per_image: Some(1),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Reference-plane vertex (position + chunk UV)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ChunkVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<ChunkVertex>() == 20);

impl ChunkVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
        // Position
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        },
        // UV
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 12,
            shader_location: 1,
        },
    ];

    /// Vertex buffer layout (pos3 + uv2, 20 bytes)
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ChunkVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Subdivided unit reference plane, `x, y ∈ [-0.5, 0.5]` at `z = 0`.
    ///
    /// `u` runs with `+x`; `v = 0` on the top edge (`y = 0.5`) so that image
    /// row 0 lands at the top of the chunk.
    pub fn reference_plane(subdivisions_x: u32, subdivisions_y: u32) -> (Vec<ChunkVertex>, Vec<u32>) {
        let sx = subdivisions_x.max(1);
        let sy = subdivisions_y.max(1);
        let mut vertices = Vec::with_capacity(((sx + 1) * (sy + 1)) as usize);
        let mut indices = Vec::with_capacity((sx * sy * 6) as usize);

        for j in 0..=sy {
            for i in 0..=sx {
                let u = i as f32 / sx as f32;
                let v = j as f32 / sy as f32;
                vertices.push(ChunkVertex {
                    position: [u - 0.5, 0.5 - v, 0.0],
                    uv: [u, v],
                });
            }
        }

        // Two triangles per quad
        let cols = sx + 1;
        for j in 0..sy {
            for i in 0..sx {
                let base = j * cols + i;
                indices.extend_from_slice(&[base, base + cols, base + 1]);
                indices.extend_from_slice(&[base + 1, base + cols, base + cols + 1]);
            }
        }

        (vertices, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_plane_corners() {
        let (vertices, indices) = ChunkVertex::reference_plane(4, 2);
        assert_eq!(vertices.len(), 15);
        assert_eq!(indices.len(), 4 * 2 * 6);
        assert_eq!(vertices[0].position, [-0.5, 0.5, 0.0]);
        assert_eq!(vertices[0].uv, [0.0, 0.0]);
        let last = vertices[vertices.len() - 1];
        assert_eq!(last.position, [0.5, -0.5, 0.0]);
        assert_eq!(last.uv, [1.0, 1.0]);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn test_layout_entries_validate() {
        assert_eq!(validate_strip_bindings(&CHUNK_LAYOUT_ENTRIES), 0);
    }
}
