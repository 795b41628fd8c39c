//! Strip Renderer
//!
//! Draws every chunk of the loaded segments into the offscreen target and
//! reads the result back as an image. Chunks are placed with
//! [`ChunkLayout`], framed by an orthographic camera looking down `-z`, and
//! drawn with one bind group each over a shared subdivided reference plane.

use glam::{Mat4, Vec2, Vec3};
use image::RgbaImage;

use crate::assets::LoadedSegment;
use crate::config::StripConfig;
use crate::error::{AssetError, RenderError};
use crate::strip::{
    ChunkLayout, ChunkPlacement, GridAxis, StageFeatures, SurfaceField, SurfaceParams,
};

use super::gpu_context::{GpuContext, GpuContextConfig};
use super::scroll_material::{ChunkBinding, ChunkTextures, ChunkVertex, ScrollMaterial};
use super::shader_loader::ShaderSource;
use super::uniforms::ChunkUniforms;

/// Grid resolution of the reference plane along each side.
pub const PLANE_SUBDIVISIONS: u32 = 100;

pub struct StripRenderer {
    ctx: GpuContext,
    material: ScrollMaterial,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    config: StripConfig,
}

impl StripRenderer {
    /// Create a renderer with its own headless GPU context
    pub fn new(config: StripConfig) -> Result<Self, RenderError> {
        Self::with_shader(config, &ShaderSource::strip())
    }

    /// Like [`StripRenderer::new`], drawing with a replacement shader
    pub fn with_shader(config: StripConfig, source: &ShaderSource) -> Result<Self, RenderError> {
        config.validate()?;
        let ctx = GpuContext::new(config.width, config.height, GpuContextConfig::default())?;
        Ok(Self::build(ctx, config, source))
    }

    fn build(ctx: GpuContext, config: StripConfig, source: &ShaderSource) -> Self {
        let material = ScrollMaterial::with_shader(&ctx.device, &ctx.queue, ctx.format(), source);
        let (vertices, indices) = ChunkVertex::reference_plane(PLANE_SUBDIVISIONS, PLANE_SUBDIVISIONS);
        let vertex_buffer = ctx.create_vertex_buffer("Reference Plane Vertices", &vertices);
        let index_buffer = ctx.create_index_buffer("Reference Plane Indices", &indices);

        Self {
            ctx,
            material,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            config,
        }
    }

    pub fn config(&self) -> &StripConfig {
        &self.config
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    /// Render all segments for one frame
    pub fn render(
        &self,
        axis: &GridAxis,
        segments: &[LoadedSegment],
        params: &SurfaceParams,
    ) -> Result<RgbaImage, RenderError> {
        let layout = ChunkLayout::new(axis, self.config.units_per_pixel);
        let placements = segments
            .iter()
            .map(|segment| layout.place_segment(&segment.geometry()))
            .collect::<Result<Vec<_>, _>>()?;

        let all: Vec<ChunkPlacement> = placements.iter().flatten().cloned().collect();
        let view_proj = fit_view_proj(&all, &self.config);

        let bindings = self.create_bindings(segments, &placements, view_proj, params)?;

        let (width, height) = self.ctx.dimensions();
        let clear = self.config.clear_color.as_dvec4();
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Strip Render Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Strip Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.ctx.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.x,
                            g: clear.y,
                            b: clear.z,
                            a: clear.w,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            for binding in &bindings {
                self.material.bind(&mut pass, binding);
                pass.draw_indexed(0..self.index_count, 0, 0..1);
            }
        }
        self.ctx.queue.submit(std::iter::once(encoder.finish()));

        log::info!(
            "[StripRenderer] Drew {} chunks at wrap {:.3} ({}x{})",
            bindings.len(),
            params.wrap,
            width,
            height
        );

        let pixels = self.ctx.read_color()?;
        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| RenderError::Readback("readback size does not match target".into()))
    }

    fn create_bindings(
        &self,
        segments: &[LoadedSegment],
        placements: &[Vec<ChunkPlacement>],
        view_proj: Mat4,
        params: &SurfaceParams,
    ) -> Result<Vec<ChunkBinding>, RenderError> {
        let mut bindings = Vec::new();
        for (segment, placed) in segments.iter().zip(placements) {
            let position_coarse = self.upload(&format!("{} position", segment.id), &segment.position.coarse);
            let position_fine = segment
                .position
                .fine
                .as_ref()
                .map(|f| self.upload(&format!("{} position fine", segment.id), f));
            let surface = segment
                .surface
                .as_ref()
                .map(|f| self.upload(&format!("{} surface", segment.id), f));

            for (chunk, placement) in segment.chunks.iter().zip(placed) {
                let id = &chunk.geometry.id;
                let uv_coarse = self.upload(&format!("{id} uv"), &chunk.uv.coarse);
                let uv_fine = chunk.uv.fine.as_ref().map(|f| self.upload(&format!("{id} uv fine"), f));
                let edges = self.upload(&format!("{id} edges"), chunk.edges.field());
                let tile = chunk.color.as_ref().map(|f| self.upload(&format!("{id} color"), f));
                let (color, segment_color) = match (&tile, &surface) {
                    (Some(view), _) => (view, false),
                    (None, Some(view)) => (view, true),
                    (None, None) => {
                        return Err(AssetError::Invalid(format!(
                            "chunk '{id}' of segment '{}' has no colour source",
                            segment.id
                        ))
                        .into());
                    }
                };

                let features = StageFeatures {
                    segment_color,
                    ..self.config.features
                };
                let mut uniforms = ChunkUniforms::for_placement(
                    view_proj,
                    placement,
                    features,
                    &self.config.decode,
                    &self.config.seam_targets,
                );
                uniforms.set_frame(params);

                let textures = ChunkTextures {
                    position_coarse: &position_coarse,
                    position_fine: position_fine.as_ref(),
                    uv_coarse: &uv_coarse,
                    uv_fine: uv_fine.as_ref(),
                    edge_distance: &edges,
                    color,
                };
                bindings.push(self.material.create_chunk_binding(&self.ctx.device, &textures, &uniforms));
            }
        }
        Ok(bindings)
    }

    fn upload(&self, label: &str, field: &SurfaceField) -> wgpu::TextureView {
        self.ctx
            .create_field_texture(label, field.width(), field.height(), &field.to_rgba8())
    }
}

/// Orthographic camera framing every placement, and the rolled surface's
/// height along `y`, at the output aspect ratio.
///
/// Looks down `-z` from `depth_range / 2` so the strip plane sits mid-volume.
pub fn fit_view_proj(placements: &[ChunkPlacement], config: &StripConfig) -> Mat4 {
    let (min, max) = if placements.is_empty() {
        (Vec2::splat(-0.5), Vec2::splat(0.5))
    } else {
        placements.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), p| {
                let center = Vec2::new(p.center_x, 0.0);
                let half = Vec2::new(p.scale_x, p.scale_y) * 0.5;
                (min.min(center - half), max.max(center + half))
            },
        )
    };

    // rolled cross-section, centred on the strip axis
    let rolled = config.decode.extent.y.abs() * 0.5;
    let (min, max) = (min.with_y(min.y.min(-rolled)), max.with_y(max.y.max(rolled)));

    let center = (min + max) * 0.5;
    let mut half = ((max - min) * 0.5 * (1.0 + config.fit_padding.max(0.0))).max(Vec2::splat(1e-3));
    let aspect = config.width as f32 / config.height.max(1) as f32;
    if half.x / half.y < aspect {
        half.x = half.y * aspect;
    } else {
        half.y = half.x / aspect;
    }

    let depth = config.depth_range;
    let view = Mat4::look_at_rh(center.extend(depth * 0.5), center.extend(0.0), Vec3::Y);
    let proj = Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, 0.0, depth);
    proj * view
}
