pub mod d8;
pub mod encoder;
pub mod pipeline;
pub mod vertex;
pub mod vertex_buffer;

use glam::Mat4;
use wgpu::util::DeviceExt;

use pipeline::{TilemapPipeline, TilemapUniforms, create_tilemap_pipeline};
use vertex::{TileVertex, quad_indices};

use crate::composite::{CompositeSignal, CompositeTilemap};
use crate::config::TilemapSettings;
use crate::error::TilemapError;
use crate::tilemap::Tilemap;

/// Transform and animation state supplied once per draw.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameUniforms {
    pub projection: Mat4,
    /// Tilemap-local to world transform from the scene graph.
    pub world: Mat4,
    pub anim_frame: [f32; 2],
}

impl FrameUniforms {
    pub fn new(projection: Mat4) -> Self {
        Self { projection, world: Mat4::IDENTITY, anim_frame: [0.0, 0.0] }
    }
}

/// Index range of one indexed draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub first_index: u32,
    pub index_count: u32,
    pub triangle_count: u32,
}

impl DrawCall {
    pub fn for_quads(quads: usize) -> Self {
        let index_count = (quads * TileVertex::INDICES_PER_QUAD) as u32;
        Self { first_index: 0, index_count, triangle_count: index_count / 3 }
    }
}

// ── GpuTilemap ────────────────────────────────────────────────────────────────

/// GPU mirror of one tilemap's vertex stream and uniforms.
pub struct GpuTilemap {
    vertex_buffer: Option<wgpu::Buffer>,
    /// Storage generation of the CPU buffer the GPU buffer was created for.
    generation: Option<u64>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl GpuTilemap {
    pub fn new(device: &wgpu::Device, renderer: &TilemapRenderer) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tilemap_uniforms"),
            size: std::mem::size_of::<TilemapUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tilemap_uniforms_bg"),
            layout: &renderer.pipeline.uniforms_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        Self { vertex_buffer: None, generation: None, uniform_buffer, uniform_bind_group }
    }

    /// Drop the vertex storage; the next upload re-creates it.
    pub fn context_lost(&mut self) {
        self.vertex_buffer = None;
        self.generation = None;
    }
}

// ── TilemapRenderer ───────────────────────────────────────────────────────────

/// Issues tilemap draws: one indexed draw per tilemap (or composite layer),
/// sharing a single quad index buffer.
///
/// Textures are expected to hold premultiplied alpha.
pub struct TilemapRenderer {
    pipeline: TilemapPipeline,
    settings: TilemapSettings,
    index_buffer: Option<wgpu::Buffer>,
    /// Quads the current index buffer covers.
    index_capacity: usize,
}

impl TilemapRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        settings: TilemapSettings,
    ) -> Result<Self, TilemapError> {
        settings.validate()?;
        if settings.max_texture_units > TilemapPipeline::TEXTURE_UNITS {
            return Err(TilemapError::InvalidSettings(format!(
                "max_texture_units {} exceeds the {} units the tilemap shader binds",
                settings.max_texture_units,
                TilemapPipeline::TEXTURE_UNITS
            )));
        }
        Ok(Self {
            pipeline: create_tilemap_pipeline(device, surface_format),
            settings,
            index_buffer: None,
            index_capacity: 0,
        })
    }

    /// Bind group for up to `max_texture_units` texture views. Missing units
    /// repeat the first view; the shader never samples them.
    pub fn texture_bind_group(
        &self,
        device: &wgpu::Device,
        views: &[&wgpu::TextureView],
        sampler: &wgpu::Sampler,
    ) -> Result<wgpu::BindGroup, TilemapError> {
        let first = *views.first().ok_or(TilemapError::NoTextures)?;
        if views.len() > self.settings.max_texture_units as usize {
            log::warn!(
                "tilemap renderer: {} texture views given, binding the first {}",
                views.len(),
                self.settings.max_texture_units
            );
        }

        let mut entries: Vec<wgpu::BindGroupEntry> = (0..TilemapPipeline::TEXTURE_UNITS)
            .map(|unit| {
                let view = views
                    .get(unit as usize)
                    .filter(|_| unit < self.settings.max_texture_units)
                    .copied()
                    .unwrap_or(first);
                wgpu::BindGroupEntry {
                    binding: unit,
                    resource: wgpu::BindingResource::TextureView(view),
                }
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: TilemapPipeline::TEXTURE_UNITS,
            resource: wgpu::BindingResource::Sampler(sampler),
        });

        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tilemap_textures_bg"),
            layout: &self.pipeline.textures_bind_group_layout,
            entries: &entries,
        }))
    }

    /// Encode `tilemap` if needed and bring its GPU copy up to date.
    /// Returns `None` when there is nothing to draw.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        tilemap: &mut Tilemap,
        signal: &CompositeSignal,
        gpu: &mut GpuTilemap,
        frame: &FrameUniforms,
    ) -> Option<DrawCall> {
        let reencoded = tilemap.prepare(signal);
        self.upload(device, queue, tilemap, reencoded, gpu, frame)
    }

    /// Prepare every layer of `composite`. `gpus` grows to one mirror per
    /// layer. Returns `(layer, draw)` for each non-empty layer, in draw order.
    pub fn prepare_composite(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        composite: &mut CompositeTilemap,
        gpus: &mut Vec<GpuTilemap>,
        frame: &FrameUniforms,
    ) -> Vec<(usize, DrawCall)> {
        let encoded = composite.prepare_layers();
        let frame = FrameUniforms { anim_frame: composite.tile_anim(), ..*frame };

        while gpus.len() < composite.layers().len() {
            gpus.push(GpuTilemap::new(device, self));
        }

        composite
            .layers()
            .iter()
            .zip(gpus.iter_mut())
            .zip(encoded)
            .enumerate()
            .filter_map(|(i, ((layer, gpu), reencoded))| {
                self.upload(device, queue, layer, reencoded, gpu, &frame)
                    .map(|call| (i, call))
            })
            .collect()
    }

    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        tilemap: &Tilemap,
        reencoded: bool,
        gpu: &mut GpuTilemap,
        frame: &FrameUniforms,
    ) -> Option<DrawCall> {
        let uniforms = TilemapUniforms {
            view_proj: (frame.projection * frame.world).to_cols_array_2d(),
            shadow_color: self.settings.shadow_color,
            anim_frame: frame.anim_frame,
            anim_stride: self.settings.anim_count_stride,
            unit_count: self.settings.max_texture_units as f32,
        };
        queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let quads = tilemap.quad_count();
        if quads == 0 {
            return None;
        }

        let cpu = tilemap.vertex_buffer();
        let bytes = cpu.as_bytes();
        let same_storage =
            gpu.vertex_buffer.is_some() && gpu.generation == Some(cpu.generation());
        if same_storage {
            if let (true, Some(buffer)) = (reencoded, &gpu.vertex_buffer) {
                queue.write_buffer(buffer, 0, bytes);
            }
        } else {
            // Storage identity changed: re-create rather than patch.
            log::debug!(
                "tilemap renderer: creating vertex buffer ({} bytes, generation {})",
                cpu.capacity_bytes(),
                cpu.generation()
            );
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("tilemap_vertex_buffer"),
                size: cpu.capacity_bytes() as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            queue.write_buffer(&buffer, 0, bytes);
            gpu.vertex_buffer = Some(buffer);
            gpu.generation = Some(cpu.generation());
        }

        self.ensure_indices(device, quads);
        Some(DrawCall::for_quads(quads))
    }

    /// Grow the shared index buffer, doubling, to cover `quads`.
    fn ensure_indices(&mut self, device: &wgpu::Device, quads: usize) {
        if quads <= self.index_capacity && self.index_buffer.is_some() {
            return;
        }
        let mut capacity = self.index_capacity.max(1);
        while capacity < quads {
            capacity *= 2;
        }
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tilemap_index_buffer"),
            contents: bytemuck::cast_slice(&quad_indices(capacity)),
            usage: wgpu::BufferUsages::INDEX,
        }));
        self.index_capacity = capacity;
    }

    /// Record the draw for `gpu` into `pass`.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        gpu: &GpuTilemap,
        textures: &wgpu::BindGroup,
        call: &DrawCall,
    ) {
        let (Some(vertices), Some(indices)) = (&gpu.vertex_buffer, &self.index_buffer) else {
            return;
        };
        pass.set_pipeline(&self.pipeline.render_pipeline);
        pass.set_bind_group(0, &gpu.uniform_bind_group, &[]);
        pass.set_bind_group(1, textures, &[]);
        pass.set_vertex_buffer(0, vertices.slice(..));
        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(call.first_index..call.first_index + call.index_count, 0, 0..1);
    }

    /// The device lost its resources: rebuild everything on the next prepare.
    pub fn on_context_lost(&mut self, tilemap: &mut Tilemap, gpu: &mut GpuTilemap) {
        tilemap.invalidate_gpu();
        gpu.context_lost();
        self.index_buffer = None;
        self.index_capacity = 0;
    }
}
