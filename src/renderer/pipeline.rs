use glam::Mat4;

use super::vertex::TileVertex;

/// Uniform block bound at group 0, written once per tilemap per frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TilemapUniforms {
    /// Column-major `projection * world`.
    pub view_proj: [[f32; 4]; 4],
    pub shadow_color: [f32; 4],
    /// Current animation frame per axis.
    pub anim_frame: [f32; 2],
    /// The K of `offset + count * K` in the vertex `anim` channel.
    pub anim_stride: f32,
    /// Units with an index at or above this draw `shadow_color`.
    pub unit_count: f32,
}

pub struct TilemapPipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    pub uniforms_bind_group_layout: wgpu::BindGroupLayout,
    pub textures_bind_group_layout: wgpu::BindGroupLayout,
}

impl TilemapPipeline {
    /// Texture units the bundled shader samples from.
    pub const TEXTURE_UNITS: u32 = 4;
}

pub fn create_tilemap_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
) -> TilemapPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("tilemap_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/tilemap.wgsl").into()),
    });

    let uniforms_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tilemap_uniforms_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

    // One texture per unit, then the shared sampler.
    let mut texture_entries: Vec<wgpu::BindGroupLayoutEntry> = (0..TilemapPipeline::TEXTURE_UNITS)
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        })
        .collect();
    texture_entries.push(wgpu::BindGroupLayoutEntry {
        binding: TilemapPipeline::TEXTURE_UNITS,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });

    let textures_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tilemap_textures_bgl"),
            entries: &texture_entries,
        });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("tilemap_pipeline_layout"),
        bind_group_layouts: &[&uniforms_bind_group_layout, &textures_bind_group_layout],
        ..Default::default()
    });

    let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("tilemap_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[TileVertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    TilemapPipeline {
        render_pipeline,
        uniforms_bind_group_layout,
        textures_bind_group_layout,
    }
}

/// Linear sampler; the per-tile clamp rectangle keeps it from bleeding across
/// atlas entries.
pub fn create_tile_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("tilemap_sampler"),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

/// Orthographic projection mapping pixel coords (y down) to clip space.
pub fn orthographic_projection(width: f32, height: f32) -> Mat4 {
    Mat4::from_cols_array(&[
        2.0 / width, 0.0,           0.0, 0.0,
        0.0,         -2.0 / height, 0.0, 0.0,
        0.0,         0.0,           1.0, 0.0,
        -1.0,        1.0,           0.0, 1.0,
    ])
}
