//! Renders a 64×64 animated tile field into an offscreen texture and saves
//! the last frame as `offscreen.png`.
//!
//! Run with `RUST_LOG=debug cargo run --example offscreen`.

use image::{Rgba, RgbaImage};
use wgpu::util::DeviceExt;

use tilebatch::renderer::pipeline::{create_tile_sampler, orthographic_projection};
use tilebatch::renderer::{FrameUniforms, GpuTilemap, TilemapRenderer};
use tilebatch::{
    BaseTextureId, CompositeSignal, TextureHandle, TileOptions, Tilemap, TilemapSettings, Tileset,
};

const TILE: u32 = 16;
const GRID: u32 = 64;
const TARGET: u32 = TILE * GRID;

/// 4×1 strip of 16px tiles, each a differently tinted checker.
fn tile_strip() -> RgbaImage {
    let colors = [
        [0x3C, 0x8D, 0x2F, 0xFF],
        [0x82, 0x74, 0x66, 0xFF],
        [0x2B, 0x5F, 0xB8, 0xFF],
        [0xC9, 0xA2, 0x27, 0xFF],
    ];
    let mut img = RgbaImage::new(TILE * colors.len() as u32, TILE);
    for (i, color) in colors.iter().enumerate() {
        for y in 0..TILE {
            for x in 0..TILE {
                let dark = ((x / 4) + (y / 4)) % 2 == 0;
                let c = if dark {
                    [color[0] / 2, color[1] / 2, color[2] / 2, 0xFF]
                } else {
                    *color
                };
                img.put_pixel(i as u32 * TILE + x, y, Rgba(c));
            }
        }
    }
    img
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    pollster::block_on(run())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let instance = wgpu::Instance::default();
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions::default())
        .await?;
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor::default())
        .await?;

    // ── Texture ───────────────────────────────────────────────────────────
    let strip = tile_strip();
    let texture = device.create_texture_with_data(
        &queue,
        &wgpu::TextureDescriptor {
            label: Some("tile_strip"),
            size: wgpu::Extent3d {
                width: strip.width(),
                height: strip.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &strip,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = create_tile_sampler(&device);

    // ── Tilemap ───────────────────────────────────────────────────────────
    let strip_handle = TextureHandle::new(BaseTextureId(1), strip.width() as f32, TILE as f32);
    let mut tilemap = Tilemap::new(Tileset::from_textures([strip_handle.clone()]));
    for gy in 0..GRID {
        for gx in 0..GRID {
            let kind = (gx * 7 + gy * 3) % 4;
            let mut options = TileOptions::new()
                .source((kind * TILE) as f32, 0.0)
                .size(TILE as f32, TILE as f32)
                .rotate((gx + gy) % 4 * 2);
            if kind == 2 {
                // Water cycles through all four tiles.
                options = options.anim(TILE as f32, 0.0).anim_count(4.0, 1.0).anim_divisor(8.0);
            }
            tilemap.tile(&strip_handle, (gx * TILE) as f32, (gy * TILE) as f32, &options)?;
        }
    }
    log::info!("bounds: {:?}", tilemap.local_bounds(None));

    // ── Render ────────────────────────────────────────────────────────────
    let format = wgpu::TextureFormat::Rgba8UnormSrgb;
    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen_target"),
        size: wgpu::Extent3d { width: TARGET, height: TARGET, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let mut renderer = TilemapRenderer::new(&device, format, TilemapSettings::default())?;
    let textures = renderer.texture_bind_group(&device, &[&view], &sampler)?;
    let mut gpu = GpuTilemap::new(&device, &renderer);
    let projection = orthographic_projection(TARGET as f32, TARGET as f32);

    for frame_index in 0..4u32 {
        let frame = FrameUniforms {
            anim_frame: [frame_index as f32 * 8.0, 0.0],
            ..FrameUniforms::new(projection)
        };
        let Some(call) = renderer.prepare(
            &device,
            &queue,
            &mut tilemap,
            &CompositeSignal::STANDALONE,
            &mut gpu,
            &frame,
        ) else {
            continue;
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("offscreen_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("offscreen_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            renderer.draw(&mut pass, &gpu, &textures, &call);
        }
        queue.submit(std::iter::once(encoder.finish()));

        log::info!(
            "frame {frame_index}: {} triangles, {} vertex bytes",
            call.triangle_count,
            tilemap.vertex_bytes().len()
        );
    }

    let pixels = read_back(&device, &queue, &target)?;
    let img = RgbaImage::from_raw(TARGET, TARGET, pixels).ok_or("readback size mismatch")?;
    img.save("offscreen.png")?;
    log::info!("wrote offscreen.png");

    Ok(())
}

/// Copy `texture` into a mappable buffer and return its rows, unpadded.
fn read_back(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let (width, height) = (texture.width(), texture.height());
    let row_bytes = width * 4;
    let padded_row = row_bytes.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("offscreen_readback"),
        size: u64::from(padded_row) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("offscreen_readback_encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = readback.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |res| {
        let _ = sender.send(res);
    });
    device.poll(wgpu::PollType::wait_indefinitely())?;
    receiver.recv()??;

    let mapped = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((row_bytes * height) as usize);
    for row in mapped.chunks_exact(padded_row as usize) {
        pixels.extend_from_slice(&row[..row_bytes as usize]);
    }
    drop(mapped);
    readback.unmap();
    Ok(pixels)
}
