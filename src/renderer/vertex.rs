/// One corner of an encoded tile quad.
///
/// All coordinates are in pixels: `position` in tilemap-local space, `uv` and
/// `frame` in the texture's pixel space (the shader divides by the texture size).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    /// Clamp rectangle `(u0, v0, u1, v1)`, inset from the tile's source region
    /// so linear filtering never samples a neighbouring atlas entry.
    pub frame: [f32; 4],
    /// Per-axis `offset + count * stride`, unpacked by the vertex shader.
    pub anim: [f32; 2],
    pub texture_id: f32,
    pub anim_divisor: f32,
    pub alpha: f32,
}

impl TileVertex {
    /// Vertices emitted per tile.
    pub const PER_QUAD: usize = 4;
    /// Indices (two triangles) drawn per tile.
    pub const INDICES_PER_QUAD: usize = 6;
    /// Size of one vertex in bytes.
    pub const STRIDE: usize = std::mem::size_of::<TileVertex>();

    const ATTRIBS: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        0 => Float32x2,  // position
        1 => Float32x2,  // uv
        2 => Float32x4,  // frame
        3 => Float32x2,  // anim
        4 => Float32,    // texture_id
        5 => Float32,    // anim_divisor
        6 => Float32,    // alpha
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Index list for `quads` consecutive quads: `[0, 1, 2, 0, 2, 3]` shifted by
/// four per quad.
pub fn quad_indices(quads: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(quads * TileVertex::INDICES_PER_QUAD);
    for q in 0..quads as u32 {
        let base = q * TileVertex::PER_QUAD as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    indices
}
