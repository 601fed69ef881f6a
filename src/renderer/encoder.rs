// ── Quad geometry encoder ─────────────────────────────────────────────────────
//
// Expands tile records into GPU vertices, four per tile in top-left,
// top-right, bottom-right, bottom-left order. Records are walked in append
// order, which is also draw order.

use crate::config::TilemapSettings;
use crate::tile::TileRecord;

use super::d8;
use super::vertex::TileVertex;

/// How a tileset index maps onto a bound texture unit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TexturePacking {
    /// The texture index is the unit id; no UV shift.
    Direct,
    /// Several textures share one unit, tiled 2×2 into a virtual atlas:
    /// unit = `index / textures_per_unit`, and the low bits of the slot pick
    /// which quadrant (shifted by `offset_x` / `offset_y`) the texture lives in.
    SubAtlas { offset_x: f32, offset_y: f32, textures_per_unit: u32 },
}

impl TexturePacking {
    /// Unit id and `(shift_u, shift_v)` for `texture_index`.
    pub fn resolve(&self, texture_index: u32) -> (u32, f32, f32) {
        match *self {
            TexturePacking::Direct => (texture_index, 0.0, 0.0),
            TexturePacking::SubAtlas { offset_x, offset_y, textures_per_unit } => {
                let per_unit = textures_per_unit.max(1);
                let slot = texture_index % per_unit;
                let shift_u = offset_x * (slot & 1) as f32;
                let shift_v = offset_y * ((slot >> 1) & 1) as f32;
                (texture_index / per_unit, shift_u, shift_v)
            }
        }
    }
}

/// Constants the encoder reads from the settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EncodeParams {
    pub default_anim_count: f32,
    pub anim_count_stride: f32,
    pub uv_inset: f32,
    pub packing: TexturePacking,
}

impl EncodeParams {
    pub fn new(settings: &TilemapSettings, packing: TexturePacking) -> Self {
        Self {
            default_anim_count: settings.default_anim_count,
            anim_count_stride: settings.anim_count_stride,
            uv_inset: settings.uv_inset,
            packing,
        }
    }
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self::new(&TilemapSettings::default(), TexturePacking::Direct)
    }
}

/// Pack an animation offset and its wrap period into one channel.
#[inline]
pub fn encode_anim(offset: f32, count: f32, params: &EncodeParams) -> f32 {
    let count = if count == 0.0 { params.default_anim_count } else { count };
    offset + count * params.anim_count_stride
}

/// The four vertices of one tile.
pub fn encode_tile(record: &TileRecord, params: &EncodeParams) -> [TileVertex; 4] {
    let (unit, shift_u, shift_v) = params.packing.resolve(record.texture_index);

    let (x, y) = (record.x, record.y);
    let (w, h) = (record.tile_width, record.tile_height);
    let u = record.u + shift_u;
    let v = record.v + shift_v;
    let eps = params.uv_inset;

    let positions = [[x, y], [x + w, y], [x + w, y + h], [x, y + h]];
    let uvs = d8::rotated_corners(record.rotate, u, v, w, h);

    let template = TileVertex {
        position: [0.0; 2],
        uv: [0.0; 2],
        frame: [u + eps, v + eps, u + w - eps, v + h - eps],
        anim: [
            encode_anim(record.anim_x, record.anim_count_x, params),
            encode_anim(record.anim_y, record.anim_count_y, params),
        ],
        texture_id: unit as f32,
        anim_divisor: record.anim_divisor,
        alpha: record.alpha,
    };

    let mut quad = [template; 4];
    for (corner, vertex) in quad.iter_mut().enumerate() {
        vertex.position = positions[corner];
        vertex.uv = uvs[corner];
    }
    quad
}

/// Encode every record whose texture index is below `tileset_len` into `out`.
/// Returns the number of quads written; tiles with unknown textures are
/// skipped, so later tiles move up.
///
/// `out` must hold at least `records.len() * 4` vertices.
pub fn encode_tiles(
    records: impl Iterator<Item = TileRecord>,
    tileset_len: usize,
    params: &EncodeParams,
    out: &mut [TileVertex],
) -> usize {
    let mut quads = 0;
    for record in records {
        if record.texture_index as usize >= tileset_len {
            continue;
        }
        let start = quads * TileVertex::PER_QUAD;
        out[start..start + TileVertex::PER_QUAD].copy_from_slice(&encode_tile(&record, params));
        quads += 1;
    }
    quads
}
