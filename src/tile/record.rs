// ── Tile record layout ────────────────────────────────────────────────────────
//
// One painted tile is a fixed run of RECORD_SIZE floats inside the command
// buffer. The field order below is part of the contract: the value of field F
// of record N lives at `N * RECORD_SIZE + F`. Only this module indexes the
// flat storage; everything else goes through `TileRecord`.

/// Field positions inside one record.
#[repr(usize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TileField {
    U = 0,
    V,
    X,
    Y,
    TileWidth,
    TileHeight,
    Rotate,
    AnimX,
    AnimY,
    TextureIndex,
    AnimCountX,
    AnimCountY,
    AnimDivisor,
    Alpha,
    TintR,
    TintG,
    TintB,
    TintA,
}

/// Floats per record.
pub const RECORD_SIZE: usize = 18;

impl TileField {
    pub const ALL: [TileField; RECORD_SIZE] = [
        TileField::U,
        TileField::V,
        TileField::X,
        TileField::Y,
        TileField::TileWidth,
        TileField::TileHeight,
        TileField::Rotate,
        TileField::AnimX,
        TileField::AnimY,
        TileField::TextureIndex,
        TileField::AnimCountX,
        TileField::AnimCountY,
        TileField::AnimDivisor,
        TileField::Alpha,
        TileField::TintR,
        TileField::TintG,
        TileField::TintB,
        TileField::TintA,
    ];

    pub const fn offset(self) -> usize {
        self as usize
    }
}

/// Absolute position of `field` of record `record_index` in flat storage.
pub const fn field_offset(record_index: usize, field: TileField) -> usize {
    record_index * RECORD_SIZE + field.offset()
}

// ── TileRecord ────────────────────────────────────────────────────────────────

/// Decoded form of one record.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TileRecord {
    pub u: f32,
    pub v: f32,
    pub x: f32,
    pub y: f32,
    pub tile_width: f32,
    pub tile_height: f32,
    /// Dihedral group element, 0..8.
    pub rotate: u32,
    pub anim_x: f32,
    pub anim_y: f32,
    pub texture_index: u32,
    /// Frames before the X animation wraps; 0 means "never".
    pub anim_count_x: f32,
    pub anim_count_y: f32,
    pub anim_divisor: f32,
    pub alpha: f32,
    /// Carried through the record but not emitted to vertices.
    pub tint: [f32; 4],
}

impl TileRecord {
    /// Read a record from a slice of exactly `RECORD_SIZE` floats.
    pub fn decode(raw: &[f32]) -> Self {
        debug_assert_eq!(raw.len(), RECORD_SIZE);
        let f = |field: TileField| raw[field.offset()];
        Self {
            u: f(TileField::U),
            v: f(TileField::V),
            x: f(TileField::X),
            y: f(TileField::Y),
            tile_width: f(TileField::TileWidth),
            tile_height: f(TileField::TileHeight),
            rotate: f(TileField::Rotate) as u32,
            anim_x: f(TileField::AnimX),
            anim_y: f(TileField::AnimY),
            texture_index: f(TileField::TextureIndex) as u32,
            anim_count_x: f(TileField::AnimCountX),
            anim_count_y: f(TileField::AnimCountY),
            anim_divisor: f(TileField::AnimDivisor),
            alpha: f(TileField::Alpha),
            tint: [
                f(TileField::TintR),
                f(TileField::TintG),
                f(TileField::TintB),
                f(TileField::TintA),
            ],
        }
    }

    /// Write this record into a slice of exactly `RECORD_SIZE` floats.
    pub fn encode_into(&self, raw: &mut [f32]) {
        debug_assert_eq!(raw.len(), RECORD_SIZE);
        raw[TileField::U.offset()] = self.u;
        raw[TileField::V.offset()] = self.v;
        raw[TileField::X.offset()] = self.x;
        raw[TileField::Y.offset()] = self.y;
        raw[TileField::TileWidth.offset()] = self.tile_width;
        raw[TileField::TileHeight.offset()] = self.tile_height;
        raw[TileField::Rotate.offset()] = self.rotate as f32;
        raw[TileField::AnimX.offset()] = self.anim_x;
        raw[TileField::AnimY.offset()] = self.anim_y;
        raw[TileField::TextureIndex.offset()] = self.texture_index as f32;
        raw[TileField::AnimCountX.offset()] = self.anim_count_x;
        raw[TileField::AnimCountY.offset()] = self.anim_count_y;
        raw[TileField::AnimDivisor.offset()] = self.anim_divisor;
        raw[TileField::Alpha.offset()] = self.alpha;
        raw[TileField::TintR.offset()] = self.tint[0];
        raw[TileField::TintG.offset()] = self.tint[1];
        raw[TileField::TintB.offset()] = self.tint[2];
        raw[TileField::TintA.offset()] = self.tint[3];
    }

    pub fn is_animated(&self) -> bool {
        self.anim_x != 0.0 || self.anim_y != 0.0
    }

    /// Destination rectangle as `(x0, y0, x1, y1)`.
    pub fn dest_rect(&self) -> (f32, f32, f32, f32) {
        (self.x, self.y, self.x + self.tile_width, self.y + self.tile_height)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
