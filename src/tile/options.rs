use serde::Deserialize;

use crate::config::TilemapSettings;

/// Per-tile configuration of an append.
///
/// `None` for the source origin or size means "take it from the texture":
/// the frame origin for `u`/`v`, the natural size for the tile size.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TileOptions {
    pub u: Option<f32>,
    pub v: Option<f32>,
    pub tile_width: Option<f32>,
    pub tile_height: Option<f32>,
    /// Pixel stride added to `u` per animation frame.
    pub anim_x: f32,
    /// Pixel stride added to `v` per animation frame.
    pub anim_y: f32,
    pub rotate: u32,
    pub anim_count_x: f32,
    pub anim_count_y: f32,
    pub anim_divisor: f32,
    pub alpha: f32,
    pub tint: [f32; 4],
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            u: None,
            v: None,
            tile_width: None,
            tile_height: None,
            anim_x: 0.0,
            anim_y: 0.0,
            rotate: 0,
            anim_count_x: TilemapSettings::DEFAULT_ANIM_COUNT,
            anim_count_y: TilemapSettings::DEFAULT_ANIM_COUNT,
            anim_divisor: 1.0,
            alpha: 1.0,
            tint: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl TileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, u: f32, v: f32) -> Self {
        self.u = Some(u);
        self.v = Some(v);
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.tile_width = Some(width);
        self.tile_height = Some(height);
        self
    }

    pub fn rotate(mut self, code: u32) -> Self {
        self.rotate = code;
        self
    }

    pub fn anim(mut self, anim_x: f32, anim_y: f32) -> Self {
        self.anim_x = anim_x;
        self.anim_y = anim_y;
        self
    }

    pub fn anim_count(mut self, count_x: f32, count_y: f32) -> Self {
        self.anim_count_x = count_x;
        self.anim_count_y = count_y;
        self
    }

    pub fn anim_divisor(mut self, divisor: f32) -> Self {
        self.anim_divisor = divisor;
        self
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn tint(mut self, tint: [f32; 4]) -> Self {
        self.tint = tint;
        self
    }
}
