use serde::Deserialize;

use crate::error::TilemapError;

// ── TilemapSettings ───────────────────────────────────────────────────────────

/// Tunables shared by every tilemap and the renderer.
///
/// All fields have defaults, so a settings file only has to name the values it
/// overrides:
///
/// ```json
/// { "uv_inset": 0.25, "max_texture_units": 8 }
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TilemapSettings {
    /// Frame count substituted for "0" in a tile's animation count.
    /// Large enough that the animation never wraps in practice.
    pub default_anim_count: f32,
    /// Multiplier packing the frame count above the per-frame offset in the
    /// vertex `anim` channel: `encoded = offset + count * stride`.
    pub anim_count_stride: f32,
    /// Texel inset of the per-tile clamp rectangle.
    pub uv_inset: f32,
    /// How many tileset slots share one texture unit in a composite layer.
    pub textures_per_unit: u32,
    /// Texture units bound per draw call by the wgpu pipeline.
    pub max_texture_units: u32,
    /// RGBA uniform drawn for tiles whose texture unit is not bound.
    pub shadow_color: [f32; 4],
}

impl Default for TilemapSettings {
    fn default() -> Self {
        Self {
            default_anim_count: Self::DEFAULT_ANIM_COUNT,
            anim_count_stride: Self::ANIM_COUNT_STRIDE,
            uv_inset: Self::UV_INSET,
            textures_per_unit: Self::TEXTURES_PER_UNIT,
            max_texture_units: Self::MAX_TEXTURE_UNITS,
            shadow_color: [0.0, 0.0, 0.0, 0.5],
        }
    }
}

impl TilemapSettings {
    pub const DEFAULT_ANIM_COUNT: f32 = 1024.0;
    pub const ANIM_COUNT_STRIDE: f32 = 2048.0;
    pub const UV_INSET: f32 = 0.5;
    pub const TEXTURES_PER_UNIT: u32 = 4;
    pub const MAX_TEXTURE_UNITS: u32 = 4;

    /// Parse settings from a JSON document and validate them.
    pub fn from_json(json: &str) -> Result<Self, TilemapError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the encoder cannot work with.
    pub fn validate(&self) -> Result<(), TilemapError> {
        if self.textures_per_unit == 0 {
            return Err(TilemapError::InvalidSettings(
                "textures_per_unit must be at least 1".into(),
            ));
        }
        if self.max_texture_units == 0 {
            return Err(TilemapError::InvalidSettings(
                "max_texture_units must be at least 1".into(),
            ));
        }
        if !(self.anim_count_stride > 0.0) {
            return Err(TilemapError::InvalidSettings(format!(
                "anim_count_stride must be positive, got {}",
                self.anim_count_stride
            )));
        }
        if !(self.uv_inset >= 0.0) {
            return Err(TilemapError::InvalidSettings(format!(
                "uv_inset must not be negative, got {}",
                self.uv_inset
            )));
        }
        Ok(())
    }

    /// Tileset slots a single composite layer can reference. Textures only
    /// share a unit when more than one unit is bound; a lone unit holds one.
    pub fn textures_per_layer(&self) -> usize {
        if self.max_texture_units > 1 {
            (self.max_texture_units * self.textures_per_unit) as usize
        } else {
            1
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
