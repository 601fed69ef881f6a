// =============================================================================
// COMPOSITE.RS — Layered tilemaps sharing texture units
//
// A single draw call can only bind `max_texture_units` textures. The composite
// splits an unbounded stream of tiles across `Tilemap` layers, each limited to
// as many tileset slots as the bound units can address once several textures
// are packed into every unit (see `TexturePacking::SubAtlas`).
// =============================================================================

use crate::bounds::Bounds;
use crate::config::TilemapSettings;
use crate::error::TilemapError;
use crate::renderer::encoder::TexturePacking;
use crate::tile::{TileId, TileOptions};
use crate::tilemap::Tilemap;
use crate::tileset::{TextureHandle, TextureLookup, TileTexture, Tileset};

// ── CompositeSignal ───────────────────────────────────────────────────────────

/// Per-frame input a tilemap reads from its parent when it encodes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CompositeSignal {
    /// The tilemap is a layer of a composite and may use sub-atlas packing.
    pub member: bool,
    /// Sub-atlas quadrant size in texture pixels.
    pub offset_x: f32,
    pub offset_y: f32,
    /// Textures packed into one bound unit.
    pub textures_per_unit: u32,
    /// Texture units bound per draw call.
    pub texture_units: u32,
    /// The parent's animation frame changed; re-encode even if nothing else did.
    pub anim_refresh: bool,
}

impl CompositeSignal {
    /// Signal for a tilemap that is drawn on its own.
    pub const STANDALONE: CompositeSignal = CompositeSignal {
        member: false,
        offset_x: 0.0,
        offset_y: 0.0,
        textures_per_unit: 1,
        texture_units: 1,
        anim_refresh: false,
    };

    /// Sub-atlas packing for composite layers drawn with several units bound;
    /// with a single unit the texture index is the unit id.
    pub fn packing(&self) -> TexturePacking {
        if self.member && self.texture_units > 1 {
            TexturePacking::SubAtlas {
                offset_x: self.offset_x,
                offset_y: self.offset_y,
                textures_per_unit: self.textures_per_unit,
            }
        } else {
            TexturePacking::Direct
        }
    }
}

impl Default for CompositeSignal {
    fn default() -> Self {
        Self::STANDALONE
    }
}

// ── CompositeTileId ───────────────────────────────────────────────────────────

/// Handle to a tile inside one layer of a composite.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompositeTileId {
    pub layer: usize,
    pub tile: TileId,
}

// ── CompositeTilemap ──────────────────────────────────────────────────────────

pub struct CompositeTilemap {
    layers: Vec<Tilemap>,
    /// Layer that received the most recent tile. Tiles are never routed to an
    /// earlier layer by texture, so append order stays draw order.
    current: usize,
    last: Option<CompositeTileId>,
    settings: TilemapSettings,
    texture_offset: [f32; 2],
    tile_anim: [f32; 2],
    anim_refresh: bool,
    lookup: Option<Box<dyn TextureLookup>>,
}

impl CompositeTilemap {
    /// Quadrant size used for sub-atlas packing unless overridden.
    pub const DEFAULT_TEXTURE_OFFSET: f32 = 1024.0;

    /// Spread `tileset` over as many layers as it needs.
    pub fn new(tileset: Tileset, settings: TilemapSettings) -> Result<Self, TilemapError> {
        settings.validate()?;
        let mut composite = Self {
            layers: Vec::new(),
            current: 0,
            last: None,
            settings,
            texture_offset: [Self::DEFAULT_TEXTURE_OFFSET; 2],
            tile_anim: [0.0, 0.0],
            anim_refresh: false,
            lookup: None,
        };

        let per_layer = composite.settings.textures_per_layer();
        let textures: Vec<TextureHandle> = tileset.iter().cloned().collect();
        for chunk in textures.chunks(per_layer) {
            let layer = Tilemap::with_settings(
                Tileset::from_textures(chunk.iter().cloned()),
                composite.settings.clone(),
            )?;
            composite.layers.push(layer);
        }
        Ok(composite)
    }

    pub fn with_lookup(mut self, lookup: impl TextureLookup + 'static) -> Self {
        self.lookup = Some(Box::new(lookup));
        self
    }

    /// Quadrant size of the sub-atlas every bound unit is tiled into.
    pub fn set_texture_offset(&mut self, offset_x: f32, offset_y: f32) {
        self.texture_offset = [offset_x, offset_y];
        // Shifted UVs are baked into the vertices.
        self.anim_refresh = true;
    }

    pub fn layers(&self) -> &[Tilemap] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Tilemap] {
        &mut self.layers
    }

    pub fn settings(&self) -> &TilemapSettings {
        &self.settings
    }

    // ── Appending ─────────────────────────────────────────────────────────────

    /// Paint `texture` at (`x`, `y`) on the appropriate layer.
    ///
    /// A numeric index addresses the composite's global tileset: layer
    /// `index / per_layer`, slot `index % per_layer`. A handle goes to the
    /// first layer at or after the current one that already holds its base
    /// texture or still has a free slot; a new layer is opened otherwise.
    pub fn tile<'a>(
        &mut self,
        texture: impl Into<TileTexture<'a>>,
        x: f32,
        y: f32,
        options: &TileOptions,
    ) -> Result<CompositeTileId, TilemapError> {
        let per_layer = self.settings.textures_per_layer();

        let (layer, tile) = match texture.into() {
            TileTexture::Index(index) => {
                let layer = index as usize / per_layer;
                let local = (index as usize % per_layer) as u32;
                let Some(target) = self.layers.get_mut(layer) else {
                    let err = TilemapError::UnresolvedTexture(format!("index {index}"));
                    log::warn!("composite tilemap: {err}; tile at ({x}, {y}) skipped");
                    return Err(err);
                };
                (layer, target.tile(local, x, y, options)?)
            }
            TileTexture::Handle(handle) => self.tile_handle(handle, x, y, options)?,
            TileTexture::Key(key) => {
                let Some(handle) = self.lookup.as_ref().and_then(|l| l.lookup(key)) else {
                    let err = TilemapError::UnresolvedTexture(key.to_string());
                    log::warn!("composite tilemap: {err}; tile at ({x}, {y}) skipped");
                    return Err(err);
                };
                self.tile_handle(&handle, x, y, options)?
            }
        };

        self.current = layer;
        let id = CompositeTileId { layer, tile };
        self.last = Some(id);
        Ok(id)
    }

    fn tile_handle(
        &mut self,
        handle: &TextureHandle,
        x: f32,
        y: f32,
        options: &TileOptions,
    ) -> Result<(usize, TileId), TilemapError> {
        let per_layer = self.settings.textures_per_layer();

        let found = (self.current..self.layers.len()).find(|&i| {
            let tileset = self.layers[i].tileset();
            tileset.index_of(handle.base).is_some() || tileset.len() < per_layer
        });
        let layer = match found {
            Some(i) => i,
            None => {
                log::debug!("composite tilemap: opening layer {}", self.layers.len());
                self.layers
                    .push(Tilemap::with_settings(Tileset::new(), self.settings.clone())?);
                self.layers.len() - 1
            }
        };

        let target = &mut self.layers[layer];
        if target.tileset().index_of(handle.base).is_none() {
            target.add_texture(handle.clone());
        }
        Ok((layer, target.tile(handle, x, y, options)?))
    }

    // ── Editing ───────────────────────────────────────────────────────────────

    fn layer_of(&mut self, id: CompositeTileId) -> Result<&mut Tilemap, TilemapError> {
        self.layers
            .get_mut(id.layer)
            .ok_or(TilemapError::StaleTile(id.tile))
    }

    pub fn tile_rotate(&mut self, id: CompositeTileId, rotate: u32) -> Result<(), TilemapError> {
        self.layer_of(id)?.tile_rotate(id.tile, rotate)
    }

    pub fn tile_anim_x(&mut self, id: CompositeTileId, offset: f32, count: f32) -> Result<(), TilemapError> {
        self.layer_of(id)?.tile_anim_x(id.tile, offset, count)
    }

    pub fn tile_anim_y(&mut self, id: CompositeTileId, offset: f32, count: f32) -> Result<(), TilemapError> {
        self.layer_of(id)?.tile_anim_y(id.tile, offset, count)
    }

    pub fn tile_anim_divisor(&mut self, id: CompositeTileId, divisor: f32) -> Result<(), TilemapError> {
        self.layer_of(id)?.tile_anim_divisor(id.tile, divisor)
    }

    pub fn tile_alpha(&mut self, id: CompositeTileId, alpha: f32) -> Result<(), TilemapError> {
        self.layer_of(id)?.tile_alpha(id.tile, alpha)
    }

    pub fn last_tile(&self) -> Option<CompositeTileId> {
        self.last
    }

    // "Last tile" forms: no-ops when nothing was appended since the last clear.

    pub fn tile_rotate_last(&mut self, rotate: u32) -> Result<(), TilemapError> {
        match self.last {
            Some(id) => self.tile_rotate(id, rotate),
            None => Ok(()),
        }
    }

    pub fn tile_anim_x_last(&mut self, offset: f32, count: f32) -> Result<(), TilemapError> {
        match self.last {
            Some(id) => self.tile_anim_x(id, offset, count),
            None => Ok(()),
        }
    }

    pub fn tile_anim_y_last(&mut self, offset: f32, count: f32) -> Result<(), TilemapError> {
        match self.last {
            Some(id) => self.tile_anim_y(id, offset, count),
            None => Ok(()),
        }
    }

    pub fn tile_anim_divisor_last(&mut self, divisor: f32) -> Result<(), TilemapError> {
        match self.last {
            Some(id) => self.tile_anim_divisor(id, divisor),
            None => Ok(()),
        }
    }

    pub fn tile_alpha_last(&mut self, alpha: f32) -> Result<(), TilemapError> {
        match self.last {
            Some(id) => self.tile_alpha(id, alpha),
            None => Ok(()),
        }
    }

    /// Clear every layer. Layers and their tilesets are kept.
    pub fn clear(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
        self.current = 0;
        self.last = None;
    }

    // ── Animation ─────────────────────────────────────────────────────────────

    /// Set the animation frame fed to the shader. A change makes every layer
    /// re-encode on the next `prepare`.
    pub fn set_tile_anim(&mut self, frame_x: f32, frame_y: f32) {
        if self.tile_anim != [frame_x, frame_y] {
            self.tile_anim = [frame_x, frame_y];
            self.anim_refresh = true;
        }
    }

    pub fn tile_anim(&self) -> [f32; 2] {
        self.tile_anim
    }

    // ── Frame ─────────────────────────────────────────────────────────────────

    /// The signal layers read on the next `prepare`.
    pub fn signal(&self) -> CompositeSignal {
        CompositeSignal {
            member: true,
            offset_x: self.texture_offset[0],
            offset_y: self.texture_offset[1],
            textures_per_unit: self.settings.textures_per_unit,
            texture_units: self.settings.max_texture_units,
            anim_refresh: self.anim_refresh,
        }
    }

    /// Encode every dirty layer and consume the animation refresh.
    /// Returns, per layer, whether it re-encoded.
    pub fn prepare_layers(&mut self) -> Vec<bool> {
        let signal = self.signal();
        let encoded = self
            .layers
            .iter_mut()
            .map(|layer| layer.prepare(&signal))
            .collect();
        self.anim_refresh = false;
        encoded
    }

    /// Like [`prepare_layers`](Self::prepare_layers), counting the layers
    /// that re-encoded.
    pub fn prepare(&mut self) -> usize {
        self.prepare_layers().into_iter().filter(|&e| e).count()
    }

    pub fn invalidate_gpu(&mut self) {
        for layer in &mut self.layers {
            layer.invalidate_gpu();
        }
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(Tilemap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Tilemap::is_empty)
    }

    pub fn has_animated_tile(&self) -> bool {
        self.layers.iter().any(Tilemap::has_animated_tile)
    }

    /// Union of all layer bounds.
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::new();
        for layer in &self.layers {
            bounds.add_bounds(layer.bounds());
        }
        bounds
    }
}
