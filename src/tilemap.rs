// =============================================================================
// TILEMAP.RS — One batch of tiles drawn with a single vertex buffer
//
// A `Tilemap` owns its tileset, the tile command buffer, and the CPU copy of
// the encoded vertex stream. Appends and edits only touch the command buffer;
// `prepare` decides once per frame whether the vertex stream must be rebuilt.
// =============================================================================

use crate::bounds::{Bounds, Rect};
use crate::composite::CompositeSignal;
use crate::config::TilemapSettings;
use crate::error::TilemapError;
use crate::renderer::d8;
use crate::renderer::encoder::{EncodeParams, encode_tiles};
use crate::renderer::vertex::TileVertex;
use crate::renderer::vertex_buffer::DynamicVertexBuffer;
use crate::tile::{TileBuffer, TileId, TileOptions, TileRecord};
use crate::tileset::{TextureHandle, TextureLookup, TileTexture, Tileset};

pub struct Tilemap {
    tileset: Tileset,
    tiles: TileBuffer,
    vertices: DynamicVertexBuffer,
    settings: TilemapSettings,
    lookup: Option<Box<dyn TextureLookup>>,
}

impl Tilemap {
    pub fn new(tileset: Tileset) -> Self {
        Self {
            tileset,
            tiles: TileBuffer::new(),
            vertices: DynamicVertexBuffer::new(),
            settings: TilemapSettings::default(),
            lookup: None,
        }
    }

    pub fn with_settings(tileset: Tileset, settings: TilemapSettings) -> Result<Self, TilemapError> {
        settings.validate()?;
        Ok(Self { settings, ..Self::new(tileset) })
    }

    /// Install the collaborator used to resolve [`TileTexture::Key`].
    pub fn with_lookup(mut self, lookup: impl TextureLookup + 'static) -> Self {
        self.lookup = Some(Box::new(lookup));
        self
    }

    pub fn settings(&self) -> &TilemapSettings {
        &self.settings
    }

    pub fn tileset(&self) -> &Tileset {
        &self.tileset
    }

    /// Add a texture to the tileset and return its slot.
    pub fn add_texture(&mut self, texture: TextureHandle) -> u32 {
        // A new slot can turn previously skipped tiles valid.
        self.vertices.invalidate();
        self.tileset.push(texture)
    }

    // ── Appending ─────────────────────────────────────────────────────────────

    /// Paint `texture` at (`x`, `y`).
    ///
    /// Handles and keys must resolve to a tileset slot; otherwise a warning is
    /// logged and nothing is appended. Numeric indices are taken as is and
    /// only checked at encode time.
    pub fn tile<'a>(
        &mut self,
        texture: impl Into<TileTexture<'a>>,
        x: f32,
        y: f32,
        options: &TileOptions,
    ) -> Result<TileId, TilemapError> {
        if !d8::is_valid(options.rotate) {
            return Err(TilemapError::InvalidRotation(options.rotate));
        }
        check_anim_divisor(options.anim_divisor)?;

        let texture = texture.into();
        let (texture_index, frame) = self.resolve(texture).inspect_err(|e| {
            log::warn!("tilemap: {e}; tile at ({x}, {y}) skipped");
        })?;

        let (fu, fv, fw, fh) = frame
            .map(|t| (t.frame_x, t.frame_y, t.width, t.height))
            .unwrap_or((0.0, 0.0, 0.0, 0.0));

        let record = TileRecord {
            u: options.u.unwrap_or(fu),
            v: options.v.unwrap_or(fv),
            x,
            y,
            tile_width: options.tile_width.unwrap_or(fw),
            tile_height: options.tile_height.unwrap_or(fh),
            rotate: options.rotate,
            anim_x: options.anim_x,
            anim_y: options.anim_y,
            texture_index,
            anim_count_x: options.anim_count_x,
            anim_count_y: options.anim_count_y,
            anim_divisor: options.anim_divisor,
            alpha: options.alpha,
            tint: options.tint,
        };
        Ok(self.tiles.push(&record))
    }

    /// Tileset slot for `texture`, plus the handle supplying frame defaults.
    fn resolve(&self, texture: TileTexture<'_>) -> Result<(u32, Option<TextureHandle>), TilemapError> {
        match texture {
            TileTexture::Index(index) => Ok((index, self.tileset.get(index).cloned())),
            TileTexture::Handle(handle) => self.resolve_handle(handle),
            TileTexture::Key(key) => {
                let handle = self
                    .lookup
                    .as_ref()
                    .and_then(|l| l.lookup(key))
                    .ok_or_else(|| TilemapError::UnresolvedTexture(key.to_string()))?;
                self.resolve_handle(&handle)
            }
        }
    }

    fn resolve_handle(
        &self,
        handle: &TextureHandle,
    ) -> Result<(u32, Option<TextureHandle>), TilemapError> {
        match self.tileset.index_of(handle.base) {
            Some(index) => Ok((index, Some(handle.clone()))),
            None => Err(TilemapError::UnresolvedTexture(format!("{:?}", handle.base))),
        }
    }

    // ── Editing ───────────────────────────────────────────────────────────────

    fn edit(&mut self, id: TileId, edit: impl FnOnce(&mut TileRecord)) -> Result<(), TilemapError> {
        self.tiles.update(id, edit)?;
        self.vertices.invalidate();
        Ok(())
    }

    pub fn tile_rotate(&mut self, id: TileId, rotate: u32) -> Result<(), TilemapError> {
        if !d8::is_valid(rotate) {
            return Err(TilemapError::InvalidRotation(rotate));
        }
        self.edit(id, |r| r.rotate = rotate)
    }

    pub fn tile_anim_x(&mut self, id: TileId, offset: f32, count: f32) -> Result<(), TilemapError> {
        self.edit(id, |r| {
            r.anim_x = offset;
            r.anim_count_x = count;
        })
    }

    pub fn tile_anim_y(&mut self, id: TileId, offset: f32, count: f32) -> Result<(), TilemapError> {
        self.edit(id, |r| {
            r.anim_y = offset;
            r.anim_count_y = count;
        })
    }

    pub fn tile_anim_divisor(&mut self, id: TileId, divisor: f32) -> Result<(), TilemapError> {
        check_anim_divisor(divisor)?;
        self.edit(id, |r| r.anim_divisor = divisor)
    }

    pub fn tile_alpha(&mut self, id: TileId, alpha: f32) -> Result<(), TilemapError> {
        self.edit(id, |r| r.alpha = alpha)
    }

    /// Handle of the most recent append.
    pub fn last_tile(&self) -> Option<TileId> {
        self.tiles.last()
    }

    // "Last tile" forms: no-ops on an empty tilemap.

    pub fn tile_rotate_last(&mut self, rotate: u32) -> Result<(), TilemapError> {
        match self.last_tile() {
            Some(id) => self.tile_rotate(id, rotate),
            None => Ok(()),
        }
    }

    pub fn tile_anim_x_last(&mut self, offset: f32, count: f32) -> Result<(), TilemapError> {
        match self.last_tile() {
            Some(id) => self.tile_anim_x(id, offset, count),
            None => Ok(()),
        }
    }

    pub fn tile_anim_y_last(&mut self, offset: f32, count: f32) -> Result<(), TilemapError> {
        match self.last_tile() {
            Some(id) => self.tile_anim_y(id, offset, count),
            None => Ok(()),
        }
    }

    pub fn tile_anim_divisor_last(&mut self, divisor: f32) -> Result<(), TilemapError> {
        match self.last_tile() {
            Some(id) => self.tile_anim_divisor(id, divisor),
            None => Ok(()),
        }
    }

    pub fn tile_alpha_last(&mut self, alpha: f32) -> Result<(), TilemapError> {
        match self.last_tile() {
            Some(id) => self.tile_alpha(id, alpha),
            None => Ok(()),
        }
    }

    /// Remove every tile. Handles issued before this call become stale.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.vertices.invalidate();
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn has_animated_tile(&self) -> bool {
        self.tiles.has_animated_tile()
    }

    pub fn bounds(&self) -> &Bounds {
        self.tiles.bounds()
    }

    pub fn tile_record(&self, id: TileId) -> Result<TileRecord, TilemapError> {
        self.tiles.get(id)
    }

    /// Records in draw order, for consumers that paint without the encoder.
    pub fn records(&self) -> impl ExactSizeIterator<Item = TileRecord> + '_ {
        self.tiles.records()
    }

    /// Local bounds of the tilemap. Without `children` this is exactly the
    /// union of the tile rectangles; with them, the child bounds computed by
    /// the surrounding scene graph are merged in.
    pub fn local_bounds(&self, children: Option<&Bounds>) -> Option<Rect> {
        match children {
            None => self.tiles.bounds().rect(),
            Some(child_bounds) => {
                let mut all = *self.tiles.bounds();
                all.add_bounds(child_bounds);
                all.rect()
            }
        }
    }

    // ── Encoding ──────────────────────────────────────────────────────────────

    /// Rebuild the vertex stream if anything changed since the last call, or
    /// if animation forces it. Returns whether an encode pass ran.
    pub fn prepare(&mut self, signal: &CompositeSignal) -> bool {
        let vertex_count = self.tiles.len() * TileVertex::PER_QUAD;
        if !self.vertices.needs_encode(
            vertex_count,
            self.tiles.has_animated_tile(),
            signal.anim_refresh,
        ) {
            return false;
        }

        let params = EncodeParams::new(&self.settings, signal.packing());
        let out = self.vertices.prepare_write(vertex_count);
        let quads = encode_tiles(self.tiles.records(), self.tileset.len(), &params, out);
        self.vertices.mark_encoded(vertex_count, quads * TileVertex::PER_QUAD);

        log::trace!(
            "tilemap: encoded {quads}/{} tiles ({} bytes)",
            self.tiles.len(),
            self.vertices.as_bytes().len()
        );
        true
    }

    /// The GPU copy of the vertex stream was lost; the next `prepare`
    /// re-encodes and the uploader re-creates its buffer.
    pub fn invalidate_gpu(&mut self) {
        self.vertices.context_lost();
    }

    pub fn vertex_buffer(&self) -> &DynamicVertexBuffer {
        &self.vertices
    }

    pub fn vertices(&self) -> &[TileVertex] {
        self.vertices.vertices()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        self.vertices.as_bytes()
    }

    /// Quads in the last encoded stream.
    pub fn quad_count(&self) -> usize {
        self.vertices.encoded_vertices() / TileVertex::PER_QUAD
    }
}

/// The shader divides the animation frame by this value.
fn check_anim_divisor(divisor: f32) -> Result<(), TilemapError> {
    if divisor.is_finite() && divisor > 0.0 {
        Ok(())
    } else {
        Err(TilemapError::InvalidAnimDivisor(divisor))
    }
}
