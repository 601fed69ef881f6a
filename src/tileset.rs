use std::collections::HashMap;

// ── Texture handles ───────────────────────────────────────────────────────────

/// Identity of an uploaded texture. Several [`TextureHandle`]s (frames) may
/// share one base texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseTextureId(pub u64);

/// A rectangular frame inside a base texture.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureHandle {
    pub base: BaseTextureId,
    /// Frame origin inside the base texture, in pixels.
    pub frame_x: f32,
    pub frame_y: f32,
    /// Natural size of the frame in pixels.
    pub width: f32,
    pub height: f32,
}

impl TextureHandle {
    /// A handle covering the whole of `base`.
    pub fn new(base: BaseTextureId, width: f32, height: f32) -> Self {
        Self { base, frame_x: 0.0, frame_y: 0.0, width, height }
    }

    /// A sub-frame of `base` starting at (`x`, `y`).
    pub fn frame(base: BaseTextureId, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { base, frame_x: x, frame_y: y, width, height }
    }
}

// ── TextureLookup ─────────────────────────────────────────────────────────────

/// Resolves a texture key (asset name) to a handle. Absence is a lookup failure.
pub trait TextureLookup {
    fn lookup(&self, key: &str) -> Option<TextureHandle>;
}

impl TextureLookup for HashMap<String, TextureHandle> {
    fn lookup(&self, key: &str) -> Option<TextureHandle> {
        self.get(key).cloned()
    }
}

/// The texture argument of an append.
#[derive(Clone, Copy, Debug)]
pub enum TileTexture<'a> {
    /// Tileset slot used as is.
    Index(u32),
    /// Matched against the tileset by base texture.
    Handle(&'a TextureHandle),
    /// Resolved through a [`TextureLookup`] first.
    Key(&'a str),
}

impl From<u32> for TileTexture<'_> {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

impl<'a> From<&'a TextureHandle> for TileTexture<'a> {
    fn from(handle: &'a TextureHandle) -> Self {
        Self::Handle(handle)
    }
}

impl<'a> From<&'a str> for TileTexture<'a> {
    fn from(key: &'a str) -> Self {
        Self::Key(key)
    }
}

// ── Tileset ───────────────────────────────────────────────────────────────────

/// Ordered texture list referenced by index from tile records.
///
/// Indices are stable: slots are only ever appended.
#[derive(Clone, Debug, Default)]
pub struct Tileset {
    textures: Vec<TextureHandle>,
}

impl Tileset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_textures(textures: impl IntoIterator<Item = TextureHandle>) -> Self {
        let mut set = Self::new();
        for t in textures {
            set.push(t);
        }
        set
    }

    /// Append `texture` and return its slot. A texture whose base is already
    /// present is not added twice; the existing slot is returned.
    pub fn push(&mut self, texture: TextureHandle) -> u32 {
        if let Some(existing) = self.index_of(texture.base) {
            log::warn!(
                "tileset: base texture {:?} already in slot {existing}; not adding a duplicate",
                texture.base
            );
            return existing;
        }
        self.textures.push(texture);
        (self.textures.len() - 1) as u32
    }

    /// Linear search by base texture.
    pub fn index_of(&self, base: BaseTextureId) -> Option<u32> {
        self.textures
            .iter()
            .position(|t| t.base == base)
            .map(|i| i as u32)
    }

    pub fn get(&self, index: u32) -> Option<&TextureHandle> {
        self.textures.get(index as usize)
    }

    pub fn contains(&self, index: u32) -> bool {
        (index as usize) < self.textures.len()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextureHandle> {
        self.textures.iter()
    }
}
