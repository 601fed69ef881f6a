//! Batched tilemap rendering: tile commands in, one packed vertex buffer out.
//!
//! Tiles are appended to a [`Tilemap`] as fixed-layout records. Once per frame
//! [`Tilemap::prepare`] expands them into quads (rotation, animation encoding
//! and texture-unit packing included) and [`renderer::TilemapRenderer`] uploads
//! and draws the result with wgpu.

pub mod bounds;
pub mod composite;
pub mod config;
pub mod error;
pub mod renderer;
pub mod tile;
pub mod tilemap;
pub mod tileset;

pub use bounds::{Bounds, Rect};
pub use composite::{CompositeSignal, CompositeTileId, CompositeTilemap};
pub use config::TilemapSettings;
pub use error::TilemapError;
pub use tile::{TileId, TileOptions, TileRecord};
pub use tilemap::Tilemap;
pub use tileset::{BaseTextureId, TextureHandle, TextureLookup, TileTexture, Tileset};
