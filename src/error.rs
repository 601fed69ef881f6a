use std::fmt;

use crate::tile::TileId;

/// Everything a tilemap operation can reject.
///
/// Resource exhaustion is not represented: allocation failure aborts, as it
/// does everywhere else in Rust.
#[derive(Debug)]
pub enum TilemapError {
    /// A texture handle or key did not resolve to a tileset slot.
    UnresolvedTexture(String),
    /// Rotation code outside the 8 elements of the dihedral group.
    InvalidRotation(u32),
    /// Animation divisor that is not a positive, finite number.
    InvalidAnimDivisor(f32),
    /// The tile handle was issued before the last `clear`, or never existed.
    StaleTile(TileId),
    /// A settings value the encoder cannot work with.
    InvalidSettings(String),
    /// Malformed settings or options JSON.
    Json(serde_json::Error),
    /// A texture bind group was requested with no texture views.
    NoTextures,
}

impl fmt::Display for TilemapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedTexture(what) => {
                write!(f, "texture '{what}' is not part of the tileset")
            }
            Self::InvalidRotation(code) => {
                write!(f, "rotation code {code} is outside 0..8")
            }
            Self::InvalidAnimDivisor(divisor) => {
                write!(f, "animation divisor {divisor} must be positive")
            }
            Self::StaleTile(id) => write!(
                f,
                "tile {} (generation {}) no longer exists",
                id.index(),
                id.generation()
            ),
            Self::InvalidSettings(msg) => write!(f, "invalid tilemap settings: {msg}"),
            Self::Json(e) => write!(f, "failed to parse tilemap JSON: {e}"),
            Self::NoTextures => write!(f, "at least one texture view is required"),
        }
    }
}

impl std::error::Error for TilemapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TilemapError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
