pub mod buffer;
pub mod options;
pub mod record;

pub use buffer::{TileBuffer, TileId};
pub use options::TileOptions;
pub use record::{RECORD_SIZE, TileField, TileRecord, field_offset};
