use crate::bounds::Bounds;
use crate::error::TilemapError;

use super::record::{RECORD_SIZE, TileRecord};

// ---------------------------------------------------------------------------
// TileId — generational handle to one record
// ---------------------------------------------------------------------------

/// Handle returned by an append. The generation is the buffer's clear epoch,
/// so handles issued before a `clear` are rejected instead of silently
/// addressing whatever tile now occupies the slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileId {
    index: u32,
    generation: u32,
}

impl TileId {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

// ---------------------------------------------------------------------------
// TileBuffer — append-only command storage
// ---------------------------------------------------------------------------

/// Flat, growable sequence of tile records plus the bounds of everything in it.
#[derive(Clone, Debug, Default)]
pub struct TileBuffer {
    data: Vec<f32>,
    bounds: Bounds,
    has_anim: bool,
    generation: u32,
}

impl TileBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(tiles: usize) -> Self {
        Self { data: Vec::with_capacity(tiles * RECORD_SIZE), ..Self::default() }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.data.len() / RECORD_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// True once any record carried a nonzero animation offset. Only `clear`
    /// resets it.
    pub fn has_animated_tile(&self) -> bool {
        self.has_anim
    }

    /// Append `record`, grow the bounds by its destination rectangle and return
    /// a handle to it.
    pub fn push(&mut self, record: &TileRecord) -> TileId {
        let index = self.len() as u32;
        let start = self.data.len();
        self.data.resize(start + RECORD_SIZE, 0.0);
        record.encode_into(&mut self.data[start..]);

        let (x0, y0, x1, y1) = record.dest_rect();
        self.bounds.add_frame_pad(x0, y0, x1, y1, 0.0, 0.0);
        self.has_anim |= record.is_animated();

        TileId { index, generation: self.generation }
    }

    /// Handle to the most recently appended record.
    pub fn last(&self) -> Option<TileId> {
        match self.len() {
            0 => None,
            n => Some(TileId { index: (n - 1) as u32, generation: self.generation }),
        }
    }

    fn slot(&self, id: TileId) -> Result<usize, TilemapError> {
        if id.generation != self.generation || id.index as usize >= self.len() {
            return Err(TilemapError::StaleTile(id));
        }
        Ok(id.index as usize * RECORD_SIZE)
    }

    pub fn get(&self, id: TileId) -> Result<TileRecord, TilemapError> {
        let start = self.slot(id)?;
        Ok(TileRecord::decode(&self.data[start..start + RECORD_SIZE]))
    }

    /// Edit one record in place. Destination position and size are not
    /// expected to change through this path; bounds are not recomputed.
    pub fn update(
        &mut self,
        id: TileId,
        edit: impl FnOnce(&mut TileRecord),
    ) -> Result<(), TilemapError> {
        let start = self.slot(id)?;
        let raw = &mut self.data[start..start + RECORD_SIZE];
        let mut record = TileRecord::decode(raw);
        edit(&mut record);
        record.encode_into(raw);
        self.has_anim |= record.is_animated();
        Ok(())
    }

    /// Record at position `index` in append order.
    pub fn record(&self, index: usize) -> Option<TileRecord> {
        let start = index.checked_mul(RECORD_SIZE)?;
        self.data
            .get(start..start + RECORD_SIZE)
            .map(TileRecord::decode)
    }

    /// All records in append (= draw) order.
    pub fn records(&self) -> impl ExactSizeIterator<Item = TileRecord> + '_ {
        self.data.chunks_exact(RECORD_SIZE).map(TileRecord::decode)
    }

    /// Drop every record, reset bounds and the animated flag, and invalidate
    /// all outstanding handles.
    pub fn clear(&mut self) {
        self.data.clear();
        self.bounds.clear();
        self.has_anim = false;
        self.generation = self.generation.wrapping_add(1);
    }
}
