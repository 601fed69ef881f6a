use super::vertex::TileVertex;

/// CPU-side storage for an encoded vertex stream.
///
/// Capacity only grows, doubling from a single vertex stride until it covers
/// the request. Each reallocation bumps `generation` so the GPU mirror knows
/// to re-create its buffer instead of writing into the old one.
#[derive(Clone, Debug, Default)]
pub struct DynamicVertexBuffer {
    storage: Vec<TileVertex>,
    /// Vertices written by the last encode.
    encoded: usize,
    /// Vertex count the last encode was made for; `None` forces the next one.
    marker: Option<usize>,
    generation: u64,
}

impl DynamicVertexBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity_bytes(&self) -> usize {
        self.storage.len() * TileVertex::STRIDE
    }

    /// Incremented on every reallocation and on context loss.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Last encoded vertex count, if the contents are current.
    pub fn marker(&self) -> Option<usize> {
        self.marker
    }

    /// Grow to at least `bytes`. Returns true when the storage was reallocated.
    pub fn reserve_bytes(&mut self, bytes: usize) -> bool {
        if bytes <= self.capacity_bytes() {
            return false;
        }
        let mut capacity = TileVertex::STRIDE;
        while capacity < bytes {
            capacity *= 2;
        }
        log::debug!(
            "vertex buffer: growing {} -> {} bytes",
            self.capacity_bytes(),
            capacity
        );
        // Capacity is a power-of-two multiple of the stride, so this divides evenly.
        self.storage.resize(capacity / TileVertex::STRIDE, TileVertex::default());
        self.generation += 1;
        true
    }

    /// Whether an encode pass is needed for `vertex_count` vertices.
    ///
    /// Animated tiles always re-encode: the animation frame is supplied from
    /// outside, so unchanged records do not mean unchanged output.
    pub fn needs_encode(&self, vertex_count: usize, has_anim: bool, anim_refresh: bool) -> bool {
        self.marker != Some(vertex_count) || has_anim || anim_refresh
    }

    /// Writable view over the first `vertices` slots, growing as needed.
    pub fn prepare_write(&mut self, vertices: usize) -> &mut [TileVertex] {
        self.reserve_bytes(vertices * TileVertex::STRIDE);
        &mut self.storage[..vertices]
    }

    /// Record the outcome of an encode pass: `vertex_count` is what the marker
    /// compares against next time, `written` is how many vertices are valid.
    pub fn mark_encoded(&mut self, vertex_count: usize, written: usize) {
        self.marker = Some(vertex_count);
        self.encoded = written;
    }

    /// Force the next `needs_encode` to report true.
    pub fn invalidate(&mut self) {
        self.marker = None;
    }

    /// The GPU copy can no longer be trusted: force a re-encode and make the
    /// uploader re-create its storage.
    pub fn context_lost(&mut self) {
        self.invalidate();
        self.generation += 1;
    }

    pub fn vertices(&self) -> &[TileVertex] {
        &self.storage[..self.encoded]
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices())
    }

    pub fn encoded_vertices(&self) -> usize {
        self.encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_has_no_storage() {
        let buf = DynamicVertexBuffer::new();
        assert_eq!(buf.capacity_bytes(), 0);
        assert_eq!(buf.generation(), 0);
        assert!(buf.as_bytes().is_empty());
    }

    #[test]
    fn capacity_is_smallest_power_of_two_stride_multiple() {
        let mut buf = DynamicVertexBuffer::new();
        assert!(buf.reserve_bytes(TileVertex::STRIDE * 5));
        assert_eq!(buf.capacity_bytes(), TileVertex::STRIDE * 8);
        assert!(!buf.reserve_bytes(TileVertex::STRIDE * 8));
        assert_eq!(buf.generation(), 1);
    }

    #[test]
    fn context_loss_forces_encode_and_new_storage() {
        let mut buf = DynamicVertexBuffer::new();
        buf.prepare_write(4);
        buf.mark_encoded(4, 4);
        assert!(!buf.needs_encode(4, false, false));
        let generation = buf.generation();
        buf.context_lost();
        assert!(buf.needs_encode(4, false, false));
        assert_eq!(buf.generation(), generation + 1);
    }
}
