// ── Bounds accumulator ────────────────────────────────────────────────────────
//
// Running axis-aligned envelope over every tile rectangle appended to a
// tilemap. The empty state is min = +inf / max = -inf so that the first
// `add_frame_pad` simply adopts the incoming rectangle.

/// Axis-aligned rectangle in tilemap-local space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    /// Canonical empty state.
    pub const EMPTY: Bounds = Bounds {
        min_x: f32::INFINITY,
        min_y: f32::INFINITY,
        max_x: f32::NEG_INFINITY,
        max_y: f32::NEG_INFINITY,
    };

    pub fn new() -> Self {
        Self::EMPTY
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }

    /// Extend the envelope to contain `[x0, x1] × [y0, y1]` grown by the
    /// padding on each side.
    pub fn add_frame_pad(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, pad_x: f32, pad_y: f32) {
        self.min_x = self.min_x.min(x0 - pad_x);
        self.min_y = self.min_y.min(y0 - pad_y);
        self.max_x = self.max_x.max(x1 + pad_x);
        self.max_y = self.max_y.max(y1 + pad_y);
    }

    /// Union with another accumulator. Empty inputs leave `self` unchanged.
    pub fn add_bounds(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.add_frame_pad(other.min_x, other.min_y, other.max_x, other.max_y, 0.0, 0.0);
    }

    pub fn add_rect(&mut self, rect: &Rect) {
        self.add_frame_pad(rect.min_x, rect.min_y, rect.max_x, rect.max_y, 0.0, 0.0);
    }

    /// The accumulated rectangle, or `None` when nothing was added.
    pub fn rect(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        Some(Rect {
            min_x: self.min_x,
            min_y: self.min_y,
            max_x: self.max_x,
            max_y: self.max_y,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
