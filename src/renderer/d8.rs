// ── Dihedral group D8 (rotation codes 0..8) ───────────────────────────────────
//
// A rotation code `g` is `g / 2` quarter turns clockwise, followed by a
// horizontal mirror when `g` is odd: 0 2 4 6 are the rotations, 1 3 5 7 the
// reflections of the square.
//
// The corner walk borrows the compass directions, stepping 45° clockwise from
// east:
//
//   0 E   1 SE   2 S   3 SW   4 W   5 NW   6 N   7 NE
//
// Direction composition is addition mod 8, so adding 2 turns a direction 90°
// clockwise. The encoder starts from `add(turn, NW)` and walks the four quad
// corners by repeatedly adding 2, projecting the half-extents onto `(ux, uy)`.

pub const E: u32 = 0;
pub const SE: u32 = 1;
pub const S: u32 = 2;
pub const SW: u32 = 3;
pub const W: u32 = 4;
pub const NW: u32 = 5;
pub const N: u32 = 6;
pub const NE: u32 = 7;

/// Number of group elements.
pub const ORDER: u32 = 8;

/// One 90° clockwise step.
pub const QUARTER_TURN: u32 = 2;

const UX: [f32; ORDER as usize] = [1.0, 1.0, 0.0, -1.0, -1.0, -1.0, 0.0, 1.0];
const UY: [f32; ORDER as usize] = [0.0, 1.0, 1.0, 1.0, 0.0, -1.0, -1.0, -1.0];

#[inline]
pub fn add(a: u32, b: u32) -> u32 {
    (a % ORDER + b % ORDER) % ORDER
}

#[inline]
pub fn ux(element: u32) -> f32 {
    UX[(element % ORDER) as usize]
}

#[inline]
pub fn uy(element: u32) -> f32 {
    UY[(element % ORDER) as usize]
}

/// Whether `code` is a valid group element.
#[inline]
pub fn is_valid(code: u32) -> bool {
    code < ORDER
}

/// Whether `code` mirrors the tile after rotating it.
#[inline]
pub fn is_reflection(code: u32) -> bool {
    code & 1 == 1
}

/// Clockwise quarter turns applied by `code`.
#[inline]
pub fn quarter_turns(code: u32) -> u32 {
    (code % ORDER) / QUARTER_TURN
}

/// UV corners of the source rectangle `(u, v, w, h)` under `code`, in
/// top-left, top-right, bottom-right, bottom-left order.
///
/// An odd number of quarter turns swaps the half-extents, so a 90° turn of a
/// `w × h` region reads an `h × w` area of the texture. Reflections then swap
/// the left and right columns.
pub fn rotated_corners(code: u32, u: f32, v: f32, w: f32, h: f32) -> [[f32; 2]; 4] {
    let turn = quarter_turns(code) * QUARTER_TURN;
    let corners = if turn == E {
        [[u, v], [u + w, v], [u + w, v + h], [u, v + h]]
    } else {
        let (w2, h2) = if turn % 4 != 0 { (h / 2.0, w / 2.0) } else { (w / 2.0, h / 2.0) };
        let cx = u + w2;
        let cy = v + h2;

        let mut dir = add(turn, NW);
        let mut corners = [[0.0; 2]; 4];
        for corner in &mut corners {
            *corner = [cx + w2 * ux(dir), cy + h2 * uy(dir)];
            dir = add(dir, QUARTER_TURN);
        }
        corners
    };

    if is_reflection(code) {
        [corners[1], corners[0], corners[3], corners[2]]
    } else {
        corners
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
