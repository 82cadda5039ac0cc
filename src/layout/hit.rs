//! Hit testing: invert pixel coordinates back to a key.
//!
//! The inverse of the geometry compiler. A point is first checked against
//! the outer margin (a non-interactive border), then mapped to a row by
//! inverting the top-to-bottom row bands, then scanned against the row's
//! hint rectangles. Hit testing never errors; a miss is `None`.

use crate::geometry::{Margins, Point, Size};
use crate::layout::compile::HintGeometry;
use crate::layout::{KeyDef, KeyPosition, Layout, LayoutMode};

// ---------------------------------------------------------------------------
// KeyHit
// ---------------------------------------------------------------------------

/// A resolved touch: the key definition under the point (in the queried
/// mode) and its grid address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyHit<'a> {
    pub key: &'a KeyDef,
    pub position: KeyPosition,
}

// ---------------------------------------------------------------------------
// touch_is_in_margin
// ---------------------------------------------------------------------------

/// Whether a pixel point falls in the outer margin bands.
///
/// True unless the normalized point lies *strictly* inside
/// `(left, 1-right) x (bottom, 1-top)`; boundary points count as margin,
/// so with zero margins the exact widget edge is still non-interactive.
pub fn touch_is_in_margin(point: Point, size: Size, margins: Margins) -> bool {
    let (x, y) = size.normalize(point);
    !(x > margins.left
        && x < 1.0 - margins.right
        && y > margins.bottom
        && y < 1.0 - margins.top)
}

// ---------------------------------------------------------------------------
// locate_key
// ---------------------------------------------------------------------------

/// Resolve a pixel point to the key under it, or `None` when the point is
/// in the margin or past the last key of an underfull row.
///
/// Row inversion mirrors the compiler's top-to-bottom ordering: the band at
/// the top of the drawable area is row 1. The result is clamped into
/// `[1, rows]` so float error at the band edges cannot step outside the
/// grid. Within the row, the first key whose hint span `[x, x + w)`
/// contains the normalized x wins.
pub fn locate_key<'a>(
    layout: &'a Layout,
    mode: LayoutMode,
    hints: &HintGeometry,
    size: Size,
    margins: Margins,
    point: Point,
) -> Option<KeyHit<'a>> {
    if touch_is_in_margin(point, size, margins) {
        return None;
    }

    let x_hint = point.x / size.width;

    let drawable_height = (1.0 - margins.top - margins.bottom) * size.height;
    let row_height = drawable_height / layout.rows as f32;
    let y = point.y - margins.bottom * size.height;
    let row = (layout.rows as i64 - (y / row_height).floor() as i64)
        .clamp(1, layout.rows as i64) as u32;

    let index = hints.row(row)?.iter().position(|rect| rect.spans_x(x_hint))?;
    let position = KeyPosition::new(row, index);
    let key = layout.key(mode, position)?;
    Some(KeyHit { key, position })
}

// ===========================================================================
// Tests
// ===========================================================================
