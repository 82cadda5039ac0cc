//! Geometry compiler: layout table → hint geometry → pixel geometry.
//!
//! Compilation is a two-stage transform. [`compile_hints`] lays the grid
//! out in hint space once per layout + margin combination; it is
//! independent of the widget's pixel size. [`compile_pixels`] scales hints
//! to the current widget size and subtracts per-key margins, and is re-run
//! on every resize or margin change. Mode flips touch neither stage: they
//! only swap which key list supplies glyphs for the same positions.

use thiserror::Error;

use crate::geometry::{HintRect, Margins, PixelRect, Size};
use crate::layout::{Layout, LayoutMode};

// ---------------------------------------------------------------------------
// CompileError
// ---------------------------------------------------------------------------

/// Fatal geometry compilation failures. Surfaced to the caller, never
/// silently recovered.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(
        "invalid margins (top={top}, right={right}, bottom={bottom}, left={left}): \
         each must lie in [0, 1) and opposite sides must sum below 1"
    )]
    InvalidMargin { top: f32, right: f32, bottom: f32, left: f32 },

    #[error("layout `{name}` is missing row `{row_key}` required for geometry")]
    MissingRow { name: String, row_key: String },
}

// ---------------------------------------------------------------------------
// HintGeometry
// ---------------------------------------------------------------------------

/// Per-row key rectangles in hint space, plus the unit cell size.
///
/// Row 1 (the top band) is stored first. Hints are compiled from the
/// normal-mode key lists; validation guarantees the shift lists are
/// index-compatible.
#[derive(Clone, Debug, PartialEq)]
pub struct HintGeometry {
    /// Hint width of one column unit.
    pub unit_width: f32,
    /// Hint height of one row.
    pub unit_height: f32,
    rows: Vec<Vec<HintRect>>,
}

impl HintGeometry {
    /// The hint rectangles of a 1-based row.
    pub fn row(&self, row: u32) -> Option<&[HintRect]> {
        self.rows.get(row.checked_sub(1)? as usize).map(Vec::as_slice)
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[HintRect]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Number of rows.
    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }
}

// ---------------------------------------------------------------------------
// PixelGeometry
// ---------------------------------------------------------------------------

/// Per-row key rectangles on the pixel surface, consumed by the renderer
/// and by highlight drawing. Same row order as [`HintGeometry`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGeometry {
    rows: Vec<Vec<PixelRect>>,
}

impl PixelGeometry {
    /// The pixel rectangles of a 1-based row.
    pub fn row(&self, row: u32) -> Option<&[PixelRect]> {
        self.rows.get(row.checked_sub(1)? as usize).map(Vec::as_slice)
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[PixelRect]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Number of rows.
    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }
}

// ---------------------------------------------------------------------------
// compile_hints
// ---------------------------------------------------------------------------

/// Compile the relative (hint) geometry for a layout under the given outer
/// margin fractions.
///
/// The drawable band is `1 - left - right` wide and `1 - top - bottom`
/// high; one column unit is `drawable_width / cols`, one row is
/// `drawable_height / rows` (rows are uniform, not content-sized). Rows are
/// laid out top to bottom starting at the top of the drawable band, and
/// keys advance left to right by their own width. Rows whose width units
/// do not sum to `cols` under- or overflow the band uncorrected (see
/// [`Layout::validate`]).
pub fn compile_hints(layout: &Layout, margins: Margins) -> Result<HintGeometry, CompileError> {
    validate_margins(margins)?;

    let drawable_width = 1.0 - margins.left - margins.right;
    let drawable_height = 1.0 - margins.top - margins.bottom;
    let unit_width = drawable_width / layout.cols as f32;
    let unit_height = drawable_height / layout.rows as f32;

    let mut rows = Vec::with_capacity(layout.rows as usize);
    // Walk down from the top of the drawable band: row 1 is the top row.
    let mut y = margins.bottom + drawable_height;
    for row in 1..=layout.rows {
        y -= unit_height;
        let keys =
            layout.row(LayoutMode::Normal, row).ok_or_else(|| CompileError::MissingRow {
                name: layout.name.clone(),
                row_key: LayoutMode::Normal.row_key(row),
            })?;

        let mut rects = Vec::with_capacity(keys.len());
        let mut x = margins.left;
        for key in keys {
            let width = key.width * unit_width;
            rects.push(HintRect::new(x, y, width, unit_height));
            x += width;
        }
        rows.push(rects);
    }

    Ok(HintGeometry { unit_width, unit_height, rows })
}

/// Each margin fraction must lie in `[0, 1)` and opposite sides must leave
/// a non-empty drawable band.
fn validate_margins(margins: Margins) -> Result<(), CompileError> {
    let Margins { top, right, bottom, left } = margins;
    let in_range = |m: f32| m >= 0.0 && m < 1.0;
    if !(in_range(top) && in_range(right) && in_range(bottom) && in_range(left))
        || top + bottom >= 1.0
        || left + right >= 1.0
    {
        return Err(CompileError::InvalidMargin { top, right, bottom, left });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// compile_pixels
// ---------------------------------------------------------------------------

/// Scale hint geometry to the widget size and subtract per-key margins
/// (in pixels), floor-truncating every component.
///
/// Key margins larger than a key produce negative sizes; validating margin
/// configuration is the caller's responsibility.
pub fn compile_pixels(hints: &HintGeometry, size: Size, key_margins: Margins) -> PixelGeometry {
    let rows = hints
        .rows()
        .map(|row| {
            row.iter()
                .map(|hint| {
                    let x = hint.x * size.width + key_margins.left;
                    let y = hint.y * size.height + key_margins.bottom;
                    let width = hint.width * size.width - key_margins.left - key_margins.right;
                    let height = hint.height * size.height - key_margins.bottom - key_margins.top;
                    PixelRect::new(
                        x.floor() as i32,
                        y.floor() as i32,
                        width.floor() as i32,
                        height.floor() as i32,
                    )
                })
                .collect()
        })
        .collect();
    PixelGeometry { rows }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{source, KeyDef};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// `cols` unit-width character keys in a single row, both modes.
    fn grid_layout(name: &str, cols: u32, rows: u32) -> Layout {
        let mut layout = Layout::new(name, cols, rows);
        for row in 1..=rows {
            let keys: Vec<KeyDef> =
                (0..cols).map(|i| KeyDef::character(i.to_string(), i.to_string(), 1.0)).collect();
            layout.set_row(LayoutMode::Normal, row, keys.clone());
            layout.set_row(LayoutMode::Shift, row, keys);
        }
        layout
    }

    // ── margin validation ────────────────────────────────────────────

    #[rstest]
    #[case::negative(Margins::new(-0.1, 0.0, 0.0, 0.0))]
    #[case::at_one(Margins::new(0.0, 1.0, 0.0, 0.0))]
    #[case::above_one(Margins::new(0.0, 0.0, 1.5, 0.0))]
    #[case::vertical_sum(Margins::new(0.6, 0.0, 0.5, 0.0))]
    #[case::horizontal_sum(Margins::new(0.0, 0.5, 0.0, 0.5))]
    #[case::nan(Margins::new(f32::NAN, 0.0, 0.0, 0.0))]
    fn compile_hints_rejects_invalid_margins(#[case] margins: Margins) {
        let layout = grid_layout("grid", 2, 1);
        assert!(matches!(
            compile_hints(&layout, margins),
            Err(CompileError::InvalidMargin { .. })
        ));
    }

    #[rstest]
    #[case::zero(Margins::ZERO)]
    #[case::defaults(Margins::new(0.05, 0.06, 0.05, 0.06))]
    #[case::asymmetric(Margins::new(0.0, 0.4, 0.59, 0.3))]
    fn compile_hints_accepts_valid_margins(#[case] margins: Margins) {
        let layout = grid_layout("grid", 2, 1);
        assert!(compile_hints(&layout, margins).is_ok());
    }

    #[test]
    fn compile_hints_fails_on_missing_row() {
        let mut layout = grid_layout("gap", 2, 1);
        layout.rows = 2; // declared second row never inserted
        match compile_hints(&layout, Margins::ZERO) {
            Err(CompileError::MissingRow { row_key, .. }) => assert_eq!(row_key, "normal_2"),
            other => panic!("expected MissingRow, got {other:?}"),
        }
    }

    // ── hint layout ──────────────────────────────────────────────────

    #[test]
    fn hints_unit_cell_from_drawable_band() {
        let layout = grid_layout("grid", 10, 5);
        let margins = Margins::new(0.1, 0.2, 0.1, 0.2);
        let hints = compile_hints(&layout, margins).unwrap();
        assert!((hints.unit_width - 0.06).abs() < 1e-6); // (1 - 0.4) / 10
        assert!((hints.unit_height - 0.16).abs() < 1e-6); // (1 - 0.2) / 5
    }

    #[test]
    fn hints_row_one_is_topmost_band() {
        let layout = grid_layout("grid", 2, 2);
        let margins = Margins::new(0.1, 0.0, 0.2, 0.0);
        let hints = compile_hints(&layout, margins).unwrap();
        // Drawable band is y in [0.2, 0.9], rows are 0.35 tall.
        let top = hints.row(1).unwrap()[0];
        let bottom = hints.row(2).unwrap()[0];
        assert!((top.y - 0.55).abs() < 1e-6);
        assert!((bottom.y - 0.2).abs() < 1e-6);
        assert!(top.y > bottom.y, "row 1 must sit above row 2 (y axis up)");
    }

    #[test]
    fn hints_keys_advance_left_to_right() {
        let mut layout = Layout::new("uneven", 4, 1);
        let keys = vec![
            KeyDef::character("a", "a", 1.0),
            KeyDef::character("b", "b", 2.0),
            KeyDef::character("c", "c", 1.0),
        ];
        layout.set_row(LayoutMode::Normal, 1, keys.clone());
        layout.set_row(LayoutMode::Shift, 1, keys);

        let hints = compile_hints(&layout, Margins::new(0.0, 0.0, 0.0, 0.2)).unwrap();
        let row = hints.row(1).unwrap();
        // Unit width (1 - 0.2) / 4 = 0.2; origins start at the left margin.
        assert!((row[0].x - 0.2).abs() < 1e-6);
        assert!((row[1].x - 0.4).abs() < 1e-6);
        assert!((row[1].width - 0.4).abs() < 1e-6); // double-width key
        assert!((row[2].x - 0.8).abs() < 1e-6);
    }

    #[test]
    fn hints_row_widths_sum_to_drawable_width() {
        let layout = source::qwerty();
        let margins = Margins::new(0.05, 0.06, 0.05, 0.06);
        let hints = compile_hints(&layout, margins).unwrap();
        let drawable = 1.0 - margins.left - margins.right;
        for row in hints.rows() {
            let sum: f32 = row.iter().map(|rect| rect.width).sum();
            assert!((sum - drawable).abs() < 1e-5, "row sums to {sum}, want {drawable}");
        }
    }

    #[test]
    fn hints_overflowing_row_is_not_corrected() {
        let mut layout = Layout::new("wide", 2, 1);
        let keys = vec![KeyDef::character("a", "a", 3.0)];
        layout.set_row(LayoutMode::Normal, 1, keys.clone());
        layout.set_row(LayoutMode::Shift, 1, keys);

        let hints = compile_hints(&layout, Margins::ZERO).unwrap();
        let rect = hints.row(1).unwrap()[0];
        // 3 units of width 0.5: extends past the right edge, as documented.
        assert!((rect.width - 1.5).abs() < 1e-6);
    }

    // ── pixel conversion ─────────────────────────────────────────────

    #[test]
    fn pixels_scale_without_key_margins() {
        let layout = grid_layout("grid", 2, 1);
        let hints = compile_hints(&layout, Margins::ZERO).unwrap();
        let pixels = compile_pixels(&hints, Size::new(100.0, 40.0), Margins::ZERO);
        let row = pixels.row(1).unwrap();
        assert_eq!(row[0], PixelRect::new(0, 0, 50, 40));
        assert_eq!(row[1], PixelRect::new(50, 0, 50, 40));
    }

    #[test]
    fn pixels_subtract_key_margins() {
        let layout = grid_layout("grid", 2, 1);
        let hints = compile_hints(&layout, Margins::ZERO).unwrap();
        let pixels = compile_pixels(&hints, Size::new(100.0, 40.0), Margins::all(2.0));
        let row = pixels.row(1).unwrap();
        assert_eq!(row[0], PixelRect::new(2, 2, 46, 36));
        assert_eq!(row[1], PixelRect::new(52, 2, 46, 36));
    }

    #[test]
    fn pixels_floor_truncate() {
        let layout = grid_layout("grid", 2, 1);
        let hints = compile_hints(&layout, Margins::ZERO).unwrap();
        let pixels = compile_pixels(&hints, Size::new(99.0, 33.0), Margins::ZERO);
        let row = pixels.row(1).unwrap();
        assert_eq!(row[0], PixelRect::new(0, 0, 49, 33)); // 49.5 -> 49
        assert_eq!(row[1], PixelRect::new(49, 0, 49, 33));
    }

    #[test]
    fn pixels_oversized_key_margins_go_negative() {
        let layout = grid_layout("grid", 2, 1);
        let hints = compile_hints(&layout, Margins::ZERO).unwrap();
        let pixels = compile_pixels(&hints, Size::new(100.0, 40.0), Margins::all(30.0));
        let rect = pixels.row(1).unwrap()[0];
        assert_eq!(rect.width, -10); // 50 - 60, passed through uncorrected
        assert_eq!(rect.height, -20);
    }

    #[test]
    fn pixels_are_idempotent_for_fixed_inputs() {
        let layout = source::qwerty();
        let hints = compile_hints(&layout, Margins::new(0.05, 0.06, 0.05, 0.06)).unwrap();
        let size = Size::new(700.0, 200.0);
        let first = compile_pixels(&hints, size, Margins::all(2.0));
        let second = compile_pixels(&hints, size, Margins::all(2.0));
        assert_eq!(first, second);
    }

    #[test]
    fn qwerty_geometry_row_count_matches_layout() {
        let layout = source::qwerty();
        let hints = compile_hints(&layout, Margins::new(0.05, 0.06, 0.05, 0.06)).unwrap();
        assert_eq!(hints.row_count(), layout.rows);
        let pixels = compile_pixels(&hints, Size::new(700.0, 200.0), Margins::all(2.0));
        assert_eq!(pixels.row_count(), layout.rows);
        for row in 1..=layout.rows {
            assert_eq!(
                pixels.row(row).unwrap().len(),
                layout.row(LayoutMode::Normal, row).unwrap().len(),
            );
        }
    }
}
