//! Layout data model: [`Layout`], [`KeyDef`], [`KeyAction`], [`LayoutMode`].
//!
//! A layout is a declarative table: a grid of `cols` x `rows` units, with
//! one ordered key list per (mode, row) combination. Geometry is derived
//! from it by [`compile`](crate::layout::compile) and inverted by
//! [`hit`](crate::layout::hit); the tables themselves carry no pixels.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::warn;

pub mod catalog;
pub mod compile;
pub mod hit;
pub mod source;

// ---------------------------------------------------------------------------
// LayoutMode
// ---------------------------------------------------------------------------

/// Glyph-set selector: which `KeyDef` variant of each row is displayed and
/// emitted. Derived from the modifier state, never stored in the layout.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Normal,
    Shift,
}

impl LayoutMode {
    /// The row key used by the layout description format, e.g. `"shift_3"`.
    pub fn row_key(self, row: u32) -> String {
        format!("{self}_{row}")
    }
}

// ---------------------------------------------------------------------------
// KeyAction
// ---------------------------------------------------------------------------

/// Special key behavior. A key without an action is a plain character key.
///
/// The variants carry the exact wire strings of the layout description
/// format (`"shift_L"`, `"shift_R"`, ...); everything else is snake_case.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    Backspace,
    Capslock,
    Enter,
    Escape,
    /// Ask the host to show its layout picker.
    Layout,
    /// Generic shift: engages the shift modifier like the sided variants
    /// and, like them, never emits an activation.
    Shift,
    #[strum(serialize = "shift_L")]
    #[serde(rename = "shift_L")]
    ShiftL,
    #[strum(serialize = "shift_R")]
    #[serde(rename = "shift_R")]
    ShiftR,
}

impl KeyAction {
    /// Whether this action engages the shift modifier while held.
    #[inline]
    pub fn is_shift(self) -> bool {
        matches!(self, KeyAction::Shift | KeyAction::ShiftL | KeyAction::ShiftR)
    }
}

// ---------------------------------------------------------------------------
// KeyDef
// ---------------------------------------------------------------------------

/// Definition of a single key within one (mode, row) key list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyDef {
    /// Text drawn on the key.
    pub display: String,
    /// Payload inserted by the input sink when a plain character key fires.
    pub emit: String,
    /// Special behavior; `None` for plain character keys.
    pub action: Option<KeyAction>,
    /// Relative width in column units (not necessarily 1).
    pub width: f32,
}

impl KeyDef {
    /// A plain character key.
    pub fn character(display: impl Into<String>, emit: impl Into<String>, width: f32) -> Self {
        Self { display: display.into(), emit: emit.into(), action: None, width }
    }

    /// A special key. Special keys carry no emit payload.
    pub fn special(display: impl Into<String>, action: KeyAction, width: f32) -> Self {
        Self { display: display.into(), emit: String::new(), action: Some(action), width }
    }
}

// ---------------------------------------------------------------------------
// KeyPosition
// ---------------------------------------------------------------------------

/// A key's grid address: 1-based row (row 1 is the top band) and 0-based
/// index within the row's key list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyPosition {
    pub row: u32,
    pub index: usize,
}

impl KeyPosition {
    /// Create a new key position.
    #[inline]
    pub const fn new(row: u32, index: usize) -> Self {
        Self { row, index }
    }
}

// ---------------------------------------------------------------------------
// LayoutError
// ---------------------------------------------------------------------------

/// Validation and parsing failures for layout descriptions.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout `{name}` has invalid dimensions {cols}x{rows}")]
    BadDimensions { name: String, cols: u32, rows: u32 },

    #[error("layout `{name}` is missing row `{row_key}`")]
    MissingRow { name: String, row_key: String },

    #[error(
        "layout `{name}` row {row}: shift variant has {shift_keys} keys, \
         normal has {normal_keys}"
    )]
    RowMismatch { name: String, row: u32, normal_keys: usize, shift_keys: usize },

    #[error("unrecognized mode row key `{0}` in layout description")]
    BadModeKey(String),

    #[error("failed to parse layout description: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// A validated, in-memory keyboard layout table.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// Catalog key for this layout.
    pub name: String,
    /// Human-readable description from the layout file, if any.
    pub description: String,
    /// Grid width in column units.
    pub cols: u32,
    /// Number of key rows (uniform height).
    pub rows: u32,
    table: HashMap<(LayoutMode, u32), Vec<KeyDef>>,
}

impl Layout {
    /// Create an empty layout with the given grid dimensions.
    pub fn new(name: impl Into<String>, cols: u32, rows: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            cols,
            rows,
            table: HashMap::new(),
        }
    }

    /// Insert or replace the key list for one (mode, row) combination.
    /// Rows are 1-based; row 1 is the topmost band.
    pub fn set_row(&mut self, mode: LayoutMode, row: u32, keys: Vec<KeyDef>) {
        self.table.insert((mode, row), keys);
    }

    /// The key list for one (mode, row) combination.
    pub fn row(&self, mode: LayoutMode, row: u32) -> Option<&[KeyDef]> {
        self.table.get(&(mode, row)).map(Vec::as_slice)
    }

    /// Look up a single key by grid address in the given mode.
    pub fn key(&self, mode: LayoutMode, position: KeyPosition) -> Option<&KeyDef> {
        self.row(mode, position.row)?.get(position.index)
    }

    /// Check the table against its declared dimensions.
    ///
    /// Every (mode, row) combination implied by `rows` must be present, and
    /// each shift row must have the same key count as its normal
    /// counterpart so that a grid address resolves in either mode. Rows
    /// whose width units do not sum to `cols` are tolerated (the geometry
    /// pass lets them under- or overflow the row) but logged.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(LayoutError::BadDimensions {
                name: self.name.clone(),
                cols: self.cols,
                rows: self.rows,
            });
        }

        for row in 1..=self.rows {
            for mode in [LayoutMode::Normal, LayoutMode::Shift] {
                let keys = self.row(mode, row).ok_or_else(|| LayoutError::MissingRow {
                    name: self.name.clone(),
                    row_key: mode.row_key(row),
                })?;

                let width_sum: f32 = keys.iter().map(|key| key.width).sum();
                if (width_sum - self.cols as f32).abs() > 1e-3 {
                    warn!(
                        layout = %self.name,
                        row_key = %mode.row_key(row),
                        width_sum,
                        cols = self.cols,
                        "row width units do not sum to cols; row will under/overflow"
                    );
                }
            }

            let normal = self.row(LayoutMode::Normal, row).unwrap_or(&[]);
            let shift = self.row(LayoutMode::Shift, row).unwrap_or(&[]);
            if normal.len() != shift.len() {
                return Err(LayoutError::RowMismatch {
                    name: self.name.clone(),
                    row,
                    normal_keys: normal.len(),
                    shift_keys: shift.len(),
                });
            }

            // Geometry is compiled from the normal widths only, so a shift
            // key with a diverging width renders at its normal twin's
            // footprint. Tolerated, but worth a signal.
            for (index, (normal_key, shift_key)) in normal.iter().zip(shift).enumerate() {
                if (normal_key.width - shift_key.width).abs() > 1e-3 {
                    warn!(
                        layout = %self.name,
                        row,
                        index,
                        normal_width = normal_key.width,
                        shift_width = shift_key.width,
                        "shift key width differs from its normal counterpart; \
                         geometry uses the normal width"
                    );
                }
            }
        }

        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn two_key_layout() -> Layout {
        let mut layout = Layout::new("tiny", 2, 1);
        layout.set_row(
            LayoutMode::Normal,
            1,
            vec![KeyDef::character("a", "a", 1.0), KeyDef::character("b", "b", 1.0)],
        );
        layout.set_row(
            LayoutMode::Shift,
            1,
            vec![KeyDef::character("A", "A", 1.0), KeyDef::character("B", "B", 1.0)],
        );
        layout
    }

    // ── LayoutMode / KeyAction strings ───────────────────────────────

    #[test]
    fn mode_row_key_format() {
        assert_eq!(LayoutMode::Normal.row_key(1), "normal_1");
        assert_eq!(LayoutMode::Shift.row_key(3), "shift_3");
    }

    #[test]
    fn mode_from_str() {
        assert_eq!(LayoutMode::from_str("normal").unwrap(), LayoutMode::Normal);
        assert_eq!(LayoutMode::from_str("shift").unwrap(), LayoutMode::Shift);
        assert!(LayoutMode::from_str("Shift").is_err());
    }

    #[test]
    fn action_wire_strings() {
        assert_eq!(KeyAction::ShiftL.to_string(), "shift_L");
        assert_eq!(KeyAction::ShiftR.to_string(), "shift_R");
        assert_eq!(KeyAction::Backspace.to_string(), "backspace");
        assert_eq!(KeyAction::from_str("capslock").unwrap(), KeyAction::Capslock);
        assert_eq!(KeyAction::from_str("shift_L").unwrap(), KeyAction::ShiftL);
        assert!(KeyAction::from_str("shift_l").is_err());
    }

    #[test]
    fn action_serde_round_trip() {
        let json = serde_json::to_string(&KeyAction::ShiftR).unwrap();
        assert_eq!(json, "\"shift_R\"");
        let back: KeyAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, KeyAction::ShiftR);
    }

    #[test]
    fn action_is_shift() {
        assert!(KeyAction::Shift.is_shift());
        assert!(KeyAction::ShiftL.is_shift());
        assert!(KeyAction::ShiftR.is_shift());
        assert!(!KeyAction::Capslock.is_shift());
        assert!(!KeyAction::Backspace.is_shift());
    }

    // ── KeyDef ───────────────────────────────────────────────────────

    #[test]
    fn key_def_constructors() {
        let plain = KeyDef::character("q", "q", 1.0);
        assert_eq!(plain.action, None);
        assert_eq!(plain.emit, "q");

        let special = KeyDef::special("⇪", KeyAction::Capslock, 1.8);
        assert_eq!(special.action, Some(KeyAction::Capslock));
        assert_eq!(special.emit, "");
        assert_eq!(special.width, 1.8);
    }

    // ── Layout lookup ────────────────────────────────────────────────

    #[test]
    fn layout_row_and_key_lookup() {
        let layout = two_key_layout();
        assert_eq!(layout.row(LayoutMode::Normal, 1).unwrap().len(), 2);
        assert_eq!(
            layout.key(LayoutMode::Shift, KeyPosition::new(1, 1)).unwrap().display,
            "B"
        );
        assert!(layout.row(LayoutMode::Normal, 2).is_none());
        assert!(layout.key(LayoutMode::Normal, KeyPosition::new(1, 5)).is_none());
    }

    // ── Validation ───────────────────────────────────────────────────

    #[test]
    fn validate_accepts_complete_table() {
        assert!(two_key_layout().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_dimensions() {
        let layout = Layout::new("empty", 0, 1);
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::BadDimensions { cols: 0, rows: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_missing_shift_row() {
        let mut layout = Layout::new("half", 1, 1);
        layout.set_row(LayoutMode::Normal, 1, vec![KeyDef::character("a", "a", 1.0)]);
        match layout.validate() {
            Err(LayoutError::MissingRow { row_key, .. }) => assert_eq!(row_key, "shift_1"),
            other => panic!("expected MissingRow, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_row_count_mismatch() {
        let mut layout = two_key_layout();
        layout.set_row(LayoutMode::Shift, 1, vec![KeyDef::character("A", "A", 2.0)]);
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::RowMismatch { row: 1, normal_keys: 2, shift_keys: 1, .. })
        ));
    }

    #[test]
    fn validate_tolerates_width_sum_mismatch() {
        // Widths summing to 1.5 against cols = 2: warned, not rejected.
        let mut layout = Layout::new("short", 2, 1);
        layout.set_row(LayoutMode::Normal, 1, vec![KeyDef::character("a", "a", 1.5)]);
        layout.set_row(LayoutMode::Shift, 1, vec![KeyDef::character("A", "A", 1.5)]);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn validate_tolerates_divergent_shift_widths() {
        // Equal counts and equal sums, but the per-key widths disagree
        // between modes. Geometry follows the normal widths; warned, not
        // rejected.
        let mut layout = Layout::new("skew", 3, 1);
        layout.set_row(
            LayoutMode::Normal,
            1,
            vec![KeyDef::character("a", "a", 1.0), KeyDef::character("b", "b", 2.0)],
        );
        layout.set_row(
            LayoutMode::Shift,
            1,
            vec![KeyDef::character("A", "A", 2.0), KeyDef::character("B", "B", 1.0)],
        );
        assert!(layout.validate().is_ok());
    }
}
