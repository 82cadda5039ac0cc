//! Declarative layout descriptions: JSON parsing and the built-in table.
//!
//! A layout description is a flat JSON object: `title`, `description`,
//! `cols`, `rows`, plus one `"<mode>_<row>"` entry per (mode, row)
//! combination. Each key is a 4-element array in source order
//! `[display_text, emit_payload, action, width_units]`, with `null` for
//! "no action" and for the emit payload of special keys.
//!
//! File discovery and reading stay with the host; the core parses from a
//! string and validates the resulting table.

use std::collections::HashMap;

use serde::Deserialize;

use crate::layout::{KeyAction, KeyDef, Layout, LayoutError, LayoutMode};

// ---------------------------------------------------------------------------
// JSON parsing
// ---------------------------------------------------------------------------

/// One key entry in source order: `(display, emit, action, width)`.
#[derive(Deserialize)]
struct RawKey(String, Option<String>, Option<KeyAction>, f32);

/// The flat JSON document; mode rows are captured by the flattened map.
///
/// `title` and `description` must be named fields so the flatten map only
/// ever sees `"<mode>_<row>"` entries.
#[derive(Deserialize)]
struct RawLayout {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    cols: u32,
    rows: u32,
    #[serde(flatten)]
    mode_rows: HashMap<String, Vec<RawKey>>,
}

/// Parse and validate a layout description.
///
/// `name` becomes the catalog key; hosts loading description files will
/// typically pass the file basename. Fails if the JSON is malformed, a
/// mode-row key is not of the `"<mode>_<row>"` form, or the table does not
/// validate against its declared dimensions.
pub fn parse_layout(name: &str, json: &str) -> Result<Layout, LayoutError> {
    let raw: RawLayout = serde_json::from_str(json)?;

    let mut layout = Layout::new(name, raw.cols, raw.rows);
    layout.description = if raw.description.is_empty() { raw.title } else { raw.description };

    for (row_key, raw_keys) in raw.mode_rows {
        let (mode, row) = parse_row_key(&row_key)?;
        let keys = raw_keys
            .into_iter()
            .map(|RawKey(display, emit, action, width)| KeyDef {
                display,
                emit: emit.unwrap_or_default(),
                action,
                width,
            })
            .collect();
        layout.set_row(mode, row, keys);
    }

    layout.validate()?;
    Ok(layout)
}

/// Split `"shift_3"` into `(LayoutMode::Shift, 3)`.
fn parse_row_key(row_key: &str) -> Result<(LayoutMode, u32), LayoutError> {
    let bad = || LayoutError::BadModeKey(row_key.to_string());
    let (mode, row) = row_key.rsplit_once('_').ok_or_else(bad)?;
    let mode = mode.parse::<LayoutMode>().map_err(|_| bad())?;
    let row = row.parse::<u32>().map_err(|_| bad())?;
    Ok((mode, row))
}

// ---------------------------------------------------------------------------
// Built-in qwerty
// ---------------------------------------------------------------------------

/// The built-in US qwerty layout: 15 column units, 5 rows.
///
/// This is the catalog's fallback target, so it ships in-crate rather than
/// as a data file.
pub fn qwerty() -> Layout {
    let mut layout = Layout::new("qwerty", 15, 5);
    layout.description = "Classical US keyboard".to_string();

    // Row 1: digits.
    let mut normal = unit_keys("`1234567890-=");
    normal.push(KeyDef::special("⌫", KeyAction::Backspace, 2.0));
    let mut shift = unit_keys("~!@#$%^&*()_+");
    shift.push(KeyDef::special("⌫", KeyAction::Backspace, 2.0));
    layout.set_row(LayoutMode::Normal, 1, normal);
    layout.set_row(LayoutMode::Shift, 1, shift);

    // Row 2: tab + top letter row.
    let mut normal = vec![KeyDef::character("⇥", "\t", 1.5)];
    normal.extend(unit_keys("qwertyuiop[]"));
    normal.push(KeyDef::character("\\", "\\", 1.5));
    let mut shift = vec![KeyDef::character("⇥", "\t", 1.5)];
    shift.extend(unit_keys("QWERTYUIOP{}"));
    shift.push(KeyDef::character("|", "|", 1.5));
    layout.set_row(LayoutMode::Normal, 2, normal);
    layout.set_row(LayoutMode::Shift, 2, shift);

    // Row 3: capslock + home row + enter.
    let mut normal = vec![KeyDef::special("⇪", KeyAction::Capslock, 1.8)];
    normal.extend(unit_keys("asdfghjkl;'"));
    normal.push(KeyDef::special("⏎", KeyAction::Enter, 2.2));
    let mut shift = vec![KeyDef::special("⇪", KeyAction::Capslock, 1.8)];
    shift.extend(unit_keys("ASDFGHJKL:\""));
    shift.push(KeyDef::special("⏎", KeyAction::Enter, 2.2));
    layout.set_row(LayoutMode::Normal, 3, normal);
    layout.set_row(LayoutMode::Shift, 3, shift);

    // Row 4: bottom letter row between the two shifts.
    let mut normal = vec![KeyDef::special("⇧", KeyAction::ShiftL, 2.5)];
    normal.extend(unit_keys("zxcvbnm,./"));
    normal.push(KeyDef::special("⇧", KeyAction::ShiftR, 2.5));
    let mut shift = vec![KeyDef::special("⇧", KeyAction::ShiftL, 2.5)];
    shift.extend(unit_keys("ZXCVBNM<>?"));
    shift.push(KeyDef::special("⇧", KeyAction::ShiftR, 2.5));
    layout.set_row(LayoutMode::Normal, 4, normal);
    layout.set_row(LayoutMode::Shift, 4, shift);

    // Row 5: layout picker, escape, space bar, punctuation.
    let bottom = vec![
        KeyDef::special("⌨", KeyAction::Layout, 1.5),
        KeyDef::special("esc", KeyAction::Escape, 1.5),
        KeyDef::character("", " ", 10.0),
        KeyDef::character(",", ",", 1.0),
        KeyDef::character(".", ".", 1.0),
    ];
    layout.set_row(LayoutMode::Normal, 5, bottom.clone());
    layout.set_row(LayoutMode::Shift, 5, bottom);

    layout
}

/// Unit-width character keys whose display and payload are the same glyph.
fn unit_keys(glyphs: &str) -> Vec<KeyDef> {
    glyphs
        .chars()
        .map(|glyph| KeyDef::character(glyph.to_string(), glyph.to_string(), 1.0))
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================
