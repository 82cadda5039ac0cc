//! Keyboard facade: catalog, geometry, and key state behind one type.
//!
//! [`Keyboard`] owns the pieces and routes events between them: touches go
//! through the hit tester into the state machine, resizes re-run the pixel
//! pass, layout and margin changes re-run both geometry passes. Mode flips
//! recompute nothing — glyph lookups read the current mode lazily, and the
//! [`Response`] flags tell the renderer what to redraw.

use thiserror::Error;
use tracing::debug;

use crate::event::{TouchId, TouchRef};
use crate::geometry::{Margins, PixelRect, Point, Size};
use crate::layout::catalog::{CatalogError, LayoutCatalog};
use crate::layout::compile::{
    compile_hints, compile_pixels, CompileError, HintGeometry, PixelGeometry,
};
use crate::layout::hit::locate_key;
use crate::layout::{KeyDef, Layout, LayoutError, LayoutMode};
use crate::state::{KeyStateMachine, Response};

// ---------------------------------------------------------------------------
// KeyboardError
// ---------------------------------------------------------------------------

/// Top-level failures when building or reconfiguring a keyboard.
#[derive(Debug, Error)]
pub enum KeyboardError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

// ---------------------------------------------------------------------------
// KeyboardConfig
// ---------------------------------------------------------------------------

/// Initial keyboard configuration.
#[derive(Debug, Clone)]
pub struct KeyboardConfig {
    /// Requested layout name; unknown names fall back to the default.
    pub layout: String,
    /// Widget size in pixels.
    pub size: Size,
    /// Outer margin as fractions of the widget size.
    pub margin_hint: Margins,
    /// Per-key margin in pixels.
    pub key_margin: Margins,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            layout: crate::layout::catalog::DEFAULT_LAYOUT.to_string(),
            size: Size::new(700.0, 200.0),
            margin_hint: Margins::new(0.05, 0.06, 0.05, 0.06),
            key_margin: Margins::all(2.0),
        }
    }
}

impl KeyboardConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requested layout name (builder).
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Set the widget size (builder).
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Set the outer margin fractions (builder).
    pub fn with_margin_hint(mut self, margin_hint: Margins) -> Self {
        self.margin_hint = margin_hint;
        self
    }

    /// Set the per-key pixel margin (builder).
    pub fn with_key_margin(mut self, key_margin: Margins) -> Self {
        self.key_margin = key_margin;
        self
    }
}

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

/// A data-driven multi-touch keyboard core.
///
/// Holds no rendering resources: the renderer pulls [`pixel_geometry`],
/// [`key_row`], and [`active_key_rects`] and draws; the host feeds touches
/// and resizes in.
///
/// [`pixel_geometry`]: Keyboard::pixel_geometry
/// [`key_row`]: Keyboard::key_row
/// [`active_key_rects`]: Keyboard::active_key_rects
#[derive(Debug)]
pub struct Keyboard {
    catalog: LayoutCatalog,
    layout: Layout,
    size: Size,
    margin_hint: Margins,
    key_margin: Margins,
    hints: HintGeometry,
    pixels: PixelGeometry,
    state: KeyStateMachine,
    fell_back: bool,
}

impl Keyboard {
    /// Build a keyboard from a catalog and configuration.
    ///
    /// Resolves the requested layout (with fallback), then compiles both
    /// geometry stages. Fails if the catalog cannot resolve any layout or
    /// the margin fractions are invalid.
    pub fn new(catalog: LayoutCatalog, config: KeyboardConfig) -> Result<Self, KeyboardError> {
        let resolved = catalog.resolve(&config.layout)?;
        let layout = resolved.layout.clone();
        let fell_back = resolved.fell_back;

        let hints = compile_hints(&layout, config.margin_hint)?;
        let pixels = compile_pixels(&hints, config.size, config.key_margin);
        debug!(layout = %layout.name, "keyboard ready");

        Ok(Self {
            catalog,
            layout,
            size: config.size,
            margin_hint: config.margin_hint,
            key_margin: config.key_margin,
            hints,
            pixels,
            state: KeyStateMachine::new(),
            fell_back,
        })
    }

    /// Build a keyboard over the built-in catalog.
    pub fn with_builtin(config: KeyboardConfig) -> Result<Self, KeyboardError> {
        Self::new(LayoutCatalog::with_builtin(), config)
    }

    // ── accessors ────────────────────────────────────────────────────

    /// The currently selected layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Whether the last layout selection fell back to the default.
    pub fn layout_fell_back(&self) -> bool {
        self.fell_back
    }

    /// Current layout mode (shift XOR capslock).
    pub fn mode(&self) -> LayoutMode {
        self.state.mode()
    }

    /// Current widget size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Compiled hint geometry (recomputed on layout/margin changes only).
    pub fn hint_geometry(&self) -> &HintGeometry {
        &self.hints
    }

    /// Compiled pixel geometry for the renderer.
    pub fn pixel_geometry(&self) -> &PixelGeometry {
        &self.pixels
    }

    /// The key state machine (modifiers, active keys).
    pub fn state(&self) -> &KeyStateMachine {
        &self.state
    }

    /// The layout catalog.
    pub fn catalog(&self) -> &LayoutCatalog {
        &self.catalog
    }

    /// The glyph list for a 1-based row under the current mode.
    pub fn key_row(&self, row: u32) -> Option<&[KeyDef]> {
        self.layout.row(self.mode(), row)
    }

    /// Pixel rectangles of the currently highlighted keys.
    pub fn active_key_rects(&self) -> Vec<(TouchRef, PixelRect)> {
        self.state
            .active_keys()
            .iter()
            .filter_map(|(touch_ref, position)| {
                let rect = *self.pixels.row(position.row)?.get(position.index)?;
                Some((*touch_ref, rect))
            })
            .collect()
    }

    // ── reconfiguration ──────────────────────────────────────────────

    /// Register an additional layout in the catalog.
    pub fn register_layout(&mut self, layout: Layout) -> Result<(), KeyboardError> {
        self.catalog.register(layout)?;
        Ok(())
    }

    /// Switch to another layout (with fallback for unknown names) and
    /// recompile both geometry stages. Returns whether the selection fell
    /// back to the default.
    pub fn set_layout(&mut self, name: &str) -> Result<bool, KeyboardError> {
        let resolved = self.catalog.resolve(name)?;
        let layout = resolved.layout.clone();
        let fell_back = resolved.fell_back;

        let hints = compile_hints(&layout, self.margin_hint)?;
        self.pixels = compile_pixels(&hints, self.size, self.key_margin);
        self.hints = hints;
        self.layout = layout;
        self.fell_back = fell_back;
        Ok(fell_back)
    }

    /// The window resized: recompute pixel geometry only.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.pixels = compile_pixels(&self.hints, size, self.key_margin);
    }

    /// Change the outer margin fractions and recompile both stages.
    ///
    /// On invalid margins the keyboard keeps its previous geometry.
    pub fn set_margin_hint(&mut self, margin_hint: Margins) -> Result<(), KeyboardError> {
        let hints = compile_hints(&self.layout, margin_hint)?;
        self.pixels = compile_pixels(&hints, self.size, self.key_margin);
        self.hints = hints;
        self.margin_hint = margin_hint;
        Ok(())
    }

    /// Change the per-key pixel margin and recompute pixel geometry.
    pub fn set_key_margin(&mut self, key_margin: Margins) {
        self.key_margin = key_margin;
        self.pixels = compile_pixels(&self.hints, self.size, key_margin);
    }

    // ── touch events ─────────────────────────────────────────────────

    /// A touch went down on the widget.
    ///
    /// Margin touches resolve to no key and leave all state untouched (the
    /// host's transform layer owns them). Key touches run the state
    /// machine; the response carries the activation and redraw flags.
    pub fn touch_down(&mut self, touch: TouchId, point: Point) -> Response {
        let Some(hit) = locate_key(
            &self.layout,
            self.state.mode(),
            &self.hints,
            self.size,
            self.margin_hint,
            point,
        ) else {
            return Response::default();
        };
        self.state.key_down(touch, &hit)
    }

    /// A touch previously delivered to [`touch_down`](Keyboard::touch_down)
    /// lifted.
    pub fn touch_up(&mut self, touch: TouchId) -> Response {
        self.state.key_up(touch)
    }

    /// A grabbed touch was cancelled; cleaned up exactly like a touch-up.
    pub fn touch_cancel(&mut self, touch: TouchId) -> Response {
        self.state.cancel(touch)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
