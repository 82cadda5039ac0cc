//! Layout catalog: validated layouts keyed by name, with fallback resolution.
//!
//! Registration is overwrite-last-wins: re-registering a name replaces the
//! previous layout, so hosts can reload description files in place.
//! Resolution substitutes the built-in default for unknown names; an empty
//! catalog is a fatal configuration error, since the keyboard cannot render
//! with zero layouts.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::source;
use crate::layout::{Layout, LayoutError};

/// Name of the built-in fallback layout.
pub const DEFAULT_LAYOUT: &str = "qwerty";

// ---------------------------------------------------------------------------
// CatalogError
// ---------------------------------------------------------------------------

/// Fatal catalog conditions. Unknown names alone are *not* errors — they
/// fall back to [`DEFAULT_LAYOUT`] with a warning.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no layouts registered; the keyboard cannot render")]
    NoLayouts,

    #[error("layout `{requested}` not found and default `{DEFAULT_LAYOUT}` is not registered")]
    DefaultMissing { requested: String },
}

// ---------------------------------------------------------------------------
// Resolved
// ---------------------------------------------------------------------------

/// Outcome of a successful name resolution.
///
/// `fell_back` is true when the requested name was unknown and the default
/// was substituted; hosts can surface this to the user.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub layout: &'a Layout,
    pub fell_back: bool,
}

// ---------------------------------------------------------------------------
// LayoutCatalog
// ---------------------------------------------------------------------------

/// Validated layout descriptions keyed by name.
#[derive(Debug, Default, Clone)]
pub struct LayoutCatalog {
    layouts: HashMap<String, Layout>,
}

impl LayoutCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-seeded with the built-in qwerty layout.
    pub fn with_builtin() -> Self {
        let mut catalog = Self::new();
        // The built-in table is validated by its own tests.
        catalog.layouts.insert(DEFAULT_LAYOUT.to_string(), source::qwerty());
        catalog
    }

    /// Register a layout under its own name, overwriting any previous
    /// layout with that name (last registration wins).
    ///
    /// The layout is validated first; invalid tables are rejected and the
    /// catalog is left unchanged.
    pub fn register(&mut self, layout: Layout) -> Result<(), LayoutError> {
        layout.validate()?;
        if self.layouts.contains_key(&layout.name) {
            debug!(layout = %layout.name, "replacing previously registered layout");
        }
        self.layouts.insert(layout.name.clone(), layout);
        Ok(())
    }

    /// The layout registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Layout> {
        self.layouts.get(name)
    }

    /// Registered layout names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    /// Number of registered layouts.
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    /// Whether no layouts are registered.
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Resolve a requested layout name.
    ///
    /// Returns the layout itself when present. An unknown name logs a
    /// warning and substitutes [`DEFAULT_LAYOUT`]; if the default is also
    /// missing, or the catalog is empty, resolution fails.
    pub fn resolve(&self, requested: &str) -> Result<Resolved<'_>, CatalogError> {
        if self.layouts.is_empty() {
            return Err(CatalogError::NoLayouts);
        }
        if let Some(layout) = self.get(requested) {
            return Ok(Resolved { layout, fell_back: false });
        }
        warn!(
            requested,
            fallback = DEFAULT_LAYOUT,
            "requested keyboard layout not found, falling back"
        );
        match self.get(DEFAULT_LAYOUT) {
            Some(layout) => Ok(Resolved { layout, fell_back: true }),
            None => Err(CatalogError::DefaultMissing { requested: requested.to_string() }),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
