//! Core geometry types: Point, Size, HintRect, PixelRect, Margins.
//!
//! Two coordinate spaces coexist. *Hint* space expresses positions and sizes
//! as fractions of the widget in `[0, 1]`, independent of pixel dimensions.
//! *Pixel* space is the widget surface in integer pixels. Both use the
//! renderer's convention: origin at the bottom-left corner, y axis up, so
//! the visually topmost row has the largest y.

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A position on the widget surface, in pixels (widget-local coordinates).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// Widget dimensions in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Normalize a pixel point against this size, yielding hint coordinates.
    ///
    /// Points inside the widget map into `[0, 1]^2`.
    #[inline]
    pub fn normalize(self, point: Point) -> (f32, f32) {
        (point.x / self.width, point.y / self.height)
    }
}

// ---------------------------------------------------------------------------
// HintRect
// ---------------------------------------------------------------------------

/// A key rectangle in hint space: origin and size as fractions of the widget.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HintRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl HintRect {
    /// Create a new hint rectangle.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether a normalized x coordinate falls in this key's horizontal
    /// band `[x, x + width)`.
    ///
    /// The half-open interval makes adjacent keys partition a row without
    /// double-claiming the shared edge.
    #[inline]
    pub fn spans_x(self, x_hint: f32) -> bool {
        x_hint >= self.x && x_hint < self.x + self.width
    }
}

// ---------------------------------------------------------------------------
// PixelRect
// ---------------------------------------------------------------------------

/// A key rectangle on the pixel-addressed surface.
///
/// Produced by scaling a [`HintRect`] to the widget size and subtracting the
/// per-key margins; all components are floor-truncated. Width or height may
/// be negative when key margins exceed the key's size — callers configure
/// margins, the geometry pass does not correct them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    /// Create a new pixel rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// The center of the rectangle, as a pixel-space [`Point`].
    #[inline]
    pub fn center(self) -> Point {
        Point::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Margins
// ---------------------------------------------------------------------------

/// Spacing around the four sides of a rectangle, ordered `(top, right,
/// bottom, left)` as in the layout description format.
///
/// Used in two roles: the widget's outer margin as *fractions* of its size
/// (the non-interactive border), and the per-key margin in *pixels* (drawn
/// as inter-key spacing).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    /// Zero spacing on all sides.
    pub const ZERO: Margins = Margins { top: 0.0, right: 0.0, bottom: 0.0, left: 0.0 };

    /// Create margins with explicit values for each side.
    #[inline]
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    /// All four sides set to the same value.
    #[inline]
    pub const fn all(value: f32) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// Total horizontal extent: `left + right`.
    #[inline]
    pub fn horizontal(self) -> f32 {
        self.left + self.right
    }

    /// Total vertical extent: `top + bottom`.
    #[inline]
    pub fn vertical(self) -> f32 {
        self.top + self.bottom
    }
}

// ===========================================================================
// Tests
// ===========================================================================
