// src/geometry.rs

//! Integer rectangles and density-independent unit conversion.
//!
//! ## Coordinate Units
//!
//! 1. **Pixels** (i32): device pixels, as reported by the host's measurement pass.
//!    - Used by: resize validation, container frames, `ScreenMetrics` pixel rects
//!
//! 2. **Dips** (i32): density-independent units, as spoken by the creative.
//!    - Used by: command parameters, geometry notifications
//!
//! ## Conversion Rules
//!
//! - Dips → Pixels: `round(dips * density)`
//! - Pixels → Dips: `round(px / density)`
//!
//! Rounding is half away from zero, so negative offsets convert symmetrically.

use serde::{Deserialize, Serialize};

/// Device pixels.
pub type Px = i32;

/// Density-independent units.
pub type Dips = i32;

/// Converts a density-independent length to device pixels.
pub fn dips_to_px(dips: Dips, density: f32) -> Px {
    (dips as f32 * density).round() as Px
}

/// Converts a device pixel length to density-independent units.
pub fn px_to_dips(px: Px, density: f32) -> Dips {
    if density <= 0.0 {
        return px;
    }
    (px as f32 / density).round() as Dips
}

/// An axis-aligned rectangle with exclusive right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Builds a rect from an origin and a size. Negative sizes collapse to zero.
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect::new(x, y, x + width.max(0), y + height.max(0))
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Returns true if `other` lies entirely inside `self`.
    ///
    /// An empty `self` contains nothing, not even another empty rect.
    pub fn contains(&self, other: &Rect) -> bool {
        !self.is_empty()
            && self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    /// Moves the rect so its top-left corner sits at (`left`, `top`), keeping its size.
    pub fn offset_to(&mut self, left: i32, top: i32) {
        let (width, height) = (self.width(), self.height());
        self.left = left;
        self.top = top;
        self.right = left + width;
        self.bottom = top + height;
    }

    /// Returns a copy translated by (`dx`, `dy`).
    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    /// Converts each edge from pixels to dips.
    pub fn to_dips(&self, density: f32) -> Rect {
        Rect::new(
            px_to_dips(self.left, density),
            px_to_dips(self.top, density),
            px_to_dips(self.right, density),
            px_to_dips(self.bottom, density),
        )
    }
}

/// Where the close-affordance square sits inside an ad's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosePosition {
    TopLeft,
    TopCenter,
    #[default]
    TopRight,
    Center,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

/// Derives the close-affordance region for `bounds`, a `size` x `size` square
/// placed by `position` gravity.
pub fn close_region(bounds: &Rect, size: Px, position: ClosePosition) -> Rect {
    use ClosePosition::*;

    let left = match position {
        TopLeft | BottomLeft => bounds.left,
        TopCenter | Center | BottomCenter => bounds.left + (bounds.width() - size) / 2,
        TopRight | BottomRight => bounds.right - size,
    };
    let top = match position {
        TopLeft | TopCenter | TopRight => bounds.top,
        Center => bounds.top + (bounds.height() - size) / 2,
        BottomLeft | BottomCenter | BottomRight => bounds.bottom - size,
    };
    Rect::from_xywh(left, top, size, size)
}
