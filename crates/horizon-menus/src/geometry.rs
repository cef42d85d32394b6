//! Geometry types and screen-fit placement for menus.
//!
//! All coordinates are in viewport space: `(0, 0)` is the top-left corner of
//! the surface menus are shown on, and the viewport size bounds where a menu
//! may be placed.

use serde::{Deserialize, Serialize};

/// Horizontal overlap between a submenu and the item that opened it.
pub const SUBMENU_OVERLAP: f32 = 3.0;

/// A point in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
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

    /// The origin point (0, 0).
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Offset this point by another point's coordinates.
    #[inline]
    pub fn offset(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// A 2D size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
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

    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Check if the size has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle from origin and size.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    /// Create a rectangle from an origin point and a size.
    #[inline]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Empty rectangle at origin.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    /// Left edge x coordinate.
    #[inline]
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    /// Top edge y coordinate.
    #[inline]
    pub fn top(&self) -> f32 {
        self.origin.y
    }

    /// Right edge x coordinate.
    #[inline]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    /// Bottom edge y coordinate.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    /// Width of the rectangle.
    #[inline]
    pub fn width(&self) -> f32 {
        self.size.width
    }

    /// Height of the rectangle.
    #[inline]
    pub fn height(&self) -> f32 {
        self.size.height
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// The same rectangle moved by `by`.
    #[inline]
    pub fn translated(&self, by: Point) -> Self {
        Self::from_origin_size(self.origin.offset(by), self.size)
    }
}

/// Fit a box of `size` at `desired` inside `viewport`.
///
/// On each axis the desired coordinate is kept when it is forced or when the
/// box fits before the far edge; otherwise the box is pulled back so its far
/// edge meets the viewport edge, never past zero.
pub fn fit_position(
    desired: Point,
    size: Size,
    viewport: Size,
    force_x: bool,
    force_y: bool,
) -> Point {
    Point::new(
        fit_axis(desired.x, size.width, viewport.width, force_x),
        fit_axis(desired.y, size.height, viewport.height, force_y),
    )
}

fn fit_axis(value: f32, extent: f32, available: f32, forced: bool) -> f32 {
    if forced {
        value
    } else if value + extent <= available {
        value.max(0.0)
    } else {
        (available - extent).max(0.0)
    }
}

/// Place a submenu beside the item that opened it.
///
/// The submenu opens to the right of `item_rect`, shifted up by
/// `content_inset` so its first row lines up with the item. When it does
/// not fit on the right it flips to the left of the item, and when it does
/// not fit below it is raised to end at the item's bottom edge.
pub fn submenu_position(item_rect: Rect, size: Size, viewport: Size, content_inset: f32) -> Point {
    let mut x = item_rect.right() - SUBMENU_OVERLAP;
    let mut y = item_rect.top() - content_inset;

    if x + size.width > viewport.width {
        x = item_rect.left() + SUBMENU_OVERLAP - size.width;
    }
    if y + size.height > viewport.height {
        y = item_rect.bottom() + content_inset - size.height;
    }

    fit_position(Point::new(x, y), size, viewport, false, false)
}

/// Place a menu-bar dropdown directly below the bar item.
///
/// The vertical position is forced so the dropdown stays attached to the
/// bar; the horizontal position is fitted.
pub fn dropdown_position(item_rect: Rect, size: Size, viewport: Size) -> Point {
    fit_position(
        Point::new(item_rect.left(), item_rect.bottom()),
        size,
        viewport,
        false,
        true,
    )
}
