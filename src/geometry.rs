//! Plain geometry values exchanged with the host environment.
//!
//! Everything here is measured in host pixels unless stated otherwise.
//! Logical (unscaled) coordinates are derived from these by the
//! coordinate pipeline, see [`crate::core::Ratio`].

use serde::{Deserialize, Serialize};

/// Opaque reference to an element owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Computed positioning scheme of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
}

impl PositionMode {
    /// Absolute and fixed elements report a true offset; the others are
    /// moved by relative deltas from wherever layout put them.
    pub fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
}

impl Margins {
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Scroll extents of a container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Full content width, including the part scrolled out of view
    pub scroll_width: f64,
    pub scroll_height: f64,
    /// Visible inner width, excluding scrollbars
    pub client_width: f64,
    pub client_height: f64,
    /// Outer box width, including scrollbars
    pub offset_width: f64,
    pub offset_height: f64,
    pub scroll_left: f64,
    pub scroll_top: f64,
}

impl ScrollMetrics {
    /// True when content overflows the box on at least one axis.
    pub fn is_scrollable(&self) -> bool {
        self.scroll_width > self.offset_width || self.scroll_height > self.offset_height
    }

    pub fn max_scroll_left(&self) -> f64 {
        (self.scroll_width - self.client_width).max(0.0)
    }

    pub fn max_scroll_top(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}
