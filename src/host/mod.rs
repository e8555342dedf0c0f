//! Capabilities the embedding environment supplies to the engine.
//!
//! The engine never touches a document, a window or a clock directly.
//! Everything it needs from the outside world goes through the traits
//! below, bundled as [`Host`]:
//!
//! - [`Geometry`] - measurements and the one visual write (element position)
//! - [`ElementResolver`] - selector queries, containment and hit testing
//! - [`InputSource`] - which elements deliver press input, pointer capture
//! - [`Affordance`] - class names and cursor shape
//! - [`Scheduler`] - repeating timers (auto-scroll)
//! - [`ShadowSurface`] - transient shadow elements (drag shadow)
//!
//! [`MemoryHost`] implements all of them over an in-memory element tree and
//! is what the test suite drives.

mod hit_index;
mod memory;

use hit_index::{HitEntry, HitIndex};
pub use memory::{ElementSpec, MemoryHost, PositionWrite};

use crate::geometry::{ElementId, Margins, Point, PositionMode, Rect, ScrollMetrics, Size};
use std::time::Duration;

/// Geometry provider.
pub trait Geometry {
    /// Unscaled border-box size (what layout thinks the element measures).
    fn box_size(&self, element: ElementId) -> Size;

    /// Rendered rectangle in screen coordinates, after any visual scaling.
    fn client_rect(&self, element: ElementId) -> Rect;

    /// Offset relative to the nearest positioned ancestor.
    fn offset(&self, element: ElementId) -> Point;

    fn position_mode(&self, element: ElementId) -> PositionMode;

    fn margins(&self, element: ElementId) -> Margins;

    /// Nearest positioned ancestor, or the root when there is none.
    fn offset_parent(&self, element: ElementId) -> Option<ElementId>;

    fn scroll_metrics(&self, element: ElementId) -> ScrollMetrics;

    /// Offset accumulated along the offset-parent chain, ignoring scroll.
    fn page_offset(&self, element: ElementId) -> Point;

    /// Set the element's visual position (style left/top).
    fn write_position(&self, element: ElementId, left: f64, top: f64);

    /// Scroll a container. `None` leaves that axis alone.
    fn scroll_to(&self, element: ElementId, left: Option<f64>, top: Option<f64>);
}

/// Element selection.
pub trait ElementResolver {
    /// All elements matching `selector` below `scope` (the whole tree when
    /// `scope` is `None`), in document order.
    fn query(&self, selector: &str, scope: Option<ElementId>) -> Vec<ElementId>;

    /// True when `node` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool;

    /// Deepest element rendered under a screen coordinate.
    fn element_at(&self, client: Point) -> Option<ElementId>;
}

/// What an input listener is attached for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenKind {
    /// Press, enter and leave on a drag handle
    Handle,
    /// Delegated press on an event-proxy container
    Proxy,
}

/// Input wiring. The host routes events from listened elements back into
/// [`crate::DragCore`]'s input entry points.
pub trait InputSource {
    fn listen(&self, element: ElementId, kind: ListenKind);
    fn unlisten(&self, element: ElementId, kind: ListenKind);

    /// Start routing document-wide move/release to the engine.
    fn capture_pointer(&self);
    fn release_pointer(&self);
}

/// Fire-and-forget visual affordances.
pub trait Affordance {
    fn add_class(&self, element: ElementId, class: &str);
    fn remove_class(&self, element: ElementId, class: &str);

    /// Current document cursor; empty means the default.
    fn cursor(&self) -> String;
    fn set_cursor(&self, cursor: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Repeating timers on the UI thread.
pub trait Scheduler {
    fn set_interval(&self, period: Duration, callback: Box<dyn FnMut()>) -> TimerId;

    /// Cancel a timer. Unknown or already-cleared ids are ignored.
    fn clear_interval(&self, timer: TimerId);
}

/// Appearance of a drag shadow.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowStyle {
    pub opacity: f64,
    /// Positioned against the viewport instead of the offset parent
    pub fixed: bool,
    pub class: Option<String>,
    pub size: Size,
}

/// Creation and disposal of shadow elements.
pub trait ShadowSurface {
    /// Clone `source` into a detached, non-interactive element.
    fn create_shadow(&self, source: ElementId, style: &ShadowStyle) -> ElementId;

    /// Insert `shadow` next to `sibling`, under the same parent.
    fn attach_shadow(&self, shadow: ElementId, sibling: ElementId);

    fn remove_element(&self, element: ElementId);
}

/// Everything the engine needs from its environment.
pub trait Host: Geometry + ElementResolver + InputSource + Affordance + Scheduler + ShadowSurface {}

impl<T> Host for T where T: Geometry + ElementResolver + InputSource + Affordance + Scheduler + ShadowSurface {}

/// Split a space-separated class list.
pub(crate) fn class_names(classes: &str) -> impl Iterator<Item = &str> {
    classes.split_whitespace()
}
