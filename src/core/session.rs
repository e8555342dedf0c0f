//! Per-pair drag records and the session state machine.
//!
//! Every bound (target, handle) pair owns one [`SessionRecord`]. At most one
//! of them is active at a time, tracked by [`SessionPhase`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle     -> Pressed    (press on a bound handle)
//! Pressed  -> Dragging   (first move sample)
//! Pressed  -> Idle       (release, disable, rebind)
//! Dragging -> Idle       (release, disable, rebind)
//! ```

use crate::geometry::{ElementId, Point};
use serde::Serialize;

/// Mutable drag state of one (target, handle) pair.
///
/// `x`/`y` always hold the last committed position. Pointer fields hold the
/// last sample seen while this pair was active.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub target: ElementId,
    pub handle: ElementId,
    /// True strictly between press and release
    pub dragging: bool,
    pub client_x: f64,
    pub client_y: f64,
    pub page_x: f64,
    pub page_y: f64,
    /// Pointer page position minus the element's logical origin, at press
    pub offset_x: f64,
    pub offset_y: f64,
    /// Distance from the pointer to the element's rendered corner, at press
    pub offset_inset_x: f64,
    pub offset_inset_y: f64,
    pub initial_x: f64,
    pub initial_y: f64,
    pub margin_left: f64,
    pub margin_top: f64,
    pub x: f64,
    pub y: f64,
}

impl SessionRecord {
    pub fn new(target: ElementId, handle: ElementId) -> Self {
        Self {
            target,
            handle,
            dragging: false,
            client_x: 0.0,
            client_y: 0.0,
            page_x: 0.0,
            page_y: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            offset_inset_x: 0.0,
            offset_inset_y: 0.0,
            initial_x: 0.0,
            initial_y: 0.0,
            margin_left: 0.0,
            margin_top: 0.0,
            x: 0.0,
            y: 0.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn client(&self) -> Point {
        Point::new(self.client_x, self.client_y)
    }

    #[inline]
    pub fn page(&self) -> Point {
        Point::new(self.page_x, self.page_y)
    }

    pub fn is_pair(&self, drag: ActiveDrag) -> bool {
        self.target == drag.target && self.handle == drag.handle
    }
}

/// The pair a session is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveDrag {
    pub target: ElementId,
    pub handle: ElementId,
}

impl ActiveDrag {
    pub fn new(target: ElementId, handle: ElementId) -> Self {
        Self { target, handle }
    }
}

/// Where the engine is in the press/move/release cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No drag in flight
    #[default]
    Idle,

    /// Pressed, no move sample seen yet
    Pressed(ActiveDrag),

    /// At least one move sample went through the pipeline
    Dragging(ActiveDrag),
}

impl SessionPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true once the pointer has moved during this session
    pub fn is_moving(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    /// The pair being dragged, if any
    pub fn active(&self) -> Option<ActiveDrag> {
        match self {
            Self::Idle => None,
            Self::Pressed(drag) | Self::Dragging(drag) => Some(*drag),
        }
    }

    pub fn press(&mut self, drag: ActiveDrag) {
        *self = Self::Pressed(drag);
    }

    /// Promote a pressed session on its first move. No-op when idle.
    pub fn start_moving(&mut self) {
        if let Self::Pressed(drag) = *self {
            *self = Self::Dragging(drag);
        }
    }

    /// Reset to Idle, returning the session that was active.
    pub fn take(&mut self) -> Option<ActiveDrag> {
        let active = self.active();
        *self = Self::Idle;
        active
    }
}
