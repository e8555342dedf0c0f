//! Edge snapping.
//!
//! Two modes, picked by `snap.force`:
//! - soft: while moving, a coordinate within `threshold` of an edge of the
//!   offset parent's scroll box jumps onto that edge
//! - force: on release the element is moved onto one edge, either a fixed
//!   one or the nearer side of the pointer on an axis

use super::Plugin;
use crate::config::SnapEdge;
use crate::constants::priority;
use crate::core::{Channel, DragCore, DragEvent};
use crate::geometry::{ElementId, Size};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

#[derive(Debug, Default)]
pub struct Snap {
    bounds: Rc<RefCell<HashMap<ElementId, Size>>>,
}

impl Plugin for Snap {
    fn name(&self) -> &str {
        "Snap"
    }

    fn priority(&self) -> i32 {
        priority::SKY + 20
    }

    fn install(&self, core: &DragCore) {
        let bounds = Rc::clone(&self.bounds);
        core.subscribe(Channel::Start, move |event| {
            let host = event.core().host();
            let Some(parent) = host.offset_parent(event.target) else {
                return;
            };
            let metrics = host.scroll_metrics(parent);
            bounds.borrow_mut().insert(
                event.target,
                Size::new(metrics.scroll_width, metrics.scroll_height),
            );
        });

        let bounds = Rc::clone(&self.bounds);
        core.subscribe(Channel::AxisBeforeUpdate, move |event| {
            let core = event.core();
            let snap = core.with_config(|c| c.snap);
            if !core.is_enabled() || !snap.enabled || snap.force {
                return;
            }
            let Some(parent) = bounds.borrow().get(&event.target).copied() else {
                return;
            };
            let size = core.host().box_size(event.target);

            if snap.orient.includes_x() {
                if event.x < snap.threshold {
                    event.x = 0.0;
                } else if parent.width - event.x - size.width < snap.threshold {
                    event.x = parent.width - size.width;
                }
            }
            if snap.orient.includes_y() {
                if event.y < snap.threshold {
                    event.y = 0.0;
                } else if parent.height - event.y - size.height < snap.threshold {
                    event.y = parent.height - size.height;
                }
            }
        });

        core.subscribe(Channel::End, force_snap);
    }

    fn uninstall(&self, _core: &DragCore) {
        self.bounds.borrow_mut().clear();
    }
}

/// Move the released element onto its configured edge.
fn force_snap(event: &mut DragEvent<'_>) {
    let core = event.core();
    let snap = core.with_config(|c| c.snap);
    if !core.is_enabled() || !snap.enabled || !snap.force {
        return;
    }
    let host = core.host();
    let Some(parent) = host.offset_parent(event.target) else {
        return;
    };

    let horizontal = snap.force_orient.is_horizontal();
    let rendered = host.client_rect(parent);
    let metrics = host.scroll_metrics(parent);
    let size = host.box_size(event.target);

    // Axis modes pick the side by which half of the parent the pointer is in.
    let edge = match snap.force_orient {
        SnapEdge::X => {
            if event.client_x - rendered.x > rendered.width / 2.0 {
                SnapEdge::Right
            } else {
                SnapEdge::Left
            }
        }
        SnapEdge::Y => {
            if event.client_y - rendered.y > rendered.height / 2.0 {
                SnapEdge::Bottom
            } else {
                SnapEdge::Top
            }
        }
        edge => edge,
    };

    let (x, y) = match (edge, horizontal) {
        (SnapEdge::Left, _) => (0.0, event.y),
        (SnapEdge::Top, _) => (event.x, 0.0),
        (_, true) => (metrics.scroll_width - size.width, event.y),
        (_, false) => (event.x, metrics.scroll_height - size.height),
    };
    trace!(?edge, x, y, "Force snap");
    event.set_position(x, y);
}
