//! Keep the element inside its offset parent.

use super::Plugin;
use crate::constants::priority;
use crate::core::{Channel, DragCore};
use crate::geometry::{ElementId, Size};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Clamps the candidate position into `[0, parent_scroll - size]` on both
/// axes. The parent's scroll size is measured once per session, on `Start`.
#[derive(Debug, Default)]
pub struct BoundaryLimit {
    bounds: Rc<RefCell<HashMap<ElementId, Size>>>,
}

impl Plugin for BoundaryLimit {
    fn name(&self) -> &str {
        "BoundaryLimit"
    }

    fn priority(&self) -> i32 {
        priority::SKY + 30
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
            if !core.is_enabled() || !core.with_config(|c| c.boundary.enabled) {
                return;
            }
            let Some(limit) = bounds.borrow().get(&event.target).copied() else {
                return;
            };
            let size = core.host().box_size(event.target);

            if event.x + size.width > limit.width {
                event.x = limit.width - size.width;
            } else if event.x < 0.0 {
                event.x = 0.0;
            }
            if event.y + size.height > limit.height {
                event.y = limit.height - size.height;
            } else if event.y < 0.0 {
                event.y = 0.0;
            }
        });
    }

    fn uninstall(&self, _core: &DragCore) {
        self.bounds.borrow_mut().clear();
    }
}
