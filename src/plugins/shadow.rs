//! Translucent copy of the element that tracks every committed position.
//!
//! The shadow is created on `Start` beside the target, follows each
//! `axisBeforeUpdate` frame and is removed on `End`.

use super::Plugin;
use crate::constants::priority;
use crate::core::{Channel, DragCore};
use crate::geometry::{ElementId, Point};
use crate::host::ShadowStyle;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct ShadowEntry {
    shadow: ElementId,
    /// Shadow position minus logical position
    base: Point,
}

#[derive(Debug, Default)]
pub struct ShadowFollow {
    shadows: Rc<RefCell<HashMap<ElementId, ShadowEntry>>>,
}

impl Plugin for ShadowFollow {
    fn name(&self) -> &str {
        "ShadowFollow"
    }

    fn priority(&self) -> i32 {
        priority::THERMOSPHERE
    }

    fn install(&self, core: &DragCore) {
        let shadows = Rc::clone(&self.shadows);
        core.subscribe(Channel::Start, move |event| {
            let core = event.core();
            let config = core.with_config(|c| c.shadow.clone());
            if !core.is_enabled() || !config.enabled {
                return;
            }
            if shadows.borrow().contains_key(&event.target) {
                return;
            }

            let host = core.host();
            let style = ShadowStyle {
                opacity: config.opacity,
                fixed: config.fixed,
                class: config.class,
                size: host.box_size(event.target),
            };
            let anchor = if config.fixed {
                host.client_rect(event.target).origin()
            } else {
                host.offset(event.target)
            };
            let base = Point::new(anchor.x - event.initial_x, anchor.y - event.initial_y);

            let shadow = host.create_shadow(event.target, &style);
            host.attach_shadow(shadow, event.target);
            host.write_position(
                shadow,
                anchor.x - event.margin_left,
                anchor.y - event.margin_top,
            );
            debug!(element = event.target.0, shadow = shadow.0, "Shadow created");
            shadows
                .borrow_mut()
                .insert(event.target, ShadowEntry { shadow, base });
        });

        let shadows = Rc::clone(&self.shadows);
        core.subscribe(Channel::AxisBeforeUpdate, move |event| {
            let core = event.core();
            if !core.is_enabled() || !core.with_config(|c| c.shadow.enabled) {
                return;
            }
            let Some(entry) = shadows.borrow().get(&event.target).copied() else {
                return;
            };
            core.host().write_position(
                entry.shadow,
                event.x + entry.base.x - event.margin_left,
                event.y + entry.base.y - event.margin_top,
            );
        });

        let shadows = Rc::clone(&self.shadows);
        core.subscribe(Channel::End, move |event| {
            let Some(entry) = shadows.borrow_mut().remove(&event.target) else {
                return;
            };
            event.core().host().remove_element(entry.shadow);
            debug!(element = event.target.0, "Shadow removed");
        });
    }

    fn uninstall(&self, core: &DragCore) {
        for (_, entry) in self.shadows.borrow_mut().drain() {
            core.host().remove_element(entry.shadow);
        }
    }
}
