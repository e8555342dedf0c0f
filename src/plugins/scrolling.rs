//! Auto-scroll a container while the pointer hovers near its edges.
//!
//! Every move restarts a repeating timer. Each step scrolls the container
//! by `speed` toward the edge the pointer is near, and the dragged element
//! is moved by the scroll accumulated since press so it stays under the
//! pointer.

use super::Plugin;
use crate::config::ScrollConfig;
use crate::constants::priority;
use crate::core::{Channel, DragCore};
use crate::geometry::{ElementId, Point, Rect};
use crate::host::TimerId;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy)]
struct ScrollSession {
    target: ElementId,
    container: ElementId,
    /// Container's rendered rectangle at press
    rect: Rect,
    /// Scroll offsets at press
    start: Point,
    /// Scroll offsets after the latest step
    scroll: Point,
}

impl ScrollSession {
    fn delta(&self) -> Point {
        Point::new(self.scroll.x - self.start.x, self.scroll.y - self.start.y)
    }
}

#[derive(Debug, Default)]
struct ScrollState {
    session: RefCell<Option<ScrollSession>>,
    timer: Cell<Option<TimerId>>,
    /// Set while this plugin's own re-entrant commit is in flight
    rewriting: Cell<bool>,
}

impl ScrollState {
    fn stop_timer(&self, core: &DragCore) {
        if let Some(timer) = self.timer.take() {
            core.host().clear_interval(timer);
        }
    }

    fn delta(&self) -> Option<Point> {
        self.session.borrow().as_ref().map(ScrollSession::delta)
    }

    /// Scroll one step toward the edge the pointer is near. Returns true
    /// when the container actually moved.
    fn step(&self, core: &DragCore) -> bool {
        let Some(record) = core.active_session() else {
            return false;
        };
        let Some(session) = *self.session.borrow() else {
            return false;
        };
        let config = core.with_config(|c| c.scroll);
        let host = core.host();
        let metrics = host.scroll_metrics(session.container);
        if !metrics.is_scrollable() {
            return false;
        }

        let ratio = core.ratio();
        let rect = session.rect;
        let dx = edge_step(
            record.client_x - rect.x,
            rect.x + metrics.client_width / ratio.width - record.client_x,
            &config,
        );
        let dy = edge_step(
            record.client_y - rect.y,
            rect.y + metrics.client_height / ratio.height - record.client_y,
            &config,
        );

        let left = (metrics.scroll_left + dx).clamp(0.0, metrics.max_scroll_left());
        let top = (metrics.scroll_top + dy).clamp(0.0, metrics.max_scroll_top());
        let moved_x = left != metrics.scroll_left;
        let moved_y = top != metrics.scroll_top;
        if !moved_x && !moved_y {
            return false;
        }

        host.scroll_to(
            session.container,
            moved_x.then_some(left),
            moved_y.then_some(top),
        );
        if let Some(session) = self.session.borrow_mut().as_mut() {
            session.scroll = Point::new(left, top);
        }
        trace!(container = session.container.0, left, top, "Auto-scroll step");
        true
    }

    /// Timer callback: scroll, then carry the element along.
    fn tick(&self, core: &DragCore) {
        if !core.is_enabled() || !core.is_dragging() {
            self.stop_timer(core);
            return;
        }
        if !self.step(core) {
            return;
        }
        let (Some(record), Some(delta)) = (core.active_session(), self.delta()) else {
            return;
        };
        let (x, y) = core.pipeline_position(&record);
        core.set_position(record.target, x + delta.x, y + delta.y);
    }
}

/// Signed step for one axis given the pointer's distance to the near and
/// far edges.
fn edge_step(near: f64, far: f64, config: &ScrollConfig) -> f64 {
    if near < config.threshold {
        -config.speed
    } else if far < config.threshold {
        config.speed
    } else {
        0.0
    }
}

#[derive(Debug, Default)]
pub struct Scrolling {
    state: Rc<ScrollState>,
}

impl Plugin for Scrolling {
    fn name(&self) -> &str {
        "Scrolling"
    }

    fn priority(&self) -> i32 {
        priority::SKY
    }

    fn install(&self, core: &DragCore) {
        let state = Rc::clone(&self.state);
        core.subscribe(Channel::BeforeStart, move |event| {
            let core = event.core();
            let host = core.host();
            let configured = core.with_config(|c| c.scroll.container);
            let Some(container) = configured.or_else(|| host.offset_parent(event.target)) else {
                return;
            };
            let metrics = host.scroll_metrics(container);
            let start = Point::new(metrics.scroll_left, metrics.scroll_top);
            *state.session.borrow_mut() = Some(ScrollSession {
                target: event.target,
                container,
                rect: host.client_rect(container),
                start,
                scroll: start,
            });
        });

        let state = Rc::clone(&self.state);
        core.subscribe(Channel::BeforeMove, move |event| {
            let core = event.core();
            let config = core.with_config(|c| c.scroll);
            if !core.is_enabled() || !config.enabled || state.session.borrow().is_none() {
                return;
            }
            state.stop_timer(core);
            state.step(core);

            let weak_core = core.downgrade();
            let ticker = Rc::clone(&state);
            let timer = core.host().set_interval(
                config.interval(),
                Box::new(move || {
                    if let Some(core) = weak_core.upgrade() {
                        ticker.tick(&core);
                    }
                }),
            );
            state.timer.set(Some(timer));
        });

        let state = Rc::clone(&self.state);
        core.subscribe(Channel::AxisBeforeUpdate, move |event| {
            if state.rewriting.get() {
                return;
            }
            let core = event.core();
            if !core.is_enabled() || !core.with_config(|c| c.scroll.enabled) {
                return;
            }
            let delta = {
                let session = state.session.borrow();
                match session.as_ref() {
                    Some(session) if session.target == event.target => session.delta(),
                    _ => return,
                }
            };
            if delta == Point::ZERO {
                return;
            }
            let (x, y) = core.pipeline_position(event.record());
            state.rewriting.set(true);
            event.set_position(x + delta.x, y + delta.y);
            state.rewriting.set(false);
        });

        let state = Rc::clone(&self.state);
        core.subscribe(Channel::BeforeEnd, move |event| {
            state.stop_timer(event.core());
            state.session.borrow_mut().take();
        });
    }

    fn uninstall(&self, core: &DragCore) {
        self.state.stop_timer(core);
        self.state.session.borrow_mut().take();
        debug!("Scrolling uninstalled");
    }
}
