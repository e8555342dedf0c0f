//! Input entry points.
//!
//! The host routes events from listened elements here: presses and hover
//! from handles, delegated presses from proxies, and document-wide move and
//! release while the pointer is captured.

use super::{ActiveDrag, Channel, DragCore, Ratio, SessionRecord};
use crate::config::CursorPhase;
use crate::geometry::{ElementId, Point};
use crate::host::class_names;
use tracing::{debug, trace};

/// One normalized pointer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Element the event originated from
    pub origin: ElementId,
    /// Screen coordinates
    pub client: Point,
    /// Screen coordinates plus document scroll
    pub page: Point,
}

impl PointerSample {
    pub fn new(origin: ElementId, client: Point, page: Point) -> Self {
        Self {
            origin,
            client,
            page,
        }
    }

    /// Sample for an unscrolled document, where client equals page.
    pub fn at(origin: ElementId, x: f64, y: f64) -> Self {
        let point = Point::new(x, y);
        Self::new(origin, point, point)
    }
}

impl DragCore {
    /// Press on a bound handle. Returns true when a drag started.
    pub fn press(&self, handle: ElementId, sample: PointerSample) -> bool {
        let pair = {
            let state = self.state.borrow();
            if !state.enabled {
                return false;
            }
            state
                .records
                .iter()
                .find(|r| r.handle == handle)
                .map(|r| ActiveDrag::new(r.target, r.handle))
        };
        match pair {
            Some(pair) => {
                self.begin(pair, sample);
                true
            }
            None => {
                trace!(handle = handle.0, "Press on unbound handle");
                false
            }
        }
    }

    /// Press at a screen position, for hosts that deliver raw pointer-down
    /// events. Hit tests, then dispatches to the innermost bound handle
    /// under the pointer, or failing that to the innermost proxy.
    pub fn pointer_down(&self, client: Point, page: Point) -> bool {
        let Some(hit) = self.host.element_at(client) else {
            return false;
        };
        let sample = PointerSample::new(hit, client, page);
        let (handles, proxies) = {
            let state = self.state.borrow();
            if !state.enabled {
                return false;
            }
            let handles: Vec<ElementId> = state
                .records
                .iter()
                .map(|r| r.handle)
                .filter(|handle| self.host.contains(*handle, hit))
                .collect();
            let proxies: Vec<ElementId> = state
                .proxies
                .iter()
                .copied()
                .filter(|proxy| self.host.contains(*proxy, hit))
                .collect();
            (handles, proxies)
        };

        if let Some(handle) = self.innermost(&handles) {
            trace!(hit = hit.0, handle = handle.0, "Pointer down on handle");
            return self.press(handle, sample);
        }
        match self.innermost(&proxies) {
            Some(proxy) => self.proxy_press(proxy, sample),
            None => false,
        }
    }

    /// The candidate no other candidate lies inside.
    fn innermost(&self, candidates: &[ElementId]) -> Option<ElementId> {
        candidates.iter().copied().find(|outer| {
            !candidates
                .iter()
                .any(|inner| inner != outer && self.host.contains(*outer, *inner))
        })
    }

    /// Press delegated through an event proxy. Re-resolves the bindings
    /// when the targets inside `proxy` changed, then starts a drag on the
    /// target containing the pressed element.
    pub fn proxy_press(&self, proxy: ElementId, sample: PointerSample) -> bool {
        let (target, bound) = {
            let state = self.state.borrow();
            if !state.enabled {
                return false;
            }
            let Some(target) = state.options.target.clone() else {
                return false;
            };
            let bound: Vec<ElementId> = state.records.iter().map(|r| r.target).collect();
            (target, bound)
        };

        let inside = target.resolve(self.host(), Some(proxy));
        let unchanged = inside
            .iter()
            .enumerate()
            .all(|(i, element)| bound.get(i) == Some(element));
        if unchanged {
            // Bound handles receive this press themselves.
            return false;
        }

        debug!(proxy = proxy.0, "Proxy content changed, rebinding");
        self.rebind();

        let host = self.host();
        let pair = self
            .state
            .borrow()
            .records
            .iter()
            .find(|r| host.contains(proxy, r.target) && host.contains(r.target, sample.origin))
            .map(|r| ActiveDrag::new(r.target, r.handle));
        match pair {
            Some(pair) => {
                self.begin(pair, sample);
                true
            }
            None => false,
        }
    }

    /// Document-wide move while captured. Returns true when a sample went
    /// through the pipeline.
    pub fn pointer_move(&self, sample: PointerSample) -> bool {
        let (record, moving_class) = {
            let mut state = self.state.borrow_mut();
            if !state.enabled {
                return false;
            }
            let Some(drag) = state.phase.active() else {
                return false;
            };
            state.phase.start_moving();
            let moving_class = state.options.config.classes.moving.clone();
            let Some(record) = state.records.iter_mut().find(|r| r.is_pair(drag)) else {
                return false;
            };
            record.client_x = sample.client.x;
            record.client_y = sample.client.y;
            record.page_x = sample.page.x;
            record.page_y = sample.page.y;
            (record.clone(), moving_class)
        };

        self.publish(Channel::BeforeMove, record.clone());

        // BeforeMove listeners may have ended the session.
        let Some(mut candidate) = self.active_session() else {
            return false;
        };

        if let Some(class) = moving_class {
            for name in class_names(&class) {
                self.host.add_class(record.target, name);
            }
        }
        if let Some(cursor) = self.cursor_for(CursorPhase::Moving) {
            self.host.set_cursor(&cursor);
        }

        let (x, y) = self.pipeline_position(&candidate);
        candidate.x = x;
        candidate.y = y;
        trace!(x, y, "Move sample");
        self.commit(candidate);

        if let Some(record) = self.session_for(record.target, record.handle) {
            self.publish(Channel::Move, record);
        }
        true
    }

    /// Document-wide release while captured.
    pub fn release(&self, sample: PointerSample) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.finish(Some(sample))
    }

    /// Pointer entered a bound handle.
    pub fn pointer_enter(&self, handle: ElementId) {
        let pressing = {
            let mut state = self.state.borrow_mut();
            if !state.records.iter().any(|r| r.handle == handle) {
                return;
            }
            state.hover.entering = true;
            let saved = if state.hover.pressing {
                state.hover.press_cursor.clone()
            } else {
                self.host.cursor()
            };
            state.hover.saved_cursor = saved;
            state.hover.pressing
        };
        if pressing {
            return;
        }
        if let Some(cursor) = self.cursor_for(CursorPhase::Over) {
            self.host.set_cursor(&cursor);
        }
    }

    /// Pointer left a bound handle.
    pub fn pointer_leave(&self, handle: ElementId) {
        let (pressing, saved) = {
            let mut state = self.state.borrow_mut();
            if !state.records.iter().any(|r| r.handle == handle) {
                return;
            }
            state.hover.entering = false;
            (state.hover.pressing, state.hover.saved_cursor.clone())
        };
        if pressing {
            return;
        }
        let cursor = self.cursor_for(CursorPhase::Out).unwrap_or(saved);
        self.host.set_cursor(&cursor);
    }

    /// Start a session on `pair`. Ends any session already in flight.
    fn begin(&self, pair: ActiveDrag, sample: PointerSample) {
        if self.is_dragging() {
            debug!("Press while dragging, ending previous session");
            self.finish(None);
        }

        let Some(before) = self.session_for(pair.target, pair.handle) else {
            return;
        };
        self.state.borrow_mut().hover.pressing = true;
        self.publish(Channel::BeforeStart, before);
        if !self.is_enabled() {
            debug!("Disabled from BeforeStart, not starting");
            self.state.borrow_mut().hover.pressing = false;
            return;
        }

        {
            let press_cursor = {
                let state = self.state.borrow();
                if state.hover.entering {
                    state.hover.saved_cursor.clone()
                } else {
                    self.host.cursor()
                }
            };
            self.state.borrow_mut().hover.press_cursor = press_cursor;
        }
        if let Some(cursor) = self.cursor_for(CursorPhase::Down) {
            self.host.set_cursor(&cursor);
        }

        let host = self.host();
        let target = pair.target;
        let mode = host.position_mode(target);
        let margins = host.margins(target);
        // Only out-of-flow elements report a usable offset; the others
        // move by relative deltas from zero.
        let origin = if mode.is_out_of_flow() {
            host.offset(target)
        } else {
            Point::ZERO
        };
        let rect = host.client_rect(target);
        let ratio = Ratio::between(host.box_size(target), rect);

        let (record, classes, targets) = {
            let mut state = self.state.borrow_mut();
            state.ratio = ratio;
            state.phase.press(pair);
            let classes = state.options.config.classes.clone();
            let mut targets: Vec<ElementId> = Vec::new();
            for r in &state.records {
                if !targets.contains(&r.target) {
                    targets.push(r.target);
                }
            }
            let Some(record) = state.records.iter_mut().find(|r| r.is_pair(pair)) else {
                return;
            };
            record.dragging = true;
            record.client_x = sample.client.x;
            record.client_y = sample.client.y;
            record.page_x = sample.page.x;
            record.page_y = sample.page.y;
            record.offset_x = sample.page.x - origin.x / ratio.width;
            record.offset_y = sample.page.y - origin.y / ratio.height;
            record.offset_inset_x = (sample.client.x - rect.x).abs();
            record.offset_inset_y = (sample.client.y - rect.y).abs();
            record.initial_x = origin.x;
            record.initial_y = origin.y;
            record.margin_left = margins.left;
            record.margin_top = margins.top;
            record.x = origin.x;
            record.y = origin.y;
            (record.clone(), classes, targets)
        };

        if let Some(active) = &classes.active {
            for name in class_names(active) {
                host.add_class(target, name);
            }
        }
        if let Some(activated) = &classes.activated {
            for other in targets {
                for name in class_names(activated) {
                    if other == target {
                        host.add_class(other, name);
                    } else {
                        host.remove_class(other, name);
                    }
                }
            }
        }

        // Captured before Start so a listener ending the session releases it.
        host.capture_pointer();
        debug!(element = target.0, handle = pair.handle.0, "Drag started");
        self.publish(Channel::Start, record);
    }

    /// End the active session. `sample` is the release position; `None`
    /// ends it at the last known pointer position. Returns false when no
    /// session was active.
    pub(crate) fn finish(&self, sample: Option<PointerSample>) -> bool {
        // Taking the session first makes a nested finish from a listener
        // a no-op.
        let (drag, classes) = {
            let mut state = self.state.borrow_mut();
            let Some(drag) = state.phase.take() else {
                return false;
            };
            if let Some(sample) = sample {
                if let Some(record) = state.records.iter_mut().find(|r| r.is_pair(drag)) {
                    record.client_x = sample.client.x;
                    record.client_y = sample.client.y;
                    record.page_x = sample.page.x;
                    record.page_y = sample.page.y;
                }
            }
            (drag, state.options.config.classes.clone())
        };

        if let Some(record) = self.session_for(drag.target, drag.handle) {
            self.publish(Channel::BeforeEnd, record);
        }

        for class in [&classes.active, &classes.moving].into_iter().flatten() {
            for name in class_names(class) {
                self.host.remove_class(drag.target, name);
            }
        }

        let (entering, press_cursor) = {
            let mut state = self.state.borrow_mut();
            state.hover.pressing = false;
            (state.hover.entering, state.hover.press_cursor.clone())
        };
        let phase = if entering {
            CursorPhase::Over
        } else {
            CursorPhase::Up
        };
        let cursor = self.cursor_for(phase).unwrap_or(press_cursor);
        self.host.set_cursor(&cursor);

        let ended = {
            let mut state = self.state.borrow_mut();
            state.records.iter_mut().find(|r| r.is_pair(drag)).map(|record| {
                record.dragging = false;
                record.clone()
            })
        };
        debug!(element = drag.target.0, "Drag ended");
        if let Some(record) = ended {
            self.publish(Channel::End, record);
        }

        self.host.release_pointer();
        true
    }

    /// Configured cursor for `phase`; nothing while disabled.
    fn cursor_for(&self, phase: CursorPhase) -> Option<String> {
        let state = self.state.borrow();
        if !state.enabled {
            return None;
        }
        state.options.config.cursor.get(phase).map(str::to_string)
    }

    fn session_for(&self, target: ElementId, handle: ElementId) -> Option<SessionRecord> {
        let pair = ActiveDrag::new(target, handle);
        self.state
            .borrow()
            .records
            .iter()
            .find(|r| r.is_pair(pair))
            .cloned()
    }
}
