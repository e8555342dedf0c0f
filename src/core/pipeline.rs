//! Coordinate pipeline: pointer samples to committed element positions.
//!
//! Logical axis values come from `(page - offset) * ratio`. Before anything
//! is written, the candidate position is published on
//! [`Channel::AxisBeforeUpdate`] as a [`DragEvent`] frame. Listeners run in
//! priority order and may adjust `x`/`y` in place, or call
//! [`DragEvent::set_position`] to restart the commit with new values. In
//! the latter case the original frame is superseded: delivery stops and the
//! frame never writes, so one logical change yields one physical write.

use super::{Channel, DragCore, SessionRecord};
use crate::geometry::{ElementId, Rect, Size};
use crate::profile_scope;
use std::ops::{ControlFlow, Deref, DerefMut};
use tracing::trace;

/// Unscaled box size over rendered size, per axis.
///
/// A rendered element scaled by 2 has a ratio of 0.5: one screen pixel of
/// pointer travel is half a logical pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratio {
    pub width: f64,
    pub height: f64,
}

impl Default for Ratio {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Ratio {
    pub const IDENTITY: Ratio = Ratio {
        width: 1.0,
        height: 1.0,
    };

    /// Ratio between a box and its rendered rectangle. Degenerate
    /// measurements fall back to 1 on that axis.
    pub fn between(size: Size, rendered: Rect) -> Self {
        Self {
            width: axis_ratio(size.width, rendered.width),
            height: axis_ratio(size.height, rendered.height),
        }
    }

    /// Screen distance to logical distance
    #[inline]
    pub fn to_logical(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx * self.width, dy * self.height)
    }

    /// Logical distance to screen distance
    #[inline]
    pub fn to_screen(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.width, dy / self.height)
    }
}

fn axis_ratio(size: f64, rendered: f64) -> f64 {
    let ratio = size / rendered;
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

/// Counters for commit activity, mostly useful in tests and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineStats {
    /// Commit passes that ran to completion
    pub commits: u64,
    /// Commit passes abandoned in favor of a re-entrant one
    pub superseded: u64,
    /// Position writes sent to the host
    pub writes: u64,
}

/// Payload of every channel: a copy of the session record plus access to
/// the engine. On [`Channel::AxisBeforeUpdate`] it is the live frame whose
/// `x`/`y` will be committed.
pub struct DragEvent<'a> {
    core: &'a DragCore,
    channel: Channel,
    record: SessionRecord,
    superseded: bool,
}

impl<'a> DragEvent<'a> {
    pub(crate) fn new(core: &'a DragCore, channel: Channel, record: SessionRecord) -> Self {
        Self {
            core,
            channel,
            record,
            superseded: false,
        }
    }

    pub fn core(&self) -> &'a DragCore {
        self.core
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn into_record(self) -> SessionRecord {
        self.record
    }

    /// True once a listener restarted this frame's commit
    pub fn is_superseded(&self) -> bool {
        self.superseded
    }

    /// Move the element to `(x, y)`.
    ///
    /// On an `AxisBeforeUpdate` frame, values equal to the frame's current
    /// ones are ignored; different values supersede this frame and commit
    /// the new position right away. On every other channel this commits
    /// directly.
    pub fn set_position(&mut self, x: f64, y: f64) {
        if self.channel == Channel::AxisBeforeUpdate {
            if x == self.record.x && y == self.record.y {
                return;
            }
            self.superseded = true;
            let mut next = self.record.clone();
            next.x = x;
            next.y = y;
            trace!(x, y, "Frame superseded by re-entrant set_position");
            self.core.commit(next);
        } else {
            self.record.x = x;
            self.record.y = y;
            self.core.commit(self.record.clone());
        }
    }
}

impl Deref for DragEvent<'_> {
    type Target = SessionRecord;

    fn deref(&self) -> &SessionRecord {
        &self.record
    }
}

impl DerefMut for DragEvent<'_> {
    fn deref_mut(&mut self) -> &mut SessionRecord {
        &mut self.record
    }
}

impl DragCore {
    /// Run one commit pass for `record`'s candidate position.
    pub(crate) fn commit(&self, record: SessionRecord) {
        profile_scope!("commit");

        let mut frame = DragEvent::new(self, Channel::AxisBeforeUpdate, record);
        self.bus.publish(Channel::AxisBeforeUpdate, |listener| {
            listener(&mut frame);
            if frame.superseded {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        if frame.superseded {
            self.state.borrow_mut().stats.superseded += 1;
            return;
        }

        let record = frame.into_record();
        let wrote = {
            let mut state = self.state.borrow_mut();
            state.stats.commits += 1;
            if let Some(stored) = state
                .records
                .iter_mut()
                .find(|r| r.target == record.target && r.handle == record.handle)
            {
                *stored = record.clone();
            }
            let write = !state.options.config.virtual_axis;
            if write {
                state.stats.writes += 1;
            }
            write
        };

        if wrote {
            self.host.write_position(
                record.target,
                record.x - record.margin_left,
                record.y - record.margin_top,
            );
        }
        trace!(element = record.target.0, x = record.x, y = record.y, wrote, "Committed position");

        self.publish(Channel::AxisUpdated, record);
    }

    /// Commit `(x, y)` for `target` through the full pipeline, as if a
    /// sample had produced it. Returns false when `target` is not bound.
    ///
    /// Used by plugins outside a frame: timers, end hooks. Listeners inside
    /// an `AxisBeforeUpdate` frame should call [`DragEvent::set_position`]
    /// instead.
    pub fn set_position(&self, target: ElementId, x: f64, y: f64) -> bool {
        let record = {
            let state = self.state.borrow();
            let active = state.phase.active().filter(|drag| drag.target == target);
            let found = match active {
                Some(drag) => state.records.iter().find(|r| r.is_pair(drag)),
                None => state.records.iter().find(|r| r.target == target),
            };
            found.cloned()
        };
        let Some(mut record) = record else {
            trace!(element = target.0, "set_position on unbound element");
            return false;
        };
        record.x = x;
        record.y = y;
        self.commit(record);
        true
    }

    /// Pipeline position for the record's current pointer sample.
    pub(crate) fn pipeline_position(&self, record: &SessionRecord) -> (f64, f64) {
        let ratio = self.ratio();
        ratio.to_logical(record.page_x - record.offset_x, record.page_y - record.offset_y)
    }
}
