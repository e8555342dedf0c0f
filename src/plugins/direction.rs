//! Lock dragging to one axis.

use super::Plugin;
use crate::config::Axis;
use crate::core::{Channel, DragCore};

/// Pins the off-axis coordinate to where the session started.
#[derive(Debug, Default)]
pub struct Direction;

impl Plugin for Direction {
    fn name(&self) -> &str {
        "Direction"
    }

    fn install(&self, core: &DragCore) {
        core.subscribe(Channel::AxisBeforeUpdate, |event| {
            let core = event.core();
            let direction = core.with_config(|c| c.direction);
            if !core.is_enabled() || !direction.enabled {
                return;
            }
            match direction.axis {
                Axis::Horizontal => event.y = event.initial_y,
                Axis::Vertical => event.x = event.initial_x,
            }
        });
    }
}
