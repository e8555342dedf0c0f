//! Direction, BoundaryLimit and Snap driven through real sessions.

use crate::helpers::StageBuilder;
use dragcore::config::{Axis, DragConfig, SnapEdge, SnapOrient};

fn config(edit: impl FnOnce(&mut DragConfig)) -> DragConfig {
    let mut config = DragConfig::default();
    edit(&mut config);
    config
}

// ============================================================================
// Direction
// ============================================================================

#[test]
fn test_direction_horizontal_pins_y() {
    let stage = StageBuilder::new()
        .with_config(config(|c| c.direction.enabled = true))
        .build();

    stage.drag((50.0, 50.0), &[(80.0, 120.0)]);
    assert_eq!(stage.position(), (40.0, 10.0));
}

#[test]
fn test_direction_vertical_pins_x() {
    let stage = StageBuilder::new()
        .with_config(config(|c| {
            c.direction.enabled = true;
            c.direction.axis = Axis::Vertical;
        }))
        .build();

    stage.drag((50.0, 50.0), &[(80.0, 120.0)]);
    assert_eq!(stage.position(), (10.0, 80.0));
}

// ============================================================================
// BoundaryLimit
// ============================================================================

#[test]
fn test_boundary_can_be_switched_off() {
    let stage = StageBuilder::new()
        .with_config(config(|c| c.boundary.enabled = false))
        .build();

    stage.drag((50.0, 50.0), &[(700.0, -20.0)]);
    assert_eq!(stage.position(), (660.0, -60.0));
}

#[test]
fn test_boundary_uses_scroll_extent() {
    let stage = StageBuilder::new().scrollable(800.0, 600.0).build();

    stage.drag((50.0, 50.0), &[(900.0, 900.0)]);
    assert_eq!(stage.position(), (700.0, 500.0));
}

// ============================================================================
// Snap
// ============================================================================

#[test]
fn test_snap_near_edges() {
    let stage = StageBuilder::new()
        .with_config(config(|c| c.snap.enabled = true))
        .build();

    stage.press(50.0, 50.0);
    stage.move_to(47.0, 300.0);
    assert_eq!(stage.position(), (0.0, 260.0));

    stage.move_to(435.0, 435.0);
    assert_eq!(stage.position(), (400.0, 400.0));

    stage.move_to(200.0, 200.0);
    assert_eq!(stage.position(), (160.0, 160.0));
}

#[test]
fn test_snap_respects_orient() {
    let stage = StageBuilder::new()
        .with_config(config(|c| {
            c.snap.enabled = true;
            c.snap.orient = SnapOrient::Y;
        }))
        .build();

    stage.drag((50.0, 50.0), &[(45.0, 45.0)]);
    assert_eq!(stage.position(), (5.0, 0.0));
}

#[test]
fn test_snap_threshold() {
    let stage = StageBuilder::new()
        .with_config(config(|c| {
            c.snap.enabled = true;
            c.snap.threshold = 30.0;
        }))
        .build();

    stage.drag((50.0, 50.0), &[(65.0, 100.0)]);
    assert_eq!(stage.position(), (0.0, 60.0));
}

#[test]
fn test_force_snap_to_nearer_side() {
    let forced = config(|c| {
        c.snap.enabled = true;
        c.snap.force = true;
    });

    let stage = StageBuilder::new().with_config(forced.clone()).build();
    stage.drag((50.0, 50.0), &[(300.0, 100.0)]);
    assert_eq!(stage.position(), (400.0, 60.0));
    assert_eq!(stage.writes().last(), Some(&(400.0, 60.0)));

    let stage = StageBuilder::new().with_config(forced).build();
    stage.drag((50.0, 50.0), &[(200.0, 100.0)]);
    assert_eq!(stage.position(), (0.0, 60.0));
}

#[test]
fn test_force_snap_does_not_snap_while_moving() {
    let stage = StageBuilder::new()
        .with_config(config(|c| {
            c.snap.enabled = true;
            c.snap.force = true;
            c.snap.force_orient = SnapEdge::Bottom;
        }))
        .build();

    stage.press(50.0, 50.0);
    stage.move_to(45.0, 100.0);
    assert_eq!(stage.position(), (5.0, 60.0));

    stage.release(45.0, 100.0);
    assert_eq!(stage.position(), (5.0, 400.0));
}

#[test]
fn test_force_snap_vertical_axis() {
    let stage = StageBuilder::new()
        .with_config(config(|c| {
            c.snap.enabled = true;
            c.snap.force = true;
            c.snap.force_orient = SnapEdge::Y;
        }))
        .build();

    stage.drag((50.0, 50.0), &[(100.0, 100.0)]);
    assert_eq!(stage.position(), (60.0, 0.0));
}
