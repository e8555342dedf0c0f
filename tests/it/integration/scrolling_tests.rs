//! Auto-scroll driven by the manual clock of the in-memory host.

use crate::helpers::{Stage, StageBuilder};
use dragcore::Point;
use dragcore::config::DragConfig;
use std::time::Duration;

/// Stage with 1000 x 1000 of content and auto-scroll enabled.
fn scrolling_stage() -> Stage {
    let mut config = DragConfig::default();
    config.scroll.enabled = true;
    StageBuilder::new()
        .scrollable(1000.0, 1000.0)
        .with_config(config)
        .build()
}

#[test]
fn test_move_near_edge_scrolls_and_compensates() {
    let stage = scrolling_stage();

    stage.press(50.0, 50.0);
    stage.move_to(480.0, 50.0);

    assert_eq!(stage.host.scroll_position(stage.stage), Point::new(10.0, 0.0));
    assert_eq!(stage.writes(), vec![(450.0, 10.0)]);
    assert_eq!(stage.host.active_timers(), 1);
}

#[test]
fn test_timer_steps_at_interval_until_release() {
    let stage = scrolling_stage();

    stage.press(50.0, 50.0);
    stage.move_to(480.0, 50.0);

    stage.host.advance(Duration::from_millis(99));
    assert_eq!(stage.writes().len(), 1);

    stage.host.advance(Duration::from_millis(1));
    assert_eq!(stage.host.scroll_position(stage.stage), Point::new(20.0, 0.0));
    assert_eq!(stage.writes(), vec![(450.0, 10.0), (460.0, 10.0)]);

    stage.host.advance(Duration::from_millis(250));
    assert_eq!(stage.host.scroll_position(stage.stage), Point::new(40.0, 0.0));
    assert_eq!(stage.position(), (480.0, 10.0));

    stage.release(480.0, 50.0);
    assert_eq!(stage.host.active_timers(), 0);

    stage.host.advance(Duration::from_millis(500));
    assert_eq!(stage.host.scroll_position(stage.stage), Point::new(40.0, 0.0));
    assert_eq!(stage.writes().len(), 4);
}

#[test]
fn test_each_move_restarts_timer() {
    let stage = scrolling_stage();

    stage.press(50.0, 50.0);
    stage.move_to(480.0, 50.0);
    stage.move_to(480.0, 60.0);
    stage.move_to(480.0, 70.0);

    assert_eq!(stage.host.active_timers(), 1);
}

#[test]
fn test_scroll_toward_top_left_is_clamped() {
    let stage = scrolling_stage();

    stage.press(50.0, 50.0);
    stage.move_to(20.0, 20.0);

    // Already at the origin: nothing to scroll, position is the plain one.
    assert_eq!(stage.host.scroll_position(stage.stage), Point::ZERO);
    assert_eq!(stage.position(), (0.0, 0.0));
}

#[test]
fn test_no_scroll_away_from_edges() {
    let stage = scrolling_stage();

    stage.press(50.0, 50.0);
    stage.move_to(250.0, 250.0);
    stage.host.advance(Duration::from_millis(300));

    assert_eq!(stage.host.scroll_position(stage.stage), Point::ZERO);
    assert_eq!(stage.writes(), vec![(210.0, 210.0)]);
}

#[test]
fn test_disabled_scroll_sets_no_timer() {
    let stage = StageBuilder::new().scrollable(1000.0, 1000.0).build();

    stage.press(50.0, 50.0);
    stage.move_to(480.0, 50.0);

    assert_eq!(stage.host.active_timers(), 0);
    assert_eq!(stage.host.scroll_position(stage.stage), Point::ZERO);
    assert_eq!(stage.position(), (440.0, 10.0));
}

#[test]
fn test_disable_mid_scroll_stops_timer() {
    let stage = scrolling_stage();

    stage.press(50.0, 50.0);
    stage.move_to(480.0, 50.0);
    stage.core.disable();

    assert_eq!(stage.host.active_timers(), 0);
}

#[test]
fn test_unregister_clears_timer() {
    let stage = scrolling_stage();

    stage.press(50.0, 50.0);
    stage.move_to(480.0, 50.0);
    assert!(stage.core.unregister("Scrolling"));

    assert_eq!(stage.host.active_timers(), 0);
    stage.host.advance(Duration::from_millis(300));
    assert_eq!(stage.writes().len(), 1);
}

#[test]
fn test_configured_container() {
    let mut config = DragConfig::default();
    config.scroll.enabled = true;
    let stage = StageBuilder::new().scrollable(1000.0, 1000.0).build();
    config.scroll.container = Some(stage.host.root());
    stage.core.apply_config(config);

    stage.press(50.0, 50.0);
    stage.move_to(480.0, 50.0);

    // The document root does not overflow, so nothing scrolls.
    assert_eq!(stage.host.scroll_position(stage.stage), Point::ZERO);
    assert_eq!(stage.host.scroll_position(stage.host.root()), Point::ZERO);
}

#[test]
fn test_reloaded_config_keeps_container_set_in_code() {
    let stage = StageBuilder::new().scrollable(1000.0, 1000.0).build();
    let mut config = DragConfig::default();
    config.scroll.container = Some(stage.host.root());
    stage.core.apply_config(config);

    let reloaded = DragConfig::from_json(r#"{ "scroll": { "enabled": true } }"#).unwrap();
    assert_eq!(reloaded.scroll.container, None);
    stage.core.apply_config(reloaded);

    assert!(stage.core.config().scroll.enabled);
    assert_eq!(stage.core.config().scroll.container, Some(stage.host.root()));

    stage.press(50.0, 50.0);
    stage.move_to(480.0, 50.0);
    assert_eq!(stage.host.scroll_position(stage.stage), Point::ZERO);
}
