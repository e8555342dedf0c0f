//! Cursors and class names applied during hover and drag.

use crate::helpers::{StageBuilder, stage};
use dragcore::host::Affordance;
use dragcore::config::{ClassNames, DragConfig};
use dragcore::{ElementSpec, PointerSample};

#[test]
fn test_hover_cursor_restored_on_leave() {
    let stage = stage();
    stage.host.set_cursor("default");

    stage.core.pointer_enter(stage.card);
    assert_eq!(stage.host.cursor(), "move");

    stage.core.pointer_leave(stage.card);
    assert_eq!(stage.host.cursor(), "default");
}

#[test]
fn test_cursor_through_drag_while_hovering() {
    let stage = stage();
    stage.host.set_cursor("default");

    stage.core.pointer_enter(stage.card);
    stage.press(50.0, 50.0);
    stage.move_to(60.0, 60.0);
    assert_eq!(stage.host.cursor(), "move");

    // Leaving mid-drag keeps the drag cursor.
    stage.core.pointer_leave(stage.card);
    assert_eq!(stage.host.cursor(), "move");

    stage.release(60.0, 60.0);
    assert_eq!(stage.host.cursor(), "default");
}

#[test]
fn test_release_over_handle_shows_hover_cursor() {
    let stage = stage();
    stage.host.set_cursor("default");

    stage.core.pointer_enter(stage.card);
    stage.press(50.0, 50.0);
    stage.move_to(60.0, 60.0);
    stage.release(60.0, 60.0);

    assert_eq!(stage.host.cursor(), "move");
    stage.core.pointer_leave(stage.card);
    assert_eq!(stage.host.cursor(), "default");
}

#[test]
fn test_configured_down_and_up_cursors() {
    let mut config = DragConfig::default();
    config.cursor.down = Some("grabbing".into());
    config.cursor.up = Some("grab".into());
    let stage = StageBuilder::new().with_config(config).build();

    stage.press(50.0, 50.0);
    assert_eq!(stage.host.cursor(), "grabbing");
    stage.release(50.0, 50.0);
    assert_eq!(stage.host.cursor(), "grab");
}

#[test]
fn test_disable_restores_saved_cursor() {
    let stage = stage();
    stage.host.set_cursor("text");

    stage.core.pointer_enter(stage.card);
    assert_eq!(stage.host.cursor(), "move");

    stage.core.disable();
    assert_eq!(stage.host.cursor(), "text");
}

#[test]
fn test_hover_on_unbound_element_is_ignored() {
    let stage = stage();
    stage.host.set_cursor("default");

    stage.core.pointer_enter(stage.stage);
    assert_eq!(stage.host.cursor(), "default");
}

#[test]
fn test_drag_classes() {
    let config = DragConfig {
        classes: ClassNames {
            active: Some("is-active".into()),
            activated: Some("is-picked".into()),
            moving: Some("is-moving is-lifted".into()),
        },
        ..DragConfig::default()
    };
    let stage = StageBuilder::new().with_config(config).build();

    stage.press(50.0, 50.0);
    assert!(stage.host.has_class(stage.card, "is-active"));
    assert!(stage.host.has_class(stage.card, "is-picked"));
    assert!(!stage.host.has_class(stage.card, "is-moving"));

    stage.move_to(60.0, 60.0);
    assert!(stage.host.has_class(stage.card, "is-moving"));
    assert!(stage.host.has_class(stage.card, "is-lifted"));

    stage.release(60.0, 60.0);
    assert!(!stage.host.has_class(stage.card, "is-active"));
    assert!(!stage.host.has_class(stage.card, "is-moving"));
    assert!(!stage.host.has_class(stage.card, "is-lifted"));
    assert!(stage.host.has_class(stage.card, "is-picked"));
}

#[test]
fn test_activated_class_moves_between_targets() {
    let config = DragConfig {
        classes: ClassNames {
            activated: Some("is-picked".into()),
            ..ClassNames::default()
        },
        ..DragConfig::default()
    };
    let stage = StageBuilder::new().with_config(config).build();
    let second = stage.host.append(
        stage.stage,
        ElementSpec::new("div").class("card").absolute(200.0, 200.0).size(100.0, 100.0),
    );
    stage.core.rebind();

    stage.drag((50.0, 50.0), &[(60.0, 60.0)]);
    assert!(stage.host.has_class(stage.card, "is-picked"));

    stage.core.press(second, PointerSample::at(second, 210.0, 210.0));
    stage.core.release(PointerSample::at(second, 210.0, 210.0));
    assert!(stage.host.has_class(second, "is-picked"));
    assert!(!stage.host.has_class(stage.card, "is-picked"));
}
