//! Plugin registry: priority ordering, duplicates and exact unregistering.

use crate::helpers::{StageBuilder, stage};
use dragcore::constants::priority;
use dragcore::plugins::{BoundaryLimit, Snap};
use dragcore::{Channel, FnPlugin};
use std::cell::RefCell;
use std::rc::Rc;

type Trace = Rc<RefCell<Vec<&'static str>>>;

/// Plugin that logs its name on every axisBeforeUpdate frame.
fn tracer(name: &'static str, priority: i32, trace: &Trace) -> FnPlugin {
    let trace = Rc::clone(trace);
    FnPlugin::new(name, move |core| {
        let trace = Rc::clone(&trace);
        core.subscribe(Channel::AxisBeforeUpdate, move |_| trace.borrow_mut().push(name));
    })
    .with_priority(priority)
}

#[test]
fn test_lower_priority_runs_first() {
    let stage = StageBuilder::new().bare().build();
    let trace = Trace::default();
    stage.core.register(|| tracer("A", 20, &trace));
    stage.core.register(|| tracer("B", 10, &trace));

    stage.drag((50.0, 50.0), &[(60.0, 60.0)]);

    assert_eq!(*trace.borrow(), vec!["B", "A"]);
    assert_eq!(stage.core.plugin_names(), vec!["B", "A"]);
}

#[test]
fn test_swapped_priorities_swap_order() {
    let stage = StageBuilder::new().bare().build();
    let trace = Trace::default();
    stage.core.register(|| tracer("A", 10, &trace));
    stage.core.register(|| tracer("B", 20, &trace));

    stage.drag((50.0, 50.0), &[(60.0, 60.0)]);

    assert_eq!(*trace.borrow(), vec!["A", "B"]);
}

#[test]
fn test_equal_priorities_keep_registration_order() {
    let stage = StageBuilder::new().bare().build();
    let trace = Trace::default();
    stage.core.register(|| tracer("First", 0, &trace));
    stage.core.register(|| tracer("Second", 0, &trace));
    stage.core.register(|| tracer("Third", 0, &trace));

    stage.drag((50.0, 50.0), &[(60.0, 60.0)]);

    assert_eq!(*trace.borrow(), vec!["First", "Second", "Third"]);
}

#[test]
fn test_builtin_execution_order() {
    let stage = stage();
    assert_eq!(
        stage.core.plugin_names(),
        vec!["Direction", "Scrolling", "Snap", "BoundaryLimit", "ShadowFollow"]
    );
}

#[test]
fn test_late_registration_is_resequenced() {
    let stage = stage();
    // Runs before BoundaryLimit despite being registered last, so the
    // clamp still applies.
    stage.core.register(|| {
        FnPlugin::new("Early", |core| {
            core.subscribe(Channel::AxisBeforeUpdate, |event| event.x = 1000.0);
        })
        .with_priority(priority::GROUND)
    });

    stage.drag((50.0, 50.0), &[(60.0, 60.0)]);
    assert_eq!(stage.position(), (400.0, 20.0));
}

#[test]
fn test_outer_plugin_sees_final_value() {
    let stage = stage();
    stage.core.register(|| {
        FnPlugin::new("Late", |core| {
            core.subscribe(Channel::AxisBeforeUpdate, |event| event.x = 1000.0);
        })
        .with_priority(priority::OUTER_SPACE)
    });

    stage.drag((50.0, 50.0), &[(60.0, 60.0)]);
    assert_eq!(stage.position(), (1000.0, 20.0));
}

#[test]
fn test_duplicate_registration_is_noop() {
    let stage = stage();
    let before: Vec<usize> = Channel::ALL
        .iter()
        .map(|c| stage.core.listener_count(*c))
        .collect();

    assert!(!stage.core.register(Snap::default));
    assert!(!stage.core.register(BoundaryLimit::default));

    let after: Vec<usize> = Channel::ALL
        .iter()
        .map(|c| stage.core.listener_count(*c))
        .collect();
    assert_eq!(before, after);
    assert_eq!(stage.core.plugin_names().len(), 5);
}

#[test]
fn test_unregister_removes_exactly_its_listeners() {
    let stage = stage();
    let user = stage.core.subscribe(Channel::AxisBeforeUpdate, |_| {});
    assert_eq!(stage.core.listener_count(Channel::AxisBeforeUpdate), 6);
    assert_eq!(stage.core.listener_count(Channel::Start), 3);
    assert_eq!(stage.core.listener_count(Channel::End), 2);

    assert!(stage.core.unregister("Snap"));

    assert_eq!(stage.core.listener_count(Channel::AxisBeforeUpdate), 5);
    assert_eq!(stage.core.listener_count(Channel::Start), 2);
    assert_eq!(stage.core.listener_count(Channel::End), 1);
    assert!(!stage.core.plugin_names().contains(&"Snap".to_string()));
    // The user listener survives.
    assert_eq!(stage.core.unsubscribe(Channel::AxisBeforeUpdate, Some(user)), 1);

    assert!(!stage.core.unregister("Snap"));
}

#[test]
fn test_unregister_by_index() {
    let stage = stage();

    assert!(stage.core.unregister(0usize));
    assert_eq!(
        stage.core.plugin_names(),
        vec!["Scrolling", "Snap", "BoundaryLimit", "ShadowFollow"]
    );
    assert!(!stage.core.unregister(10usize));
}

#[test]
fn test_uninstall_hook_runs() {
    let stage = StageBuilder::new().bare().build();
    let uninstalled = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&uninstalled);
    stage.core.register(move || {
        FnPlugin::new("Hooked", |_| {}).on_uninstall(move |_| *flag.borrow_mut() = true)
    });

    stage.core.unregister("Hooked");
    assert!(*uninstalled.borrow());
}
