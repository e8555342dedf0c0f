//! Unit tests for perf module.

use dragcore::perf::ScopedTimer;

#[test]
fn test_scoped_timer_creation() {
    // High threshold, so dropping it never warns
    let timer = ScopedTimer::new("test_op", 1000.0);
    assert_eq!(timer.name(), "test_op");
    assert_eq!(timer.threshold_ms(), 1000.0);
    assert!(timer.elapsed_ms() >= 0.0);
}

#[test]
fn test_nested_timers_track_depth() {
    let outer = ScopedTimer::new("commit", 1000.0);
    assert_eq!(outer.depth(), 0);
    {
        let inner = ScopedTimer::new("commit", 1000.0);
        assert_eq!(inner.depth(), 1);
    }
    let sibling = ScopedTimer::new("commit", 1000.0);
    assert_eq!(sibling.depth(), 1);
    drop(sibling);
    drop(outer);

    assert_eq!(ScopedTimer::new("after", 1000.0).depth(), 0);
}

#[test]
fn test_profile_scope_macro_compiles() {
    fn work() -> u32 {
        dragcore::profile_scope!("work");
        dragcore::profile_scope!("work_inner", 5.0);
        7
    }
    assert_eq!(work(), 7);
}
