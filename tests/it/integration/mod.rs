//! Integration tests for the drag engine.
//!
//! These drive complete sessions through `DragCore` over the in-memory host
//! and check what the host observed: position writes, classes, cursors,
//! listeners and timers.

mod affordance_tests;
mod builtin_plugin_tests;
mod plugin_order_tests;
mod scrolling_tests;
