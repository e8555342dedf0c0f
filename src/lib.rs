//! Drag coordination engine.
//!
//! Turns raw pointer input into element positions and lets behavior
//! plugins reshape those positions before anything is written.
//!
//! ## Architecture
//!
//! A [`DragCore`] binds target/handle pairs resolved from selectors,
//! tracks one session at a time and publishes its lifecycle on an
//! [`EventBus`](event_bus::EventBus). Every candidate position flows
//! through a single commit path (`axisBeforeUpdate`), where plugins run in
//! priority order and may rewrite the position re-entrantly. The outside
//! world is reached only through the [`Host`] traits; [`MemoryHost`] is a
//! complete headless implementation.
//!
//! ## Modules
//!
//! - `core` - the engine: binding, input, pipeline, sessions
//! - `event_bus` - channel listeners with once and recording scopes
//! - `plugins` - plugin trait, registry and the built-in behaviors
//! - `host` - environment capabilities and the in-memory host
//! - `config` - serde config, persistence and hot reload
//! - `geometry` - points, rects, scroll metrics
//! - `perf` - timing helpers for the commit path

pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod host;
pub mod perf;
pub mod plugins;

pub use config::{ConfigWatcher, DragConfig};
pub use crate::core::{
    Channel, DragCore, DragEvent, DragOptions, OptionsUpdate, PointerSample, Selector,
    SessionPhase, SessionRecord,
};
pub use error::{ConfigError, ConfigResult};
pub use geometry::{ElementId, Point, Rect, Size};
pub use host::{ElementSpec, Host, MemoryHost};
pub use plugins::{FnPlugin, Plugin, PluginKey};

use std::rc::Rc;

/// Create an engine with every built-in plugin registered.
pub fn drag(host: Rc<dyn Host>, options: DragOptions) -> Rc<DragCore> {
    let core = DragCore::new(host, options);
    plugins::register_builtin(&core);
    core
}
