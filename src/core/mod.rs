//! The drag engine.
//!
//! [`DragCore`] is the composition root: it owns the event bus, the bound
//! session records, the plugin registry and the host handle, and exposes
//! the public event surface. Submodules split its behavior:
//!
//! - `binding` - selector resolution and listener wiring
//! - `input` - press / move / release / hover entry points
//! - `pipeline` - the coordinate commit path and its re-entrant setter
//! - `session` - per-pair records and the session state machine
//! - `options` - construction options and partial updates
//!
//! Everything runs on one thread. No `RefCell` borrow is held while a
//! listener or plugin hook runs, so listeners may call back into the core.

mod binding;
mod input;
mod options;
mod pipeline;
mod session;

pub use binding::{ResolveFn, Selector};
pub use input::PointerSample;
pub use options::{DragOptions, OptionsUpdate};
pub use pipeline::{DragEvent, PipelineStats, Ratio};
pub use session::{ActiveDrag, SessionPhase, SessionRecord};

use crate::config::DragConfig;
use crate::event_bus::{EventBus, ListenerId};
use crate::geometry::ElementId;
use crate::host::{Host, ListenKind};
use crate::plugins::{Plugin, PluginKey, PluginRegistry};
use std::cell::RefCell;
use std::fmt;
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};
use tracing::debug;

/// Named event channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    BeforeStart,
    Start,
    BeforeMove,
    Move,
    BeforeEnd,
    End,
    /// Candidate position, before it is written
    AxisBeforeUpdate,
    /// Position written and stored
    AxisUpdated,
}

impl Channel {
    pub const ALL: [Channel; 8] = [
        Channel::BeforeStart,
        Channel::Start,
        Channel::BeforeMove,
        Channel::Move,
        Channel::BeforeEnd,
        Channel::End,
        Channel::AxisBeforeUpdate,
        Channel::AxisUpdated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::BeforeStart => "beforeStart",
            Channel::Start => "start",
            Channel::BeforeMove => "beforeMove",
            Channel::Move => "move",
            Channel::BeforeEnd => "beforeEnd",
            Channel::End => "end",
            Channel::AxisBeforeUpdate => "axisBeforeUpdate",
            Channel::AxisUpdated => "axisUpdated",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listener signature on every channel.
pub type Listener = dyn Fn(&mut DragEvent<'_>);

/// Cursor bookkeeping across hover and press.
#[derive(Debug, Default)]
pub(crate) struct HoverState {
    /// Pointer is over a bound handle
    entering: bool,
    /// A press is in progress
    pressing: bool,
    /// Cursor to restore when the pointer leaves a handle
    saved_cursor: String,
    /// Cursor to restore on release
    press_cursor: String,
}

pub(crate) struct CoreState {
    options: DragOptions,
    enabled: bool,
    records: Vec<SessionRecord>,
    proxies: Vec<ElementId>,
    attached: Vec<(ElementId, ListenKind)>,
    phase: SessionPhase,
    ratio: Ratio,
    hover: HoverState,
    stats: PipelineStats,
}

/// One drag engine instance.
///
/// Created through [`DragCore::new`], which returns an `Rc`: plugins keep
/// a [`Weak`] handle (see [`DragCore::downgrade`]) for timer callbacks.
pub struct DragCore {
    this: Weak<DragCore>,
    host: Rc<dyn Host>,
    bus: EventBus<Channel, Listener>,
    plugins: PluginRegistry,
    state: RefCell<CoreState>,
}

impl DragCore {
    /// Build an instance and bind its targets. Starts enabled unless
    /// `options.config.disabled` is set.
    pub fn new(host: Rc<dyn Host>, options: DragOptions) -> Rc<Self> {
        let enabled = !options.config.disabled;
        let has_target = options.target.is_some();
        let core = Rc::new_cyclic(|this| DragCore {
            this: this.clone(),
            host,
            bus: EventBus::new(),
            plugins: PluginRegistry::default(),
            state: RefCell::new(CoreState {
                options,
                enabled,
                records: Vec::new(),
                proxies: Vec::new(),
                attached: Vec::new(),
                phase: SessionPhase::Idle,
                ratio: Ratio::IDENTITY,
                hover: HoverState::default(),
                stats: PipelineStats::default(),
            }),
        });
        if has_target {
            core.rebind();
        }
        debug!(enabled, "Created drag core");
        core
    }

    pub fn downgrade(&self) -> Weak<DragCore> {
        self.this.clone()
    }

    pub fn host(&self) -> &dyn Host {
        &*self.host
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start accepting input on every bound handle.
    pub fn enable(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.enabled = true;
            state.options.config.disabled = false;
        }
        self.sync_listeners();
        debug!("Drag enabled");
    }

    /// Stop accepting input. An in-flight drag is ended where it stands,
    /// firing `End` exactly once, then listeners are detached and the
    /// cursor restored.
    pub fn disable(&self) {
        if !self.is_enabled() {
            return;
        }
        if self.is_dragging() {
            debug!("Disabling mid-drag, ending active session");
            self.finish(None);
        }

        let cursor = {
            let mut state = self.state.borrow_mut();
            state.enabled = false;
            state.options.config.disabled = true;
            state.hover.entering = false;
            state.hover.pressing = false;
            std::mem::take(&mut state.hover.saved_cursor)
        };
        self.host.set_cursor(&cursor);
        self.sync_listeners();
        debug!("Drag disabled");
    }

    /// Disable, then uninstall every plugin.
    pub fn destroy(&self) {
        self.disable();
        self.plugins.clear(self);
        debug!("Drag core destroyed");
    }

    /// Merge `update` into the options. Changing target, handle or proxy
    /// re-resolves the bindings.
    ///
    /// A new config never toggles the instance: `disabled` follows
    /// [`enable`](Self::enable) / [`disable`](Self::disable). A scroll
    /// container set in code survives a config without one, since loaded
    /// files cannot name elements.
    pub fn update_options(&self, update: OptionsUpdate) {
        let rebind = {
            let mut state = self.state.borrow_mut();
            let touches_binding = update.touches_binding();
            let enabled = state.enabled;
            let options = &mut state.options;
            if let Some(target) = update.target {
                options.target = Some(target);
            }
            if let Some(handle) = update.handle {
                options.handle = Some(handle);
            }
            if let Some(proxy) = update.event_proxy {
                options.event_proxy = Some(proxy);
            }
            if let Some(mut config) = update.config {
                config.disabled = !enabled;
                if config.scroll.container.is_none() {
                    config.scroll.container = options.config.scroll.container;
                }
                options.config = config;
            }
            touches_binding && options.target.is_some()
        };
        if rebind {
            self.rebind();
        }
    }

    /// Replace the config, keeping selectors. Convenient for hot reload.
    pub fn apply_config(&self, config: DragConfig) {
        self.update_options(OptionsUpdate::new().config(config));
    }

    // ------------------------------------------------------------------
    // Plugins
    // ------------------------------------------------------------------

    /// Register the plugin `factory` builds. Returns false, leaving the
    /// registry untouched, when a plugin with that name already exists.
    pub fn register<P, F>(&self, factory: F) -> bool
    where
        P: Plugin + 'static,
        F: FnOnce() -> P,
    {
        self.plugins.register(self, Rc::new(factory()))
    }

    pub fn register_plugin(&self, plugin: Rc<dyn Plugin>) -> bool {
        self.plugins.register(self, plugin)
    }

    /// Uninstall a plugin by name or index. Returns false when absent.
    pub fn unregister(&self, key: impl Into<PluginKey>) -> bool {
        self.plugins.unregister(self, key.into())
    }

    /// Registered plugin names in execution order
    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins.names()
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn subscribe(
        &self,
        channel: Channel,
        listener: impl Fn(&mut DragEvent<'_>) + 'static,
    ) -> ListenerId {
        self.bus.subscribe(channel, Rc::new(listener), false)
    }

    /// Subscribe for the next event on `channel` only.
    pub fn once(
        &self,
        channel: Channel,
        listener: impl Fn(&mut DragEvent<'_>) + 'static,
    ) -> ListenerId {
        self.bus.subscribe(channel, Rc::new(listener), true)
    }

    /// Remove one listener, or all of `channel` when `id` is `None`.
    pub fn unsubscribe(&self, channel: Channel, id: Option<ListenerId>) -> usize {
        self.bus.unsubscribe(channel, id)
    }

    pub fn listener_count(&self, channel: Channel) -> usize {
        self.bus.listener_count(channel)
    }

    pub(crate) fn bus(&self) -> &EventBus<Channel, Listener> {
        &self.bus
    }

    /// Publish a copy of `record` on a lifecycle channel.
    pub(crate) fn publish(&self, channel: Channel, record: SessionRecord) {
        let mut event = DragEvent::new(self, channel, record);
        self.bus.publish(channel, |listener| {
            listener(&mut event);
            ControlFlow::Continue(())
        });
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    /// True while a session is between press and release
    pub fn is_dragging(&self) -> bool {
        !self.state.borrow().phase.is_idle()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    /// Ratio measured at the last press
    pub fn ratio(&self) -> Ratio {
        self.state.borrow().ratio
    }

    pub fn stats(&self) -> PipelineStats {
        self.state.borrow().stats
    }

    pub fn config(&self) -> DragConfig {
        self.state.borrow().options.config.clone()
    }

    /// Read the config without cloning it.
    pub fn with_config<R>(&self, f: impl FnOnce(&DragConfig) -> R) -> R {
        f(&self.state.borrow().options.config)
    }

    /// Snapshot of the current selectors and config.
    pub fn options(&self) -> DragOptions {
        self.state.borrow().options.clone()
    }

    /// Record of the first pair bound to `target`.
    pub fn session(&self, target: ElementId) -> Option<SessionRecord> {
        self.state
            .borrow()
            .records
            .iter()
            .find(|r| r.target == target)
            .cloned()
    }

    /// Record of the pair being dragged, if any.
    pub fn active_session(&self) -> Option<SessionRecord> {
        let state = self.state.borrow();
        let drag = state.phase.active()?;
        state.records.iter().find(|r| r.is_pair(drag)).cloned()
    }

    /// Every bound record, in binding order.
    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.state.borrow().records.clone()
    }

    /// Distinct bound targets, in binding order.
    pub fn targets(&self) -> Vec<ElementId> {
        let state = self.state.borrow();
        let mut targets: Vec<ElementId> = Vec::new();
        for record in &state.records {
            if !targets.contains(&record.target) {
                targets.push(record.target);
            }
        }
        targets
    }

    pub fn proxies(&self) -> Vec<ElementId> {
        self.state.borrow().proxies.clone()
    }
}

impl fmt::Debug for DragCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("DragCore")
            .field("enabled", &state.enabled)
            .field("phase", &state.phase)
            .field("records", &state.records.len())
            .field("plugins", &self.plugins.names())
            .finish()
    }
}
