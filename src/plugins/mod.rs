//! Behavior plugins and their registry.
//!
//! A plugin is a named bundle of channel subscriptions. The registry records
//! exactly what each plugin subscribes during `install` (through an event
//! bus recording scope), so unregistering removes those listeners and
//! nothing else.
//!
//! Plugins share channels. Whenever one is registered, the registry sorts
//! all plugins by [`Plugin::priority`] (stable, so ties keep registration
//! order) and re-sequences their listeners to match: on every channel a
//! lower priority runs first.
//!
//! Built-in plugins:
//!
//! | Plugin | Priority | Channels |
//! |--------|----------|----------|
//! | [`Direction`] | 0 | axisBeforeUpdate |
//! | [`Scrolling`] | SKY | beforeStart, beforeMove, axisBeforeUpdate, beforeEnd |
//! | [`Snap`] | SKY + 20 | start, axisBeforeUpdate, end |
//! | [`BoundaryLimit`] | SKY + 30 | start, axisBeforeUpdate |
//! | [`ShadowFollow`] | THERMOSPHERE | start, axisBeforeUpdate, end |

mod boundary;
mod direction;
mod scrolling;
mod shadow;
mod snap;

pub use boundary::BoundaryLimit;
pub use direction::Direction;
pub use scrolling::Scrolling;
pub use shadow::ShadowFollow;
pub use snap::Snap;

use crate::core::{Channel, DragCore};
use crate::event_bus::Subscription;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// A named behavior extension.
pub trait Plugin {
    /// Unique name; registering a second plugin with the same name is a no-op
    fn name(&self) -> &str;

    /// Execution order on shared channels, lower first
    fn priority(&self) -> i32 {
        0
    }

    /// Subscribe to the core's channels.
    fn install(&self, core: &DragCore);

    /// Release anything `install` set up outside the event bus (timers,
    /// host elements). Subscriptions are removed by the registry.
    fn uninstall(&self, _core: &DragCore) {}
}

/// Addresses a registered plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginKey {
    Name(String),
    /// Position in execution order
    Index(usize),
}

impl From<&str> for PluginKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PluginKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for PluginKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

struct PluginSlot {
    plugin: Rc<dyn Plugin>,
    subscriptions: Vec<Subscription<Channel>>,
}

/// Ordered set of installed plugins.
#[derive(Default)]
pub struct PluginRegistry {
    slots: RefCell<Vec<PluginSlot>>,
}

impl PluginRegistry {
    pub(crate) fn register(&self, core: &DragCore, plugin: Rc<dyn Plugin>) -> bool {
        let name = plugin.name().to_string();
        if self.contains(&name) {
            debug!(plugin = %name, "Plugin already registered, skipping");
            return false;
        }

        self.slots.borrow_mut().push(PluginSlot {
            plugin: Rc::clone(&plugin),
            subscriptions: Vec::new(),
        });

        let scope = core.bus().open_scope();
        plugin.install(core);
        let captured = core.bus().close_scope(scope);
        debug!(
            plugin = %name,
            priority = plugin.priority(),
            listeners = captured.len(),
            "Registered plugin"
        );

        let order = {
            let mut slots = self.slots.borrow_mut();
            if let Some(slot) = slots.iter_mut().find(|s| s.plugin.name() == name) {
                slot.subscriptions = captured;
            }
            if slots.len() < 2 {
                return true;
            }
            slots.sort_by_key(|s| s.plugin.priority());
            slots
                .iter()
                .flat_map(|s| s.subscriptions.iter().copied())
                .collect::<Vec<_>>()
        };
        core.bus().resequence(&order);
        true
    }

    pub(crate) fn unregister(&self, core: &DragCore, key: PluginKey) -> bool {
        let slot = {
            let mut slots = self.slots.borrow_mut();
            let index = match &key {
                PluginKey::Name(name) => slots.iter().position(|s| s.plugin.name() == name),
                PluginKey::Index(index) => (*index < slots.len()).then_some(*index),
            };
            index.map(|i| slots.remove(i))
        };
        let Some(slot) = slot else {
            debug!(?key, "No such plugin to unregister");
            return false;
        };

        slot.plugin.uninstall(core);
        dispose(core, &slot.subscriptions);
        debug!(plugin = slot.plugin.name(), "Unregistered plugin");
        true
    }

    /// Uninstall every plugin, in execution order.
    pub(crate) fn clear(&self, core: &DragCore) {
        let slots = std::mem::take(&mut *self.slots.borrow_mut());
        for slot in slots {
            slot.plugin.uninstall(core);
            dispose(core, &slot.subscriptions);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.borrow().iter().any(|s| s.plugin.name() == name)
    }

    /// Names in execution order
    pub fn names(&self) -> Vec<String> {
        self.slots
            .borrow()
            .iter()
            .map(|s| s.plugin.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

fn dispose(core: &DragCore, subscriptions: &[Subscription<Channel>]) {
    for sub in subscriptions {
        core.bus().unsubscribe(sub.channel, Some(sub.id));
    }
}

type Hook = dyn Fn(&DragCore);

/// Plugin assembled from closures, for one-off behaviors.
///
/// ```ignore
/// core.register(|| {
///     FnPlugin::new("Logger", |core| {
///         core.subscribe(Channel::End, |event| println!("dropped at {}", event.x));
///     })
///     .with_priority(priority::OUTER_SPACE)
/// });
/// ```
pub struct FnPlugin {
    name: String,
    priority: i32,
    install: Box<Hook>,
    uninstall: Option<Box<Hook>>,
}

impl FnPlugin {
    pub fn new(name: impl Into<String>, install: impl Fn(&DragCore) + 'static) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            install: Box::new(install),
            uninstall: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn on_uninstall(mut self, uninstall: impl Fn(&DragCore) + 'static) -> Self {
        self.uninstall = Some(Box::new(uninstall));
        self
    }
}

impl Plugin for FnPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn install(&self, core: &DragCore) {
        (self.install)(core);
    }

    fn uninstall(&self, core: &DragCore) {
        if let Some(uninstall) = &self.uninstall {
            uninstall(core);
        }
    }
}

/// Register every built-in plugin.
pub fn register_builtin(core: &DragCore) {
    core.register(Direction::default);
    core.register(BoundaryLimit::default);
    core.register(Snap::default);
    core.register(Scrolling::default);
    core.register(ShadowFollow::default);
}
