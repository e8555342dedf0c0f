//! Construction options and partial updates.

use super::Selector;
use crate::config::DragConfig;

/// Everything a [`super::DragCore`] is created with.
#[derive(Debug, Clone, Default)]
pub struct DragOptions {
    pub target: Option<Selector>,
    /// Sub-elements receiving the press; the target itself when unset
    pub handle: Option<Selector>,
    /// Containers that delegate presses to the targets inside them
    pub event_proxy: Option<Selector>,
    pub config: DragConfig,
}

impl DragOptions {
    pub fn new(target: impl Into<Selector>) -> Self {
        Self {
            target: Some(target.into()),
            ..Default::default()
        }
    }

    pub fn with_handle(mut self, handle: impl Into<Selector>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn with_event_proxy(mut self, proxy: impl Into<Selector>) -> Self {
        self.event_proxy = Some(proxy.into());
        self
    }

    pub fn with_config(mut self, config: DragConfig) -> Self {
        self.config = config;
        self
    }
}

/// Partial options patch for [`super::DragCore::update_options`].
///
/// Set fields replace the current value. A new `config` replaces the whole
/// config except `disabled`, which only applies at construction.
#[derive(Debug, Clone, Default)]
pub struct OptionsUpdate {
    pub target: Option<Selector>,
    pub handle: Option<Selector>,
    pub event_proxy: Option<Selector>,
    pub config: Option<DragConfig>,
}

impl OptionsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: impl Into<Selector>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn handle(mut self, handle: impl Into<Selector>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn event_proxy(mut self, proxy: impl Into<Selector>) -> Self {
        self.event_proxy = Some(proxy.into());
        self
    }

    pub fn config(mut self, config: DragConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// True when applying this patch changes which elements are bound
    pub fn touches_binding(&self) -> bool {
        self.target.is_some() || self.handle.is_some() || self.event_proxy.is_some()
    }
}
