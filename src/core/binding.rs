//! Element binding: which (target, handle) pairs can be dragged.
//!
//! Targets and handles are named by [`Selector`]s and resolved through the
//! host. Resolution is repeatable: listener wiring is diffed against what is
//! already attached, so rebinding never leaks or doubles listeners.

use super::{DragCore, SessionRecord};
use crate::geometry::ElementId;
use crate::host::{Host, ListenKind};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Resolver callback: `(host, scope)` to matching elements.
pub type ResolveFn = dyn Fn(&dyn Host, Option<ElementId>) -> Vec<ElementId>;

/// How to find elements.
#[derive(Clone)]
pub enum Selector {
    Element(ElementId),
    Elements(Vec<ElementId>),
    /// Host query string, e.g. `.card` or `#board`
    Query(String),
    Resolver(Rc<ResolveFn>),
}

impl Selector {
    pub fn query(selector: impl Into<String>) -> Self {
        Self::Query(selector.into())
    }

    pub fn resolver(f: impl Fn(&dyn Host, Option<ElementId>) -> Vec<ElementId> + 'static) -> Self {
        Self::Resolver(Rc::new(f))
    }

    /// Elements this selector names within `scope` (the whole tree when
    /// `None`). Literal elements are returned as given.
    pub fn resolve(&self, host: &dyn Host, scope: Option<ElementId>) -> Vec<ElementId> {
        match self {
            Self::Element(element) => vec![*element],
            Self::Elements(elements) => elements.clone(),
            Self::Query(query) => host.query(query, scope),
            Self::Resolver(resolve) => resolve(host, scope),
        }
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Self::Elements(elements) => f.debug_tuple("Elements").field(elements).finish(),
            Self::Query(query) => f.debug_tuple("Query").field(query).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl From<ElementId> for Selector {
    fn from(element: ElementId) -> Self {
        Self::Element(element)
    }
}

impl From<Vec<ElementId>> for Selector {
    fn from(elements: Vec<ElementId>) -> Self {
        Self::Elements(elements)
    }
}

impl From<&str> for Selector {
    fn from(query: &str) -> Self {
        Self::Query(query.to_string())
    }
}

impl From<String> for Selector {
    fn from(query: String) -> Self {
        Self::Query(query)
    }
}

/// Expand targets into (target, handle) pairs. Without a handle selector a
/// target is its own handle; with one, only its matches inside the target
/// count.
pub(crate) fn resolve_pairs(
    host: &dyn Host,
    targets: &[ElementId],
    handle: Option<&Selector>,
) -> Vec<SessionRecord> {
    let mut records = Vec::new();
    for &target in targets {
        let handles = match handle {
            Some(selector) => selector.resolve(host, Some(target)),
            None => vec![target],
        };
        records.extend(handles.into_iter().map(|h| SessionRecord::new(target, h)));
    }
    records
}

impl DragCore {
    /// Re-resolve proxies, targets and handles from the current options.
    ///
    /// An in-flight drag is ended first, at its last known pointer position.
    pub fn rebind(&self) {
        if self.is_dragging() {
            debug!("Rebinding mid-drag, ending active session");
            self.finish(None);
        }

        let (target, handle, proxy) = {
            let state = self.state.borrow();
            (
                state.options.target.clone(),
                state.options.handle.clone(),
                state.options.event_proxy.clone(),
            )
        };

        let host = self.host();
        let proxies = proxy
            .map(|selector| selector.resolve(host, None))
            .unwrap_or_default();
        let targets: Vec<ElementId> = match &target {
            None => Vec::new(),
            Some(selector) if !proxies.is_empty() => proxies
                .iter()
                .flat_map(|proxy| selector.resolve(host, Some(*proxy)))
                .collect(),
            Some(selector) => selector.resolve(host, None),
        };
        let records = resolve_pairs(host, &targets, handle.as_ref());

        debug!(
            targets = targets.len(),
            pairs = records.len(),
            proxies = proxies.len(),
            "Bound drag elements"
        );

        {
            let mut state = self.state.borrow_mut();
            state.records = records;
            state.proxies = proxies;
        }
        self.sync_listeners();
    }

    /// Attach listeners that should exist and detach the rest.
    pub(crate) fn sync_listeners(&self) {
        let (add, remove) = {
            let mut state = self.state.borrow_mut();
            let mut desired: Vec<(ElementId, ListenKind)> = Vec::new();
            if state.enabled {
                for record in &state.records {
                    let key = (record.handle, ListenKind::Handle);
                    if !desired.contains(&key) {
                        desired.push(key);
                    }
                }
                for proxy in &state.proxies {
                    let key = (*proxy, ListenKind::Proxy);
                    if !desired.contains(&key) {
                        desired.push(key);
                    }
                }
            }

            let remove: Vec<_> = state
                .attached
                .iter()
                .filter(|key| !desired.contains(key))
                .copied()
                .collect();
            let add: Vec<_> = desired
                .iter()
                .filter(|key| !state.attached.contains(key))
                .copied()
                .collect();
            state.attached = desired;
            (add, remove)
        };

        let host = self.host();
        for (element, kind) in remove {
            host.unlisten(element, kind);
        }
        for (element, kind) in add {
            host.listen(element, kind);
        }
    }
}
