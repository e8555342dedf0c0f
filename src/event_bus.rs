//! Per-instance publish/subscribe over named channels.
//!
//! Listeners are kept per channel in invocation order. Each listener gets a
//! [`ListenerId`] at subscription time, which is the only handle for
//! removing it again (closures have no usable identity).
//!
//! ## Publishing
//!
//! [`EventBus::publish`] snapshots the channel before invoking anything, so
//! listeners may subscribe or unsubscribe from inside a callback:
//! - listeners added during a publish do not run in that pass
//! - listeners removed during a publish do not shift or skip the others
//! - once-listeners are detached as they fire, by id
//!
//! ## Recording scopes
//!
//! While one or more scopes are open, every new subscription is also
//! recorded into each open scope. The plugin registry opens a scope around
//! `install` so it can later remove exactly what a plugin subscribed.
//!
//! ## Ordering
//!
//! Entries carry a sequence number and each channel stays sorted by it.
//! [`EventBus::resequence`] hands out fresh numbers to a list of listeners,
//! which has the same observable effect as removing and re-adding them in
//! that order, without detaching anything.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::ControlFlow;
use std::rc::Rc;

use tracing::trace;

/// Identity of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Identity of an open recording scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

/// A recorded subscription: enough to remove or reorder it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription<K> {
    pub channel: K,
    pub id: ListenerId,
    pub once: bool,
}

struct Entry<F: ?Sized> {
    id: ListenerId,
    seq: u64,
    once: bool,
    callback: Rc<F>,
}

struct BusState<K, F: ?Sized> {
    channels: HashMap<K, Vec<Entry<F>>>,
    scopes: Vec<(ScopeId, Vec<Subscription<K>>)>,
    next_id: u64,
    next_seq: u64,
    next_scope: u64,
}

/// Channel-keyed listener registry.
///
/// `K` names a channel, `F` is the (usually unsized) callback type, for
/// example `dyn Fn(&mut Payload)`.
pub struct EventBus<K, F: ?Sized> {
    state: RefCell<BusState<K, F>>,
}

impl<K, F> Default for EventBus<K, F>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
    F: ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, F> EventBus<K, F>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
    F: ?Sized,
{
    pub fn new() -> Self {
        Self {
            state: RefCell::new(BusState {
                channels: HashMap::new(),
                scopes: Vec::new(),
                next_id: 0,
                next_seq: 0,
                next_scope: 0,
            }),
        }
    }

    /// Append a listener to `channel`. A `once` listener is detached the
    /// first time it fires.
    pub fn subscribe(&self, channel: K, callback: Rc<F>, once: bool) -> ListenerId {
        let mut state = self.state.borrow_mut();
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        let seq = state.next_seq;
        state.next_seq += 1;

        state.channels.entry(channel).or_default().push(Entry {
            id,
            seq,
            once,
            callback,
        });

        let record = Subscription { channel, id, once };
        for (_, recorded) in state.scopes.iter_mut() {
            recorded.push(record);
        }
        id
    }

    /// Remove one listener, or every listener of the channel when `id` is
    /// `None`. Open scopes forget the removed subscriptions as well.
    /// Returns how many listeners were removed.
    pub fn unsubscribe(&self, channel: K, id: Option<ListenerId>) -> usize {
        let mut state = self.state.borrow_mut();

        for (_, recorded) in state.scopes.iter_mut() {
            recorded.retain(|sub| sub.channel != channel || id.is_some_and(|id| sub.id != id));
        }

        let Some(list) = state.channels.get_mut(&channel) else {
            return 0;
        };
        let before = list.len();
        match id {
            Some(id) => list.retain(|entry| entry.id != id),
            None => list.clear(),
        }
        let removed = before - list.len();
        if list.is_empty() {
            state.channels.remove(&channel);
        }
        removed
    }

    /// Invoke every listener of `channel` through `invoke`, in order.
    ///
    /// The listener list is snapshotted first; no borrow is held while a
    /// listener runs. Returning [`ControlFlow::Break`] from `invoke` stops
    /// delivery to the rest of the snapshot. Returns the number of listeners
    /// invoked.
    pub fn publish(&self, channel: K, mut invoke: impl FnMut(&F) -> ControlFlow<()>) -> usize {
        let snapshot: Vec<(ListenerId, bool, Rc<F>)> = {
            let state = self.state.borrow();
            match state.channels.get(&channel) {
                Some(list) => list
                    .iter()
                    .map(|entry| (entry.id, entry.once, Rc::clone(&entry.callback)))
                    .collect(),
                None => return 0,
            }
        };

        let mut fired = 0;
        for (id, once, callback) in snapshot {
            // A once-listener that re-publishes on its own channel must not
            // see itself again, so it is detached before it runs.
            if once {
                self.unsubscribe(channel, Some(id));
            }
            fired += 1;
            if invoke(&callback).is_break() {
                trace!(?channel, fired, "publish stopped early");
                break;
            }
        }
        fired
    }

    /// Start recording subscriptions.
    pub fn open_scope(&self) -> ScopeId {
        let mut state = self.state.borrow_mut();
        let id = ScopeId(state.next_scope);
        state.next_scope += 1;
        state.scopes.push((id, Vec::new()));
        id
    }

    /// Stop recording and return everything subscribed while the scope was
    /// open and is still subscribed. Closing an unknown scope yields nothing.
    pub fn close_scope(&self, scope: ScopeId) -> Vec<Subscription<K>> {
        let mut state = self.state.borrow_mut();
        match state.scopes.iter().position(|(id, _)| *id == scope) {
            Some(idx) => state.scopes.remove(idx).1,
            None => Vec::new(),
        }
    }

    /// Number of currently open scopes.
    pub fn open_scopes(&self) -> usize {
        self.state.borrow().scopes.len()
    }

    /// Move `subscriptions` to the back of their channels, in the given
    /// order. Ids that are no longer subscribed are skipped.
    pub fn resequence(&self, subscriptions: &[Subscription<K>]) {
        let mut state = self.state.borrow_mut();
        let mut touched: Vec<K> = Vec::new();

        for sub in subscriptions {
            let seq = state.next_seq;
            let Some(list) = state.channels.get_mut(&sub.channel) else {
                continue;
            };
            if let Some(entry) = list.iter_mut().find(|entry| entry.id == sub.id) {
                entry.seq = seq;
                state.next_seq += 1;
                if !touched.contains(&sub.channel) {
                    touched.push(sub.channel);
                }
            }
        }

        for channel in touched {
            if let Some(list) = state.channels.get_mut(&channel) {
                list.sort_by_key(|entry| entry.seq);
            }
        }
    }

    pub fn listener_count(&self, channel: K) -> usize {
        self.state
            .borrow()
            .channels
            .get(&channel)
            .map_or(0, Vec::len)
    }

    /// Listener ids of `channel` in invocation order.
    pub fn listeners(&self, channel: K) -> Vec<ListenerId> {
        self.state
            .borrow()
            .channels
            .get(&channel)
            .map(|list| list.iter().map(|entry| entry.id).collect())
            .unwrap_or_default()
    }

    pub fn is_subscribed(&self, channel: K, id: ListenerId) -> bool {
        self.state
            .borrow()
            .channels
            .get(&channel)
            .is_some_and(|list| list.iter().any(|entry| entry.id == id))
    }

    /// Drop every listener and every open scope.
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.channels.clear();
        state.scopes.clear();
    }
}
