//! Publish/Subscribe Channel
//!
//! Subscribers are kept per event kind in subscription order. `publish`
//! calls each of them synchronously on the publishing thread. A panicking
//! subscriber is not isolated: the panic unwinds into the publisher and the
//! remaining subscribers of that publish call are skipped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::trace;

use crate::pubsub::{Event, EventKind};

type Callback = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<EventKind, Vec<(u64, Callback)>>,
}

// == PubSub ==
/// Event bus shared by publishers and subscribers.
///
/// Cloning is cheap and every clone addresses the same subscriber lists.
#[derive(Clone, Default)]
pub struct PubSub {
    registry: Arc<Mutex<Registry>>,
}

impl PubSub {
    pub fn new() -> Self {
        Self::default()
    }

    // == Subscribe ==
    /// Registers `callback` for events of `kind`.
    ///
    /// The returned handle is the only way to remove the callback again.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .subscribers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(callback)));

        trace!(event = %kind, subscription = id, "subscribed");

        Subscription {
            kind,
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    // == Publish ==
    /// Delivers `event` to every subscriber of its kind, in subscription order.
    ///
    /// The list is captured before delivery starts, so callbacks may
    /// subscribe or unsubscribe; such changes apply from the next publish.
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let callbacks: Vec<Callback> = {
            let registry = self.lock();
            match registry.subscribers.get(&event.kind()) {
                Some(list) => list.iter().map(|(_, cb)| cb.clone()).collect(),
                None => return,
            }
        };

        trace!(event = %event.kind(), subscribers = callbacks.len(), "publishing");

        for callback in callbacks {
            callback(&event);
        }
    }

    /// Number of callbacks currently registered for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.lock().subscribers.get(&kind).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PubSub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.lock();
        let counts: HashMap<&'static str, usize> = registry
            .subscribers
            .iter()
            .map(|(kind, list)| (kind.as_str(), list.len()))
            .collect();
        f.debug_struct("PubSub").field("subscribers", &counts).finish()
    }
}

// == Subscription ==
/// Handle to one registered callback.
///
/// Dropping the handle leaves the callback registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
#[must_use = "dropping a Subscription keeps the callback registered forever"]
pub struct Subscription {
    kind: EventKind,
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Removes exactly the callback this handle was returned for.
    pub fn unsubscribe(self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = registry.subscribers.get_mut(&self.kind) {
            list.retain(|(id, _)| *id != self.id);
            if list.is_empty() {
                registry.subscribers.remove(&self.kind);
            }
        }
        trace!(event = %self.kind, subscription = self.id, "unsubscribed");
    }
}
