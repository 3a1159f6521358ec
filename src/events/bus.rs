//! # EventBus
//!
//! Broadcast delivery of named events to registered subscriptions. An
//! `EventBus` is an explicit, constructible instance owned by whatever
//! composes the system; there is no process-wide default, which keeps tests
//! isolated and ownership visible.
//!
//! Delivery is synchronous on the posting context, in registration order,
//! exactly once per live matching subscription. `post` is frequently invoked
//! from inside queued work, so a caller waiting on delivery must block on a
//! signal from the handler rather than assume `post` returned on its own
//! context.
//!
//! # Examples
//!
//! ```rust
//! use dispatch_core::events::{Event, EventBus};
//!
//! let bus = EventBus::new();
//! let handle = bus.subscribe("fileLoaded", |event| {
//!     println!("loaded: {:?}", event.payload);
//! });
//! bus.post(Event::new("fileLoaded"));
//! bus.unsubscribe(handle);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::events::types::{Event, SourceId};

type Handler = Box<dyn Fn(&Event) + Send + Sync + 'static>;

/// Payload predicate evaluated against a candidate event before delivery.
pub type PayloadPredicate = Box<dyn Fn(&HashMap<String, Value>) -> bool + Send + Sync + 'static>;

/// Opaque handle identifying one subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

struct Subscription {
    id: u64,
    event_name: String,
    source_filter: Option<SourceId>,
    predicate: Option<PayloadPredicate>,
    handler: Handler,
    /// Cleared on unsubscribe. Checked immediately before each delivery so a
    /// handler removed mid-post (including by an earlier handler in the same
    /// post) is skipped.
    active: AtomicBool,
}

impl Subscription {
    fn matches(&self, event: &Event) -> bool {
        if self.event_name != event.name {
            return false;
        }
        if let Some(filter) = self.source_filter {
            if event.source != Some(filter) {
                return false;
            }
        }
        match &self.predicate {
            Some(predicate) => predicate(&event.payload),
            None => true,
        }
    }
}

/// Broadcast bus for named events. Cheap to clone; clones share the same
/// subscription table.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    subscriptions: Mutex<Vec<Arc<Subscription>>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscriptions: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register `handler` for every event named `event_name`.
    pub fn subscribe(
        &self,
        event_name: impl Into<String>,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.subscribe_filtered(event_name, None, None, handler)
    }

    /// Register `handler` with an optional source filter and payload
    /// predicate. Both must match (when present) for the handler to run.
    pub fn subscribe_filtered(
        &self,
        event_name: impl Into<String>,
        source_filter: Option<SourceId>,
        predicate: Option<PayloadPredicate>,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let subscription = Arc::new(Subscription {
            id,
            event_name: event_name.into(),
            source_filter,
            predicate,
            handler: Box::new(handler),
            active: AtomicBool::new(true),
        });

        // Registration order is delivery order, so new subscriptions always
        // append.
        self.inner.subscriptions.lock().push(subscription);
        SubscriptionHandle(id)
    }

    /// Remove one subscription. Returns `false` for an unknown or
    /// already-removed handle. Safe to call from inside a handler.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut subscriptions = self.inner.subscriptions.lock();
        match subscriptions.iter().position(|s| s.id == handle.0) {
            Some(index) => {
                let subscription = subscriptions.remove(index);
                subscription.active.store(false, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Deliver `event` to every live matching subscription, synchronously on
    /// this context, in registration order. Returns the number of handlers
    /// invoked; zero subscribers is a no-op, not an error.
    pub fn post(&self, event: Event) -> usize {
        // Snapshot under the lock, invoke outside it, so handlers may
        // subscribe or unsubscribe re-entrantly. Handlers registered during
        // this post do not see the in-flight event.
        let snapshot: Vec<Arc<Subscription>> = {
            let subscriptions = self.inner.subscriptions.lock();
            subscriptions
                .iter()
                .filter(|s| s.event_name == event.name)
                .map(Arc::clone)
                .collect()
        };

        let mut delivered = 0;
        for subscription in &snapshot {
            if !subscription.active.load(Ordering::Acquire) {
                continue;
            }
            if subscription.matches(&event) {
                (subscription.handler)(&event);
                delivered += 1;
            }
        }

        debug!(name = %event.name, delivered, "Event posted");
        delivered
    }

    /// Number of live subscriptions across all event names.
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.lock().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn post_with_no_subscribers_is_a_noop() {
        let bus = EventBus::new();
        assert_eq!(bus.post(Event::new("orphan")), 0);
    }

    #[test]
    fn unsubscribe_unknown_handle_returns_false() {
        let bus = EventBus::new();
        let handle = bus.subscribe("foo", |_| {});
        assert!(bus.unsubscribe(handle));
        assert!(!bus.unsubscribe(handle));
    }

    #[test]
    fn predicate_gates_delivery() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_handler = Arc::clone(&hits);
        bus.subscribe_filtered(
            "foo",
            None,
            Some(Box::new(|payload| payload.contains_key("wanted"))),
            move |_| {
                hits_in_handler.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.post(Event::new("foo"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        bus.post(Event::new("foo").with_entry("wanted", Value::Bool(true)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handler_can_unsubscribe_itself_for_single_shot_delivery() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let handle_slot: Arc<Mutex<Option<SubscriptionHandle>>> = Arc::new(Mutex::new(None));
        let bus_in_handler = bus.clone();
        let hits_in_handler = Arc::clone(&hits);
        let slot_in_handler = Arc::clone(&handle_slot);
        let handle = bus.subscribe("once", move |_| {
            hits_in_handler.fetch_add(1, Ordering::SeqCst);
            if let Some(handle) = *slot_in_handler.lock() {
                bus_in_handler.unsubscribe(handle);
            }
        });
        *handle_slot.lock() = Some(handle);

        assert_eq!(bus.post(Event::new("once")), 1);
        assert_eq!(bus.post(Event::new("once")), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
