//! Point-to-point delegate callbacks.
//!
//! A [`DelegateSlot`] holds at most one observer behind a non-owning `Weak`
//! reference. The slot never keeps an observer alive; an observer dropped by
//! its owner is treated as "no delegate" on the next notification, never
//! dereferenced unsafely.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Single-observer callback slot for a capability trait `D`.
///
/// `notify` runs the observer synchronously on the calling context; picking
/// an appropriate context for the observer's expectations is the caller's
/// job.
pub struct DelegateSlot<D: ?Sized> {
    slot: Mutex<Option<Weak<D>>>,
}

impl<D: ?Sized> DelegateSlot<D> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Register `observer`, replacing any previous observer without invoking
    /// anything on it. Only a weak reference is retained.
    pub fn set(&self, observer: &Arc<D>) {
        *self.slot.lock() = Some(Arc::downgrade(observer));
    }

    /// Empty the slot. Subsequent notifications are no-ops.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    /// Whether a live observer is currently registered.
    pub fn is_set(&self) -> bool {
        self.slot
            .lock()
            .as_ref()
            .map(|weak| weak.strong_count() > 0)
            .unwrap_or(false)
    }

    /// Invoke `call` on the registered observer, if one is set and still
    /// alive. Returns the call's result, or `None` when the slot is empty.
    ///
    /// The slot's lock is released before `call` runs, so the observer may
    /// `set` or `clear` this slot re-entrantly.
    pub fn notify<R>(&self, call: impl FnOnce(&D) -> R) -> Option<R> {
        let observer = {
            let mut slot = self.slot.lock();
            match slot.as_ref().and_then(Weak::upgrade) {
                Some(observer) => Some(observer),
                None => {
                    // Prune a dead reference so is_set stays truthful.
                    *slot = None;
                    None
                }
            }
        }?;
        Some(call(&observer))
    }
}

impl<D: ?Sized> Default for DelegateSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ?Sized> std::fmt::Debug for DelegateSlot<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegateSlot")
            .field("is_set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;

    trait MessageObserver: Send + Sync {
        fn message_received(&self, message: &str);
    }

    #[derive(Default)]
    struct Recorder {
        messages: PlMutex<Vec<String>>,
    }

    impl MessageObserver for Recorder {
        fn message_received(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }
    }

    #[test]
    fn notify_without_observer_is_a_noop() {
        let slot: DelegateSlot<dyn MessageObserver> = DelegateSlot::new();
        assert!(slot.notify(|d| d.message_received("x")).is_none());
    }

    #[test]
    fn observer_receives_each_notification_exactly_once() {
        let slot: DelegateSlot<dyn MessageObserver> = DelegateSlot::new();
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn MessageObserver> = recorder.clone();

        slot.set(&observer);
        slot.notify(|d| d.message_received("x was sent!"));
        assert_eq!(*recorder.messages.lock(), vec!["x was sent!".to_string()]);

        slot.clear();
        slot.notify(|d| d.message_received("dropped"));
        assert_eq!(recorder.messages.lock().len(), 1);
    }

    #[test]
    fn dead_observer_is_treated_as_no_delegate() {
        let slot: DelegateSlot<dyn MessageObserver> = DelegateSlot::new();
        {
            let observer: Arc<dyn MessageObserver> = Arc::new(Recorder::default());
            slot.set(&observer);
            assert!(slot.is_set());
        }
        assert!(slot.notify(|d| d.message_received("x")).is_none());
        assert!(!slot.is_set());
    }

    #[test]
    fn setting_a_new_observer_replaces_the_old_one() {
        let slot: DelegateSlot<dyn MessageObserver> = DelegateSlot::new();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let first_observer: Arc<dyn MessageObserver> = first.clone();
        let second_observer: Arc<dyn MessageObserver> = second.clone();

        slot.set(&first_observer);
        slot.set(&second_observer);
        slot.notify(|d| d.message_received("hello"));

        assert!(first.messages.lock().is_empty());
        assert_eq!(second.messages.lock().len(), 1);
    }
}
