//! Subscribers and the registry that holds them
//!
//! The registry is a copy-on-write list: every change swaps in a new
//! `Arc<Vec<_>>`, and dispatch iterates a cloned `Arc` with the lock
//! released. A subscriber may therefore subscribe or unsubscribe (itself or
//! others) from inside a callback; the change applies from the next event.

use crate::event::StreamEvent;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Receives stream events
///
/// Callbacks run synchronously on the thread that pumps the stream, in
/// arrival order.
pub trait Subscriber: Send + Sync {
    /// Called once per event
    fn on_event(&self, event: &StreamEvent);

    /// Called once when the stream completes
    fn on_complete(&self) {}
}

impl<F> Subscriber for F
where
    F: Fn(&StreamEvent) + Send + Sync,
{
    fn on_event(&self, event: &StreamEvent) {
        self(event)
    }
}

#[derive(Clone)]
pub(crate) struct Entry {
    id: u64,
    subscriber: Arc<dyn Subscriber>,
}

impl Entry {
    pub(crate) fn subscriber(&self) -> &dyn Subscriber {
        &*self.subscriber
    }
}

/// Registered subscribers of one stream
#[derive(Default)]
pub(crate) struct Registry {
    entries: Mutex<Arc<Vec<Entry>>>,
    next_id: AtomicU64,
}

impl Registry {
    /// Register `subscriber`; an `Arc` already present keeps its registration
    pub(crate) fn add(self: &Arc<Self>, subscriber: Arc<dyn Subscriber>) -> Subscription {
        let mut entries = self.entries.lock();

        if let Some(existing) = entries
            .iter()
            .find(|e| Arc::ptr_eq(&e.subscriber, &subscriber))
        {
            debug!(id = existing.id, "subscriber already registered");
            return Subscription::new(self, existing.id);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.extend(entries.iter().cloned());
        next.push(Entry { id, subscriber });
        *entries = Arc::new(next);

        debug!(id, subscribers = entries.len(), "subscribed");
        Subscription::new(self, id)
    }

    /// Remove one registration; false if it was already gone
    pub(crate) fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.lock();
        if !entries.iter().any(|e| e.id == id) {
            return false;
        }
        let next: Vec<Entry> = entries.iter().filter(|e| e.id != id).cloned().collect();
        *entries = Arc::new(next);

        debug!(id, subscribers = entries.len(), "unsubscribed");
        true
    }

    fn contains(&self, id: u64) -> bool {
        self.entries.lock().iter().any(|e| e.id == id)
    }

    /// The subscriber set at this instant
    pub(crate) fn snapshot(&self) -> Arc<Vec<Entry>> {
        self.entries.lock().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Handle to one registration
///
/// Dropping the handle unsubscribes. Use [`Subscription::detach`] to keep
/// the subscriber registered for the life of the stream.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<Registry>,
    id: Option<u64>,
}

impl Subscription {
    fn new(registry: &Arc<Registry>, id: u64) -> Self {
        Subscription {
            registry: Arc::downgrade(registry),
            id: Some(id),
        }
    }

    /// Remove this registration
    ///
    /// Returns true if it was still registered. Later calls, and calls after
    /// the stream is gone, return false.
    pub fn unsubscribe(&mut self) -> bool {
        match (self.id.take(), self.registry.upgrade()) {
            (Some(id), Some(registry)) => registry.remove(id),
            _ => false,
        }
    }

    /// Keep the registration without holding a handle
    pub fn detach(mut self) {
        self.id = None;
    }

    /// True while the registration is in place
    pub fn is_active(&self) -> bool {
        match (self.id, self.registry.upgrade()) {
            (Some(id), Some(registry)) => registry.contains(id),
            _ => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Arc<dyn Subscriber> {
        Arc::new(|_: &StreamEvent| {})
    }

    #[test]
    fn test_add_and_remove() {
        let registry = Arc::new(Registry::default());
        let mut a = registry.add(noop());
        let b = registry.add(noop());
        assert_eq!(registry.len(), 2);

        assert!(a.unsubscribe());
        assert!(!a.unsubscribe());
        assert!(!a.is_active());
        assert!(b.is_active());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let registry = Arc::new(Registry::default());
        {
            let _s = registry.add(noop());
            assert_eq!(registry.len(), 1);
        }
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_detach_keeps_registration() {
        let registry = Arc::new(Registry::default());
        registry.add(noop()).detach();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_arc_registered_once() {
        let registry = Arc::new(Registry::default());
        let s = noop();
        let first = registry.add(Arc::clone(&s));
        let second = registry.add(s);
        assert_eq!(registry.len(), 1);
        assert!(first.is_active() && second.is_active());
        first.detach();
        second.detach();
    }

    #[test]
    fn test_snapshot_is_stable() {
        let registry = Arc::new(Registry::default());
        let mut a = registry.add(noop());
        let snapshot = registry.snapshot();
        a.unsubscribe();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.snapshot().len(), 0);
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped() {
        let registry = Arc::new(Registry::default());
        let mut s = registry.add(noop());
        drop(registry);
        assert!(!s.unsubscribe());
    }
}
