//! Media event bus with scoped listener registration

use crate::event::MediaEvent;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

type Listener = Box<dyn FnMut(&MediaEvent) + Send>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Listener registry owned by one media element
///
/// Events are dispatched synchronously on the thread calling
/// [`MediaEventBus::dispatch`]. Listeners must not subscribe to or drop a
/// subscription of the bus that is currently calling them.
#[derive(Clone, Default)]
pub struct MediaEventBus {
    registry: Arc<Mutex<Registry>>,
}

impl MediaEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it stays attached until the returned guard drops
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&MediaEvent) + Send + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Box::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver an event to every attached listener, in registration order
    pub fn dispatch(&self, event: &MediaEvent) {
        let mut registry = self.registry.lock();
        for (_, listener) in registry.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }
}

impl fmt::Debug for MediaEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaEventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Guard for one registered listener; dropping it detaches the listener
#[must_use = "dropping a Subscription detaches its listener immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// False once the owning bus has been dropped
    pub fn is_attached(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.lock().listeners.iter().any(|(id, _)| *id == self.id))
            .unwrap_or(false)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_dispatch_reaches_listeners() {
        let bus = MediaEventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let _sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.dispatch(&MediaEvent::Play);
        bus.dispatch(&MediaEvent::Pause);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_detaches() {
        let bus = MediaEventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(bus.listener_count(), 1);
        assert!(sub.is_attached());

        drop(sub);
        assert_eq!(bus.listener_count(), 0);
        bus.dispatch(&MediaEvent::Play);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let bus = MediaEventBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        assert!(!sub.is_attached());
        drop(sub);
    }

    #[test]
    fn test_only_own_listener_removed() {
        let bus = MediaEventBus::new();
        let first = bus.subscribe(|_| {});
        let second = bus.subscribe(|_| {});
        drop(first);
        assert_eq!(bus.listener_count(), 1);
        assert!(second.is_attached());
    }
}
