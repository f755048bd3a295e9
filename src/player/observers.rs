// ABOUTME: Typed observer list with disposable subscriptions
// ABOUTME: Handlers run synchronously on the emitting thread

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    handlers: Vec<(u64, Handler<T>)>,
}

/// List of observers for events of type `T`
pub struct ObserverList<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> ObserverList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Register `handler`; the returned subscription removes it again
    pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.handlers.push((id, Arc::new(handler)));
            id
        };

        let registry: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            dispose: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.lock().handlers.retain(|(other, _)| *other != id);
                }
            })),
        }
    }

    /// Call every handler with `event`, in registration order.
    ///
    /// Handlers may subscribe or dispose while being called; changes apply
    /// from the next emit.
    pub fn emit(&self, event: &T) {
        let handlers: Vec<Handler<T>> = self
            .registry
            .lock()
            .handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    /// Remove every handler
    pub fn clear(&self) {
        self.registry.lock().handlers.clear();
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.registry.lock().handlers.len()
    }

    /// Whether no handler is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration handle returned by [`ObserverList::subscribe`].
///
/// Dropping it keeps the handler registered; call
/// [`Subscription::dispose`] to remove it.
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Remove the handler. Disposing after the list was cleared is a no-op.
    pub fn dispose(mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}
