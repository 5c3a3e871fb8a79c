//! One-shot listener lists.
//!
//! [`OnceListeners`] models a global event registration that should fire at
//! most once, such as "the next pointer-up anywhere in the document". Each
//! listener is removed before it runs, so a listener that re-registers itself
//! is first invoked by the next dispatch.

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// Identifier for a registered one-shot listener.
    pub struct ListenerId;
}

/// A boxed one-shot listener.
pub type OnceListener<Args> = Box<dyn FnOnce(&Args) + Send + 'static>;

/// A set of listeners that each fire at most once.
pub struct OnceListeners<Args> {
    listeners: Mutex<SlotMap<ListenerId, OnceListener<Args>>>,
}

impl<Args> OnceListeners<Args> {
    /// Create an empty listener list.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Register a listener for the next dispatch.
    pub fn listen<F>(&self, listener: F) -> ListenerId
    where
        F: FnOnce(&Args) + Send + 'static,
    {
        self.listen_boxed(Box::new(listener))
    }

    /// Register an already boxed listener.
    pub fn listen_boxed(&self, listener: OnceListener<Args>) -> ListenerId {
        let id = self.listeners.lock().insert(listener);
        tracing::trace!(target: targets::ONCE, ?id, "listener armed");
        id
    }

    /// Remove a listener before it fires.
    ///
    /// Returns `false` if the listener already fired or was already removed.
    pub fn remove(&self, id: ListenerId) -> bool {
        self.listeners.lock().remove(id).is_some()
    }

    /// Number of armed listeners.
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Whether no listener is armed.
    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Fire and remove every armed listener.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch(&self, args: &Args) -> usize {
        let fired: Vec<(ListenerId, OnceListener<Args>)> = self.listeners.lock().drain().collect();
        let count = fired.len();
        for (id, listener) in fired {
            tracing::trace!(target: targets::ONCE, ?id, "listener fired");
            listener(args);
        }
        count
    }
}

impl<Args> Default for OnceListeners<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for OnceListeners<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnceListeners")
            .field("armed", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_listener_fires_once() {
        let listeners = OnceListeners::<u32>::new();
        let hits = Arc::new(Mutex::new(Vec::new()));

        let hits_clone = hits.clone();
        listeners.listen(move |&n| hits_clone.lock().push(n));

        assert_eq!(listeners.dispatch(&1), 1);
        assert_eq!(listeners.dispatch(&2), 0);
        assert_eq!(*hits.lock(), vec![1]);
    }

    #[test]
    fn test_removed_listener_does_not_fire() {
        let listeners = OnceListeners::<()>::new();
        let fired = Arc::new(Mutex::new(false));

        let fired_clone = fired.clone();
        let id = listeners.listen(move |_| *fired_clone.lock() = true);

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        assert!(listeners.is_empty());
        listeners.dispatch(&());
        assert!(!*fired.lock());
    }

    #[test]
    fn test_rearm_from_listener_waits_for_next_dispatch() {
        let listeners = Arc::new(OnceListeners::<()>::new());
        let count = Arc::new(Mutex::new(0));

        let again = listeners.clone();
        let count_outer = count.clone();
        listeners.listen(move |_| {
            *count_outer.lock() += 1;
            let count_inner = count_outer.clone();
            again.listen(move |_| *count_inner.lock() += 1);
        });

        assert_eq!(listeners.dispatch(&()), 1);
        assert_eq!(*count.lock(), 1);
        assert_eq!(listeners.len(), 1);
        assert_eq!(listeners.dispatch(&()), 1);
        assert_eq!(*count.lock(), 2);
    }
}
