//! Registration-free focus tracking for a single region.
//!
//! [`LocalFocus`] answers "which element inside this root holds focus" with
//! no target registry, no preserve policy and no pointer tracking. Losses are
//! deferred to the next tick exactly like a [`FocusScope`](crate::FocusScope)
//! so focus moving between two children never reports an intermediate `None`.

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_focus_core::{ConnectionId, Signal};
use parking_lot::Mutex;

use crate::deferred::{DeferredResolution, Generation};
use crate::event::{FocusInEvent, FocusOutEvent};
use crate::host::{DeferredTask, Element, EventScheduler, FocusHost};

struct LocalState<E> {
    focused: Option<E>,
    deferred: DeferredResolution,
}

struct LocalInner<E: Element> {
    root: E,
    host: Arc<dyn FocusHost<E>>,
    scheduler: Arc<dyn EventScheduler>,
    state: Mutex<LocalState<E>>,
    changed: Signal<Option<E>>,
}

impl<E: Element> Drop for LocalInner<E> {
    fn drop(&mut self) {
        self.state.get_mut().deferred.cancel(&*self.scheduler);
    }
}

/// Tracks the focused element inside one root.
pub struct LocalFocus<E: Element> {
    inner: Arc<LocalInner<E>>,
}

impl<E: Element> Clone for LocalFocus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: Element> LocalFocus<E> {
    /// Track focus inside `root`.
    pub fn new(root: E, host: Arc<dyn FocusHost<E>>, scheduler: Arc<dyn EventScheduler>) -> Self {
        Self {
            inner: Arc::new(LocalInner {
                root,
                host,
                scheduler,
                state: Mutex::new(LocalState {
                    focused: None,
                    deferred: DeferredResolution::new(),
                }),
                changed: Signal::new(),
            }),
        }
    }

    /// The root element.
    pub fn root(&self) -> &E {
        &self.inner.root
    }

    /// The focused element inside the root, if any.
    pub fn focused(&self) -> Option<E> {
        self.inner.state.lock().focused.clone()
    }

    /// Whether anything inside the root holds focus.
    pub fn is_focused(&self) -> bool {
        self.inner.state.lock().focused.is_some()
    }

    /// Subscribe to changes of the focused element.
    pub fn subscribe<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Option<E>) + Send + Sync + 'static,
    {
        self.inner.changed.connect(slot)
    }

    /// Remove a subscription.
    pub fn unsubscribe(&self, id: ConnectionId) -> bool {
        self.inner.changed.disconnect(id)
    }

    /// Handle a capturing focus-in observed at the root.
    pub fn on_focus_in(&self, event: &FocusInEvent<E>) {
        let changed = {
            let mut state = self.inner.state.lock();
            state.deferred.cancel(&*self.inner.scheduler);
            Self::replace(&mut state, Some(event.target.clone()))
        };
        self.publish(changed);
    }

    /// Handle a capturing focus-out observed at the root.
    pub fn on_focus_out(&self, event: &FocusOutEvent<E>) {
        let changed = {
            let mut state = self.inner.state.lock();
            if state.focused.is_none() {
                return;
            }
            match &event.related {
                Some(related) if self.inner.host.contains(&self.inner.root, related) => {
                    state.deferred.cancel(&*self.inner.scheduler);
                    Self::replace(&mut state, Some(related.clone()))
                }
                _ => {
                    let local = Arc::downgrade(&self.inner);
                    state
                        .deferred
                        .schedule(&*self.inner.scheduler, move |generation| -> DeferredTask {
                            Box::new(move || Self::resolve_loss(&local, generation))
                        });
                    None
                }
            }
        };
        self.publish(changed);
    }

    fn resolve_loss(local: &Weak<LocalInner<E>>, generation: Generation) {
        let Some(inner) = local.upgrade() else {
            return;
        };
        let local = Self { inner };
        let changed = {
            let mut state = local.inner.state.lock();
            if !state.deferred.settle(generation) {
                return;
            }
            Self::replace(&mut state, None)
        };
        local.publish(changed);
    }

    /// Store `focused`. Returns the value to publish if it changed.
    fn replace(state: &mut LocalState<E>, focused: Option<E>) -> Option<Option<E>> {
        if state.focused == focused {
            return None;
        }
        state.focused = focused.clone();
        Some(focused)
    }

    fn publish(&self, changed: Option<Option<E>>) {
        if let Some(focused) = changed {
            tracing::trace!(target: "horizon_focus::local", root = ?self.inner.root, ?focused, "local focus changed");
            self.inner.changed.emit(focused);
        }
    }
}

impl<E: Element> fmt::Debug for LocalFocus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFocus")
            .field("root", &self.inner.root)
            .field("focused", &self.focused())
            .finish()
    }
}
