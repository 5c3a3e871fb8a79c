//! Capabilities the host UI runtime provides to the engine.
//!
//! The engine never walks an element tree or owns a timer. It asks the host
//! two questions through [`FocusHost`] (does this element contain that one,
//! and please move real focus here) and hands deferred work and one-shot
//! document listeners to an [`EventScheduler`].
//!
//! [`FrameScheduler`] is the reference scheduler: the host pumps it once per
//! frame with [`FrameScheduler::run_tick`] and forwards every document-level
//! pointer release to [`FrameScheduler::dispatch_pointer_up`]. Headless tests
//! drive the same two calls by hand.

use std::fmt;
use std::hash::Hash;

use horizon_focus_core::{ListenerId, OnceListeners, TaskId, TickQueue};

/// Bound for opaque element handles.
///
/// The engine compares, hashes and clones handles but never dereferences
/// them. Anything from a node index to an `Arc` of a platform object works.
pub trait Element: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> Element for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// Element-tree capabilities supplied by the host.
pub trait FocusHost<E>: Send + Sync {
    /// Whether `node` lies within the subtree rooted at `ancestor`.
    ///
    /// Containment is inclusive: an element contains itself.
    fn contains(&self, ancestor: &E, node: &E) -> bool;

    /// Synchronously move real input focus to `element`.
    ///
    /// Hosts whose focus change dispatches focus events synchronously may
    /// re-enter the scope from inside this call.
    fn focus(&self, element: &E);
}

/// A deferred task handed to an [`EventScheduler`].
pub type DeferredTask = Box<dyn FnOnce() + Send + 'static>;

/// A one-shot pointer-up listener handed to an [`EventScheduler`].
pub type PointerUpListener = Box<dyn FnOnce() + Send + 'static>;

/// Event-scheduling collaborator.
pub trait EventScheduler: Send + Sync {
    /// Run `task` on the next suitable tick.
    fn schedule(&self, task: DeferredTask) -> TaskId;

    /// Cancel a scheduled task. Returns `false` if it already ran or was
    /// already cancelled.
    fn cancel(&self, id: TaskId) -> bool;

    /// Invoke `listener` on the next pointer-up anywhere in the document.
    fn listen_pointer_up_once(&self, listener: PointerUpListener) -> ListenerId;

    /// Remove a pointer-up listener that has not fired yet.
    fn remove_pointer_up_listener(&self, id: ListenerId) -> bool;
}

/// Reference [`EventScheduler`] driven explicitly by the host.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    ticks: TickQueue,
    pointer_up: OnceListeners<()>,
}

impl FrameScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every task scheduled before this call. Returns how many ran.
    pub fn run_tick(&self) -> usize {
        self.ticks.run_tick()
    }

    /// Deliver a document-level pointer-up. Returns how many listeners fired.
    pub fn dispatch_pointer_up(&self) -> usize {
        self.pointer_up.dispatch(&())
    }

    /// Number of deferred tasks waiting for the next tick.
    pub fn pending_tasks(&self) -> usize {
        self.ticks.pending_count()
    }

    /// Number of armed pointer-up listeners.
    pub fn armed_listeners(&self) -> usize {
        self.pointer_up.len()
    }
}

impl EventScheduler for FrameScheduler {
    fn schedule(&self, task: DeferredTask) -> TaskId {
        self.ticks.post_boxed(task)
    }

    fn cancel(&self, id: TaskId) -> bool {
        self.ticks.cancel(id)
    }

    fn listen_pointer_up_once(&self, listener: PointerUpListener) -> ListenerId {
        self.pointer_up.listen(move |_: &()| listener())
    }

    fn remove_pointer_up_listener(&self, id: ListenerId) -> bool {
        self.pointer_up.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_frame_scheduler_runs_and_cancels() {
        let scheduler = FrameScheduler::new();
        let ran = Arc::new(Mutex::new(0));

        let ran_a = ran.clone();
        scheduler.schedule(Box::new(move || *ran_a.lock() += 1));
        let ran_b = ran.clone();
        let cancelled = scheduler.schedule(Box::new(move || *ran_b.lock() += 10));

        assert!(scheduler.cancel(cancelled));
        assert_eq!(scheduler.pending_tasks(), 1);
        assert_eq!(scheduler.run_tick(), 1);
        assert_eq!(*ran.lock(), 1);
    }

    #[test]
    fn test_pointer_up_listener_fires_once() {
        let scheduler = FrameScheduler::new();
        let fired = Arc::new(Mutex::new(0));

        let fired_clone = fired.clone();
        scheduler.listen_pointer_up_once(Box::new(move || *fired_clone.lock() += 1));
        assert_eq!(scheduler.armed_listeners(), 1);

        assert_eq!(scheduler.dispatch_pointer_up(), 1);
        assert_eq!(scheduler.dispatch_pointer_up(), 0);
        assert_eq!(*fired.lock(), 1);
    }

    #[test]
    fn test_removed_pointer_up_listener() {
        let scheduler = FrameScheduler::new();
        let id = scheduler.listen_pointer_up_once(Box::new(|| {}));
        assert!(scheduler.remove_pointer_up_listener(id));
        assert!(!scheduler.remove_pointer_up_listener(id));
        assert_eq!(scheduler.dispatch_pointer_up(), 0);
    }
}
