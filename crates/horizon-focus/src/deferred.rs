//! Single-flight deferred resolution.
//!
//! A scope may have at most one "declare focus lost" task in flight.
//! Scheduling a new task cancels the previous one, and cancellation is
//! idempotent. Each scheduled task carries a generation number; the task must
//! call [`DeferredResolution::settle`] with it before acting, which rejects
//! tasks that were superseded after the scheduler had already dequeued them.

use horizon_focus_core::TaskId;

use crate::host::{DeferredTask, EventScheduler};

/// Generation number handed to a scheduled task.
pub type Generation = u64;

/// Cancelable single-pending-task slot.
#[derive(Debug, Default)]
pub struct DeferredResolution {
    pending: Option<(TaskId, Generation)>,
    generation: Generation,
}

impl DeferredResolution {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending task, then schedule the task built by `make_task`.
    ///
    /// `make_task` receives the generation the task must later pass to
    /// [`settle`](Self::settle).
    pub fn schedule<S, F>(&mut self, scheduler: &S, make_task: F) -> Generation
    where
        S: EventScheduler + ?Sized,
        F: FnOnce(Generation) -> DeferredTask,
    {
        self.cancel(scheduler);
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let id = scheduler.schedule(make_task(generation));
        self.pending = Some((id, generation));
        generation
    }

    /// Cancel the pending task, if any. Returns whether one was pending.
    pub fn cancel<S>(&mut self, scheduler: &S) -> bool
    where
        S: EventScheduler + ?Sized,
    {
        match self.pending.take() {
            Some((id, _)) => {
                scheduler.cancel(id);
                true
            }
            None => false,
        }
    }

    /// Whether a task is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Claim the pending slot for the task of `generation`.
    ///
    /// Returns `true` and clears the slot if `generation` is the pending
    /// task; returns `false` for a stale or cancelled task.
    pub fn settle(&mut self, generation: Generation) -> bool {
        match self.pending {
            Some((_, pending)) if pending == generation => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FrameScheduler;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_schedule_replaces_pending_task() {
        let scheduler = FrameScheduler::new();
        let mut deferred = DeferredResolution::new();
        let fired = Arc::new(Mutex::new(Vec::new()));

        for _ in 0..3 {
            let fired = fired.clone();
            deferred.schedule(&scheduler, move |generation| {
                Box::new(move || fired.lock().push(generation))
            });
            assert_eq!(scheduler.pending_tasks(), 1);
        }

        scheduler.run_tick();
        assert_eq!(*fired.lock(), vec![3]);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let scheduler = FrameScheduler::new();
        let mut deferred = DeferredResolution::new();
        deferred.schedule(&scheduler, |_| Box::new(|| {}));

        assert!(deferred.cancel(&scheduler));
        assert!(!deferred.cancel(&scheduler));
        assert!(!deferred.is_pending());
        assert_eq!(scheduler.pending_tasks(), 0);
    }

    #[test]
    fn test_settle_rejects_stale_generation() {
        let scheduler = FrameScheduler::new();
        let mut deferred = DeferredResolution::new();
        let first = deferred.schedule(&scheduler, |_| Box::new(|| {}));
        let second = deferred.schedule(&scheduler, |_| Box::new(|| {}));

        assert!(!deferred.settle(first));
        assert!(deferred.settle(second));
        assert!(!deferred.settle(second));
    }
}
