//! Next-tick deferred task queue.
//!
//! Tasks posted to a [`TickQueue`] run on the next call to
//! [`TickQueue::run_tick`], which a host drives once per frame (the
//! animation-frame equivalent) or from a zero-delay timer when no frame
//! callback exists. A task posted while a tick is running is deferred to the
//! following tick, so a task can never re-arm itself into an endless loop
//! within one tick.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::logging::{span_names, targets, PerfSpan};

/// A unique identifier for a deferred task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique task IDs.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

/// A boxed task closure.
pub type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

/// Internal task data.
struct TaskData {
    id: TaskId,
    task: BoxedTask,
}

/// A thread-safe queue of tasks waiting for the next tick.
pub struct TickQueue {
    tasks: Mutex<VecDeque<TaskData>>,
}

impl TickQueue {
    /// Create a new, empty queue.
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
        }
    }

    /// Post a task to run on the next tick.
    ///
    /// Returns the task ID that can be used to cancel the task.
    pub fn post<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        self.post_boxed(Box::new(task))
    }

    /// Post an already boxed task.
    pub fn post_boxed(&self, task: BoxedTask) -> TaskId {
        let id = next_task_id();
        self.tasks.lock().push_back(TaskData { id, task });
        tracing::trace!(target: targets::TICK, ?id, "task posted");
        id
    }

    /// Cancel a pending task.
    ///
    /// Returns `true` if the task was found and cancelled. Cancelling a task
    /// that already ran or was already cancelled returns `false`.
    pub fn cancel(&self, id: TaskId) -> bool {
        let mut tasks = self.tasks.lock();
        if let Some(pos) = tasks.iter().position(|t| t.id == id) {
            tasks.remove(pos);
            tracing::trace!(target: targets::TICK, ?id, "task cancelled");
            true
        } else {
            false
        }
    }

    /// Get the number of pending tasks.
    pub fn pending_count(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Run one tick: every task that was pending when the tick started.
    ///
    /// The queue lock is not held while tasks run, so tasks may post or
    /// cancel other tasks. Returns the number of tasks executed.
    pub fn run_tick(&self) -> usize {
        let _span = PerfSpan::new(span_names::TICK);
        let batch: Vec<TaskData> = self.tasks.lock().drain(..).collect();
        let count = batch.len();
        for task_data in batch {
            tracing::trace!(target: targets::TICK, id = ?task_data.id, "running task");
            (task_data.task)();
        }
        count
    }
}

impl Default for TickQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TickQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickQueue")
            .field("pending", &self.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_post_and_run() {
        let queue = TickQueue::new();
        let ran = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let ran = ran.clone();
            queue.post(move || ran.lock().push(i));
        }

        assert_eq!(queue.pending_count(), 3);
        assert_eq!(queue.run_tick(), 3);
        assert_eq!(queue.pending_count(), 0);
        assert_eq!(*ran.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let queue = TickQueue::new();
        let ran = Arc::new(Mutex::new(false));

        let ran_clone = ran.clone();
        let id = queue.post(move || *ran_clone.lock() = true);

        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert_eq!(queue.run_tick(), 0);
        assert!(!*ran.lock());
    }

    #[test]
    fn test_task_posted_during_tick_runs_next_tick() {
        let queue = Arc::new(TickQueue::new());
        let ran = Arc::new(Mutex::new(Vec::new()));

        let inner_queue = queue.clone();
        let ran_outer = ran.clone();
        queue.post(move || {
            ran_outer.lock().push("outer");
            let ran_inner = ran_outer.clone();
            inner_queue.post(move || ran_inner.lock().push("inner"));
        });

        assert_eq!(queue.run_tick(), 1);
        assert_eq!(*ran.lock(), vec!["outer"]);
        assert_eq!(queue.run_tick(), 1);
        assert_eq!(*ran.lock(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_task_ids_are_unique() {
        let queue = TickQueue::new();
        let a = queue.post(|| {});
        let b = queue.post(|| {});
        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
    }
}
