//! Cooperative periodic task scheduler
//!
//! Time is virtual milliseconds advanced by the caller, so rounds replay
//! identically in tests. Tasks due at the same instant fire in
//! registration order.

use serde::{Deserialize, Serialize};

/// Most firings of one task per `advance_to`. A longer stall skips the
/// backlog instead of replaying it.
pub const MAX_BURST: u32 = 10_000;

/// Handle to a scheduled periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(u32);

#[derive(Debug, Clone)]
struct PeriodicTask {
    handle: TaskHandle,
    period_ms: u64,
    /// `None` once the next firing would pass the end of the clock
    next_due_ms: Option<u64>,
    /// Firings since the last `advance_to`
    burst: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    /// Active tasks, kept in registration order
    tasks: Vec<PeriodicTask>,
    next_id: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Register a task firing every `period_ms`, first at `now + period_ms`
    pub fn schedule_every(&mut self, period_ms: u64) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        let period_ms = period_ms.max(1);
        self.tasks.push(PeriodicTask {
            handle,
            period_ms,
            next_due_ms: self.now_ms.checked_add(period_ms),
            burst: 0,
        });
        handle
    }

    /// Change a task's period; the next firing is one new period from now.
    /// Returns false if the task is not active.
    pub fn reschedule(&mut self, handle: TaskHandle, period_ms: u64) -> bool {
        let now = self.now_ms;
        match self.tasks.iter_mut().find(|t| t.handle == handle) {
            Some(task) => {
                task.period_ms = period_ms.max(1);
                task.next_due_ms = now.checked_add(task.period_ms);
                true
            }
            None => false,
        }
    }

    /// Cancel a task. Returns false if it was not active.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        self.tasks.len() != before
    }

    /// Cancel several tasks in one call; none of them fires afterwards
    pub fn cancel_all(&mut self, handles: &[TaskHandle]) {
        self.tasks.retain(|t| !handles.contains(&t.handle));
    }

    pub fn is_active(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    pub fn period_ms(&self, handle: TaskHandle) -> Option<u64> {
        self.tasks
            .iter()
            .find(|t| t.handle == handle)
            .map(|t| t.period_ms)
    }

    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    /// Pop the earliest task due at or before `until_ms`, moving the clock
    /// to its due time and queueing its next firing.
    ///
    /// Call repeatedly until `None`, then `advance_to(until_ms)`. Cancelling
    /// between calls is honoured immediately.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TaskHandle> {
        loop {
            let task = self
                .tasks
                .iter_mut()
                .filter(|t| t.next_due_ms.is_some_and(|due| due <= until_ms))
                // min_by_key keeps the first of equal keys, i.e. registration order
                .min_by_key(|t| t.next_due_ms)?;
            let due = task.next_due_ms?;

            if task.burst >= MAX_BURST {
                // Jump to the first firing after `until_ms`
                let missed = (until_ms - due) / task.period_ms + 1;
                task.next_due_ms = missed
                    .checked_mul(task.period_ms)
                    .and_then(|skip| due.checked_add(skip));
                log::warn!("{:?} skipped {} late firings", task.handle, missed);
                continue;
            }

            task.burst += 1;
            self.now_ms = self.now_ms.max(due);
            task.next_due_ms = due.checked_add(task.period_ms);
            return Some(task.handle);
        }
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
        for task in &mut self.tasks {
            task.burst = 0;
        }
    }
}
