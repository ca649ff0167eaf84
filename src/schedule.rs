//! One-shot scheduled callbacks: "next display frame" and "after a delay".
//!
//! Schedulers never call into the engine themselves. They hand out a
//! [`TaskId`] and, when the task comes due, the host passes that id back to
//! [`crate::GisDemo::on_task`]. The engine only acts on ids it is still
//! waiting for, so a cancelled or superseded task can never run twice.

use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

pub trait Scheduler {
    /// Run once on the next display refresh.
    fn request_frame(&mut self) -> TaskId;

    /// Run once after `delay`.
    fn set_timeout(&mut self, delay: Duration) -> TaskId;

    /// Drop a pending task. Unknown or already-fired ids are ignored.
    fn cancel(&mut self, task: TaskId);
}

/// Fake clock for headless hosts and tests. Frames come due every
/// `frame_interval`; nothing fires until the owner advances time.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    now: Duration,
    frame_interval: Duration,
    next_id: u64,
    /// Keyed by (deadline, id) so equal deadlines fire in scheduling order.
    pending: BTreeMap<(Duration, TaskId), TaskKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Frame,
    Timeout,
}

impl ManualScheduler {
    pub fn new(frame_interval: Duration) -> Self {
        Self { now: Duration::ZERO, frame_interval, next_id: 0, pending: BTreeMap::new() }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_of(&self, kind: TaskKind) -> usize {
        self.pending.values().filter(|&&k| k == kind).count()
    }

    /// Remove and return the earliest task due at or before `until`, moving
    /// the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<TaskId> {
        let (&(deadline, id), _) = self.pending.first_key_value()?;
        if deadline > until {
            return None;
        }
        self.pending.remove(&(deadline, id));
        self.now = self.now.max(deadline);
        Some(id)
    }

    /// Move the clock forward without running anything.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    fn push(&mut self, delay: Duration, kind: TaskKind) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.pending.insert((self.now + delay, id), kind);
        id
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&mut self) -> TaskId {
        self.push(self.frame_interval, TaskKind::Frame)
    }

    fn set_timeout(&mut self, delay: Duration) -> TaskId {
        self.push(delay, TaskKind::Timeout)
    }

    fn cancel(&mut self, task: TaskId) {
        self.pending.retain(|&(_, id), _| id != task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_fire_in_deadline_order() {
        let mut s = ManualScheduler::new(Duration::from_millis(16));
        let late = s.set_timeout(Duration::from_millis(100));
        let frame = s.request_frame();
        let early = s.set_timeout(Duration::from_millis(5));

        let until = Duration::from_millis(200);
        assert_eq!(s.pop_due(until), Some(early));
        assert_eq!(s.pop_due(until), Some(frame));
        assert_eq!(s.now(), Duration::from_millis(16));
        assert_eq!(s.pop_due(until), Some(late));
        assert_eq!(s.pop_due(until), None);
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut s = ManualScheduler::new(Duration::from_millis(16));
        let id = s.set_timeout(Duration::from_millis(10));
        s.cancel(id);
        s.cancel(id);
        assert_eq!(s.pending(), 0);
        assert_eq!(s.pop_due(Duration::from_secs(1)), None);
    }

    #[test]
    fn nothing_fires_before_its_deadline() {
        let mut s = ManualScheduler::new(Duration::from_millis(16));
        s.set_timeout(Duration::from_millis(50));
        assert_eq!(s.pop_due(Duration::from_millis(49)), None);
        assert_eq!(s.pending_of(TaskKind::Timeout), 1);
    }
}
