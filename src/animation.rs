//! Frame-driven pulse clock for the targets layer.

use crate::schedule::{Scheduler, TaskId};

/// Monotonic frame counter. Never rewound, even across stop/start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct AnimationClock(pub u64);

impl AnimationClock {
    /// Pulse phase in `[0, 1]`.
    pub fn pulse(self, rate: f64) -> f64 {
        (self.0 as f64 * rate).sin() * 0.5 + 0.5
    }
}

/// Two states: idle (`pending == None`) and running (one frame in flight).
#[derive(Debug, Default)]
pub struct AnimationDriver {
    clock: AnimationClock,
    pending: Option<TaskId>,
}

impl AnimationDriver {
    pub fn clock(&self) -> AnimationClock {
        self.clock
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Begin running: tick once and request the next frame. Returns `false`
    /// without doing anything when already running. The caller renders on
    /// `true`.
    pub fn start(&mut self, scheduler: &mut impl Scheduler) -> bool {
        if self.is_running() {
            return false;
        }
        log::debug!("target pulse started at frame {}", self.clock.0);
        self.tick(scheduler);
        true
    }

    /// Handle a due frame. Returns whether `task` was ours, in which case the
    /// clock advanced and the caller renders.
    pub fn on_frame(&mut self, task: TaskId, scheduler: &mut impl Scheduler) -> bool {
        if self.pending != Some(task) {
            return false;
        }
        self.pending = None;
        self.tick(scheduler);
        true
    }

    /// Cancel the in-flight frame, then go idle. Safe to call when idle.
    pub fn stop(&mut self, scheduler: &mut impl Scheduler) {
        if let Some(task) = self.pending {
            scheduler.cancel(task);
            self.pending = None;
            log::debug!("target pulse stopped at frame {}", self.clock.0);
        }
    }

    fn tick(&mut self, scheduler: &mut impl Scheduler) {
        self.clock.0 += 1;
        self.pending = Some(scheduler.request_frame());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::schedule::ManualScheduler;

    #[test]
    fn start_is_guarded() {
        let mut sched = ManualScheduler::new(Duration::from_millis(16));
        let mut driver = AnimationDriver::default();
        assert!(driver.start(&mut sched));
        assert!(!driver.start(&mut sched));
        assert_eq!(sched.pending(), 1);
        assert_eq!(driver.clock(), AnimationClock(1));
    }

    #[test]
    fn stale_frames_are_ignored() {
        let mut sched = ManualScheduler::new(Duration::from_millis(16));
        let mut driver = AnimationDriver::default();
        driver.start(&mut sched);
        let first = sched.pop_due(Duration::from_millis(16)).unwrap();
        assert!(driver.on_frame(first, &mut sched));
        assert!(!driver.on_frame(first, &mut sched));
        assert_eq!(driver.clock(), AnimationClock(2));
    }

    #[test]
    fn stop_twice_is_a_no_op() {
        let mut sched = ManualScheduler::new(Duration::from_millis(16));
        let mut driver = AnimationDriver::default();
        driver.stop(&mut sched);
        driver.start(&mut sched);
        driver.stop(&mut sched);
        driver.stop(&mut sched);
        assert!(!driver.is_running());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn pulse_stays_in_unit_range() {
        for frame in 0..500 {
            let p = AnimationClock(frame).pulse(0.04);
            assert!((0.0..=1.0).contains(&p));
        }
    }
}
