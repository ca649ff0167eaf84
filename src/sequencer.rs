//! Timer-driven auto demo: switch layers on one at a time, hold, reset.

use std::time::Duration;

use crate::layers::LayerKind;
use crate::schedule::{Scheduler, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequencerState {
    #[default]
    Stopped,
    /// `next` is the draw-order index enabled by the next step.
    Sequencing { next: usize },
    /// Every layer is on; waiting out the dwell before resetting.
    Holding,
}

/// What the owner must do after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Enable(LayerKind),
    Hold,
    Finished,
}

#[derive(Debug)]
pub struct Sequencer {
    state: SequencerState,
    pending: Option<TaskId>,
    interval: Duration,
    dwell: Duration,
}

impl Sequencer {
    pub fn new(interval: Duration, dwell: Duration) -> Self {
        Self { state: SequencerState::Stopped, pending: None, interval, dwell }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != SequencerState::Stopped
    }

    /// Arm the sequence at the first layer. Returns `false` if already
    /// running. The owner resets the scene and then calls [`Sequencer::step`].
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = SequencerState::Sequencing { next: 0 };
        true
    }

    /// Perform the current step and schedule the next one.
    pub fn step(&mut self, scheduler: &mut impl Scheduler) -> Option<Cue> {
        let cue = match self.state {
            SequencerState::Stopped => return None,
            SequencerState::Sequencing { next } if next < LayerKind::ALL.len() => {
                self.state = SequencerState::Sequencing { next: next + 1 };
                self.pending = Some(scheduler.set_timeout(self.interval));
                Cue::Enable(LayerKind::ALL[next])
            }
            SequencerState::Sequencing { .. } => {
                self.state = SequencerState::Holding;
                self.pending = Some(scheduler.set_timeout(self.dwell));
                Cue::Hold
            }
            SequencerState::Holding => {
                self.state = SequencerState::Stopped;
                Cue::Finished
            }
        };
        log::info!("auto demo: {cue:?}");
        Some(cue)
    }

    /// Handle a due timer; `None` unless `task` is the one we armed.
    pub fn on_timer(&mut self, task: TaskId, scheduler: &mut impl Scheduler) -> Option<Cue> {
        if self.pending != Some(task) {
            return None;
        }
        self.pending = None;
        self.step(scheduler)
    }

    /// Cancel the armed timer, then stop. Safe to call when stopped.
    pub fn stop(&mut self, scheduler: &mut impl Scheduler) {
        if let Some(task) = self.pending {
            scheduler.cancel(task);
            self.pending = None;
        }
        if self.state != SequencerState::Stopped {
            log::info!("auto demo stopped");
            self.state = SequencerState::Stopped;
        }
    }
}
