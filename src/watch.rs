//! Resize watcher — bridges terminal resize events to auto-size updates.
//!
//! The event loop owns the lifecycle: `start()` takes the initial
//! measurement, `trigger()` re-probes on each resize event, and `stop()`
//! deactivates permanently. A trigger that was already in flight when the
//! view tears down therefore performs no computation.

use log::debug;

use crate::probe::{Measure, SizeRule};
use crate::size_mode::SizeModeController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Active,
    Stopped,
}

pub struct ResizeWatcher<M: Measure> {
    measure: M,
    rule: SizeRule,
    phase: Phase,
}

impl<M: Measure> ResizeWatcher<M> {
    pub fn new(measure: M, rule: SizeRule) -> Self {
        Self { measure, rule, phase: Phase::Created }
    }

    /// Activate and take the initial measurement. Idempotent; a stopped
    /// watcher stays stopped.
    pub fn start(&mut self, sizes: &mut SizeModeController) {
        if self.phase == Phase::Stopped {
            return;
        }
        self.phase = Phase::Active;
        self.trigger(sizes);
    }

    /// Re-probe and push the result into the auto-size slot only.
    ///
    /// No-op before `start()` or after `stop()`. An unavailable measurement
    /// leaves the prior size unchanged — a zero size is never propagated.
    pub fn trigger(&mut self, sizes: &mut SizeModeController) {
        if self.phase != Phase::Active {
            return;
        }
        match self.measure.measure() {
            Some(snap) => {
                let size = self.rule.size_for(snap);
                debug!("resize: {snap:?} -> {size}px");
                sizes.set_auto_size(size);
            }
            None => debug!("resize: measurement unavailable, keeping prior size"),
        }
    }

    /// Deactivate permanently.
    pub fn stop(&mut self) {
        self.phase = Phase::Stopped;
    }
}
