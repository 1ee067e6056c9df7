//! Capabilities for the external game loop.
//!
//! The engine never starts or owns a clock. A driver hands it a
//! [`SchedulerHandle`] so that `stop()` can halt the loop, and feeds it
//! times from a [`TickSource`].

/// Handle to an externally running scheduler.
pub trait SchedulerHandle: Send {
    fn halt(&mut self);
}

/// Produces successive `update` times in ms. `None` ends the run.
pub trait TickSource {
    fn next_tick(&mut self) -> Option<f64>;
}

/// Ticks at `start, start + step, ...` up to and including `end`.
#[derive(Debug, Clone)]
pub struct FixedStepTicker {
    start: f64,
    step: f64,
    end: f64,
    index: u64,
    halted: bool,
}

impl FixedStepTicker {
    /// A non-positive or non-finite `step` yields an empty ticker.
    pub fn new(start: f64, step: f64, end: f64) -> Self {
        let valid = step.is_finite() && step > 0.0 && start.is_finite() && end.is_finite();
        Self {
            start,
            step,
            end,
            index: 0,
            halted: !valid,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

impl TickSource for FixedStepTicker {
    fn next_tick(&mut self) -> Option<f64> {
        if self.halted {
            return None;
        }
        // Multiply rather than accumulate so long runs do not drift.
        let t = self.start + self.index as f64 * self.step;
        if t > self.end {
            self.halted = true;
            return None;
        }
        self.index += 1;
        Some(t)
    }
}

impl SchedulerHandle for FixedStepTicker {
    fn halt(&mut self) {
        self.halted = true;
    }
}

impl Iterator for FixedStepTicker {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.next_tick()
    }
}
