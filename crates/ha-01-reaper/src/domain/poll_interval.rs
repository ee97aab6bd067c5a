//! Poll interval ramp for the duplicate-service loop
//!
//! Starts at the schedule's initial delay and grows by `factor` after every
//! tick, success or failure, until it reaches the ceiling. It is never reset.

use std::time::Duration;

use crate::config::PollSchedule;

/// Monotonically growing delay sequence.
#[derive(Debug, Clone)]
pub struct PollInterval {
    schedule: PollSchedule,
    current: Duration,
}

impl PollInterval {
    pub fn new(schedule: PollSchedule) -> Self {
        let current = schedule.initial.min(schedule.ceiling);
        Self { schedule, current }
    }

    /// Delay to sleep after the tick that just ran; advances the ramp.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = if self.at_ceiling() {
            self.schedule.ceiling
        } else {
            // Saturates at the ceiling when the product overflows.
            Duration::try_from_secs_f64(self.current.as_secs_f64() * self.schedule.factor)
                .map_or(self.schedule.ceiling, |next| next.min(self.schedule.ceiling))
        };
        delay
    }

    pub fn at_ceiling(&self) -> bool {
        self.current >= self.schedule.ceiling
    }
}

impl Iterator for PollInterval {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}
