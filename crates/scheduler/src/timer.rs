use std::time::Duration;

use geosphere_kernel::physics::TransitionCounts;

/// Ring buffer of recent scheduler call durations.
#[derive(Debug)]
pub struct CallTimer {
    history: Vec<Duration>,
    index: usize,
    filled: bool,
}

impl CallTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: vec![Duration::ZERO; capacity.max(1)],
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.history.len();
        if self.index == 0 {
            self.filled = true;
        }
    }

    fn recorded(&self) -> &[Duration] {
        if self.filled {
            &self.history
        } else {
            &self.history[..self.index]
        }
    }

    pub fn average(&self) -> Duration {
        let recorded = self.recorded();
        if recorded.is_empty() {
            return Duration::ZERO;
        }
        recorded.iter().sum::<Duration>() / recorded.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.recorded().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn count(&self) -> usize {
        self.recorded().len()
    }
}

/// Scheduler counters, refreshed after every call.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStats {
    pub calls: u64,
    pub cycles_completed: u64,
    /// Calls spent on the cycle in progress.
    pub calls_this_cycle: usize,
    /// Calls the last completed cycle took.
    pub last_cycle_calls: usize,
    pub average_call: Duration,
    pub max_call: Duration,
    /// Phase transitions during the last completed cycle.
    pub last_cycle_transitions: TransitionCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_timer_tracks_history() {
        let mut timer = CallTimer::new(3);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30));
        assert_eq!(timer.count(), 3);
        assert_eq!(timer.average(), Duration::from_millis(20));
        assert_eq!(timer.max(), Duration::from_millis(30));
    }

    #[test]
    fn call_timer_wraps_around() {
        let mut timer = CallTimer::new(2);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30)); // overwrites first
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.average(), Duration::from_millis(25));
    }

    #[test]
    fn empty_timer_is_zero() {
        let timer = CallTimer::new(0);
        assert_eq!(timer.average(), Duration::ZERO);
        assert_eq!(timer.max(), Duration::ZERO);
    }
}
