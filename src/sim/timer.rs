//! Accumulate-and-step timing
//!
//! Every moving thing on the grid advances in whole steps of a fixed interval. The timer
//! counts how many intervals fit into the time since the last processed batch and then
//! restarts from the current timestamp, so the sub-step remainder is discarded. At the
//! frame rates involved this drift is invisible, and it keeps step counts simple.

/// Fixed-interval step counter driven by frame timestamps (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepTimer {
    interval: f64,
    last: f64,
}

impl StepTimer {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            last: 0.0,
        }
    }

    /// Timer whose baseline is already set
    pub fn starting_at(interval: f64, now: f64) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    #[inline]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn set_interval(&mut self, interval: f64) {
        self.interval = interval;
    }

    /// Timestamp of the last processed batch
    #[inline]
    pub fn last(&self) -> f64 {
        self.last
    }

    /// Set the baseline without processing a batch
    pub fn reset(&mut self, now: f64) {
        self.last = now;
    }

    /// Time since the last processed batch
    #[inline]
    pub fn elapsed(&self, now: f64) -> f64 {
        now - self.last
    }

    /// Whole steps elapsed. Restarts from `now` when at least one step is returned.
    pub fn poll(&mut self, now: f64) -> u32 {
        let delta = self.elapsed(now);
        if self.interval <= 0.0 || delta < self.interval {
            return 0;
        }
        self.last = now;
        (delta / self.interval).floor() as u32
    }

    /// Fractional step count, for integrators that want the exact ratio
    pub fn poll_fraction(&mut self, now: f64) -> Option<f64> {
        let delta = self.elapsed(now);
        if self.interval <= 0.0 || delta < self.interval {
            return None;
        }
        self.last = now;
        Some(delta / self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_discards_remainder() {
        let mut timer = StepTimer::starting_at(100.0, 0.0);
        assert_eq!(timer.poll(99.0), 0);
        assert_eq!(timer.last(), 0.0);

        assert_eq!(timer.poll(250.0), 2);
        assert_eq!(timer.last(), 250.0);

        // The 50ms remainder is gone
        assert_eq!(timer.poll(340.0), 0);
        assert_eq!(timer.poll(350.0), 1);
    }

    #[test]
    fn test_zero_interval_never_steps() {
        let mut timer = StepTimer::new(0.0);
        assert_eq!(timer.poll(1000.0), 0);
        assert_eq!(timer.poll_fraction(1000.0), None);
    }

    #[test]
    fn test_poll_fraction() {
        let mut timer = StepTimer::starting_at(10.0, 0.0);
        assert_eq!(timer.poll_fraction(5.0), None);
        assert_eq!(timer.poll_fraction(25.0), Some(2.5));
        assert_eq!(timer.last(), 25.0);
    }
}
