use std::time::Instant;

/// Monotonic source of elapsed seconds since the clock was created.
///
/// Seconds are `f64` so frame-to-frame deltas stay resolvable on runs that
/// last for days.
pub trait Clock {
    /// Seconds elapsed. Never decreases between calls.
    fn elapsed_secs(&mut self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_secs(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Deterministic clock: the first read returns the start time (0 unless set),
/// each later read advances by a fixed delta. Used for headless runs and tests.
#[derive(Debug, Clone)]
pub struct SteppedClock {
    start: f64,
    delta: f64,
    reads: u64,
}

impl SteppedClock {
    /// Negative or non-finite deltas are treated as zero so time never runs
    /// backward.
    pub fn new(delta_secs: f64) -> Self {
        Self::starting_at(delta_secs, 0.0)
    }

    /// A clock whose first read is `start_secs`, as if it had already been
    /// running that long.
    pub fn starting_at(delta_secs: f64, start_secs: f64) -> Self {
        let non_negative = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            start: non_negative(start_secs),
            delta: non_negative(delta_secs),
            reads: 0,
        }
    }
}

impl Clock for SteppedClock {
    fn elapsed_secs(&mut self) -> f64 {
        let t = self.start + self.delta * self.reads as f64;
        self.reads += 1;
        t
    }
}
