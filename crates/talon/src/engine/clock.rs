use std::time::Instant;

/// The engine's frame time source.
///
/// Wraps a monotonic [`Instant`] and hands out `(now, dt)` pairs in f64
/// seconds, one per frame. A fixed-step clock ignores the wall clock
/// entirely, which makes headless runs deterministic.
#[derive(Debug)]
pub struct FrameClock {
    started: Instant,
    last: Instant,
    now: f64,
    fixed_step: Option<f64>,
}

impl FrameClock {
    /// A clock following real wall time.
    pub fn new() -> Self {
        let started = Instant::now();
        Self {
            started,
            last: started,
            now: 0.0,
            fixed_step: None,
        }
    }

    /// A clock advancing by exactly `step` seconds per tick.
    pub fn fixed(step: f64) -> Self {
        let mut clock = Self::new();
        clock.fixed_step = Some(step);
        clock
    }

    /// Current frame time in seconds since the clock was created.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed_step.is_some()
    }

    /// Advances to the next frame, returning `(now, dt)`.
    pub fn tick(&mut self) -> (f64, f64) {
        match self.fixed_step {
            Some(step) => {
                self.now += step;
                (self.now, step)
            }
            None => {
                let instant = Instant::now();
                let dt = (instant - self.last).as_secs_f64();
                self.last = instant;
                self.now = (instant - self.started).as_secs_f64();
                (self.now, dt)
            }
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_deterministic() {
        let mut clock = FrameClock::fixed(0.25);
        assert_eq!(clock.now(), 0.0);
        assert_eq!(clock.tick(), (0.25, 0.25));
        assert_eq!(clock.tick(), (0.5, 0.25));
        assert_eq!(clock.now(), 0.5);
    }

    #[test]
    fn wall_clock_never_goes_backwards() {
        let mut clock = FrameClock::new();
        let (t1, dt1) = clock.tick();
        let (t2, dt2) = clock.tick();
        assert!(t2 >= t1);
        assert!(dt1 >= 0.0 && dt2 >= 0.0);
    }
}
