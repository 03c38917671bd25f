//! Fixed-step loop driver
//!
//! Accumulates wall-clock frame time and runs whole simulation steps at a
//! fixed rate. Whatever is left over is handed back for render interpolation.

use crate::consts::{MAX_FRAME_DELTA, STEP};

/// Accumulator-based fixed timestep driver
#[derive(Debug, Clone)]
pub struct FixedStepLoop {
    step: f32,
    accumulator: f64,
    ticks: u64,
}

impl Default for FixedStepLoop {
    fn default() -> Self {
        Self::new(STEP)
    }
}

impl FixedStepLoop {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
            ticks: 0,
        }
    }

    /// Fixed step size in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Number of steps run since creation or the last reset
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Unconsumed time in seconds (always `< step`)
    pub fn remainder(&self) -> f32 {
        self.accumulator as f32
    }

    /// Feed one frame's worth of wall-clock time.
    ///
    /// `update` runs once per whole step with `(tick, step)` and returns
    /// whether to keep going. Once it returns `false` the whole steps still
    /// owed are dropped and not counted. Returns the leftover time for
    /// interpolation.
    pub fn advance<F>(&mut self, frame_dt: f64, mut update: F) -> f32
    where
        F: FnMut(u64, f32) -> bool,
    {
        // NaN from a broken host clock counts as no time at all
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DELTA)
        } else {
            0.0
        };
        self.accumulator += frame_dt;

        let step = self.step as f64;
        while self.accumulator >= step {
            self.accumulator -= step;
            let running = update(self.ticks, self.step);
            self.ticks += 1;
            if !running {
                self.accumulator %= step;
                break;
            }
        }

        self.remainder()
    }

    /// Drop accumulated time and restart the tick counter
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_whole_steps_only() {
        let mut clock = FixedStepLoop::default();
        let mut runs = 0;
        let rem = clock.advance(2.5 / 60.0, |_, step| {
            assert_eq!(step, STEP);
            runs += 1;
            true
        });
        assert_eq!(runs, 2);
        assert!(rem >= 0.0 && rem < STEP);
        assert!((rem - 0.5 / 60.0).abs() < 1e-5);
    }

    #[test]
    fn test_remainder_carries_over() {
        let mut clock = FixedStepLoop::default();
        let mut runs = 0;
        for _ in 0..4 {
            clock.advance(0.5 / 60.0 + 1e-7, |_, _| {
                runs += 1;
                true
            });
        }
        assert_eq!(runs, 2);
        assert_eq!(clock.ticks(), 2);
    }

    #[test]
    fn test_clamps_long_pauses() {
        let mut clock = FixedStepLoop::default();
        let mut runs = 0;
        clock.advance(30.0, |_, _| {
            runs += 1;
            true
        });
        assert!(runs <= 60);
        assert!(runs >= 59);
    }

    #[test]
    fn test_ignores_bad_deltas() {
        let mut clock = FixedStepLoop::default();
        let mut runs = 0;
        let mut count = |_: u64, _: f32| {
            runs += 1;
            true
        };
        clock.advance(f64::NAN, &mut count);
        clock.advance(-1.0, &mut count);
        assert_eq!(runs, 0);
        assert_eq!(clock.remainder(), 0.0);
    }

    #[test]
    fn test_ticks_passed_in_order() {
        let mut clock = FixedStepLoop::default();
        let mut seen = Vec::new();
        clock.advance(3.0 / 60.0 + 1e-6, |tick, _| {
            seen.push(tick);
            true
        });
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_stopping_drops_owed_steps() {
        let mut clock = FixedStepLoop::default();
        let mut seen = Vec::new();
        let rem = clock.advance(5.5 / 60.0, |tick, _| {
            seen.push(tick);
            tick < 1
        });
        assert_eq!(seen, vec![0, 1]);
        assert_eq!(clock.ticks(), 2);
        assert!(rem >= 0.0 && rem < STEP);
        assert!((rem - 0.5 / 60.0).abs() < 1e-5);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut clock = FixedStepLoop::default();
        clock.advance(0.1, |_, _| true);
        clock.reset();
        assert_eq!(clock.ticks(), 0);
        assert_eq!(clock.remainder(), 0.0);
    }
}
