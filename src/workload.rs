//! # Workload Simulator
//! Deterministic CPU-bound stand-in for real frame work.
//!
//! Cost scales linearly with the load level: `load * 100_000` square-root
//! evaluations per call. Purely informational timing; no side effects beyond
//! burning CPU.

use std::hint::black_box;
use std::time::{Duration, Instant};

pub const MIN_LOAD: u8 = 1;
pub const MAX_LOAD: u8 = 5;

/// Compute-load level, always within `[MIN_LOAD, MAX_LOAD]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLevel(u8);

impl LoadLevel {
    /// Clamp an arbitrary integer into the valid range. Out-of-range input
    /// is a contract violation by the caller; we clamp rather than fail.
    pub fn new(n: i64) -> Self {
        Self(n.clamp(MIN_LOAD as i64, MAX_LOAD as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for LoadLevel {
    fn default() -> Self {
        Self(2)
    }
}

/// Run the simulated workload and return the elapsed wall time.
///
/// The accumulator goes through `black_box` so the optimizer cannot elide
/// the loop.
pub fn simulate(load: LoadLevel) -> Duration {
    let start = Instant::now();
    let iterations = load.get() as u64 * 100_000;
    let mut acc = 0.0f64;
    for i in 0..iterations {
        acc += (i as f64).sqrt();
    }
    black_box(acc);
    start.elapsed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_level_clamps_out_of_range() {
        assert_eq!(LoadLevel::new(10).get(), 5);
        assert_eq!(LoadLevel::new(0).get(), 1);
        assert_eq!(LoadLevel::new(-3).get(), 1);
        assert_eq!(LoadLevel::new(3).get(), 3);
    }

    #[test]
    fn simulate_terminates_and_measures() {
        let elapsed = simulate(LoadLevel::new(1));
        assert!(elapsed > Duration::ZERO);
    }

    #[test]
    fn simulate_scales_with_load() {
        // Statistical, not per-call: compare the cheapest against the most
        // expensive level over a few runs to ride out scheduler noise.
        let low: Duration = (0..5).map(|_| simulate(LoadLevel::new(1))).sum();
        let high: Duration = (0..5).map(|_| simulate(LoadLevel::new(5))).sum();
        assert!(high >= low, "load 5 ({high:?}) ran faster than load 1 ({low:?})");
    }
}
