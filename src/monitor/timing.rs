// src/monitor/timing.rs
// =============================================================================
// Randomized timing for the scheduler.
//
// Two places use jitter, and they treat it differently:
// - Poll delay: base + jitter, floored at 1 second (a zero or negative delay
//   would spin the loop)
// - Session renewal threshold: base + jitter, no floor or ceiling (see
//   fetch/session.rs)
//
// Both draw from a normal distribution with mean 0. The `Jitter` trait lets
// tests replace the random source with a fixed script of samples.
// =============================================================================

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

// Source of zero-mean jitter samples, in seconds
pub trait Jitter: Send {
    fn sample(&mut self, std_dev: f64) -> f64;
}

// Normal(0, std_dev) samples from a seedable RNG
pub struct GaussianJitter {
    rng: StdRng,
}

impl GaussianJitter {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Jitter for GaussianJitter {
    fn sample(&mut self, std_dev: f64) -> f64 {
        // Normal::new accepts a negative std dev (it mirrors the curve), so
        // anything outside [0, inf) is checked here and means no jitter
        if !(std_dev.is_finite() && std_dev >= 0.0) {
            return 0.0;
        }
        match Normal::new(0.0, std_dev) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => 0.0,
        }
    }
}

// Delay before the next poll: base + jitter, never below `floor`
pub fn poll_delay(base: Duration, jitter: f64, floor: Duration) -> Duration {
    let secs = (base.as_secs_f64() + jitter).max(floor.as_secs_f64());
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_secs(70);
    const FLOOR: Duration = Duration::from_secs(1);

    #[test]
    fn test_poll_delay_adds_jitter() {
        assert_eq!(poll_delay(BASE, 0.0, FLOOR), Duration::from_secs(70));
        assert_eq!(poll_delay(BASE, 5.5, FLOOR), Duration::from_secs_f64(75.5));
        assert_eq!(poll_delay(BASE, -20.0, FLOOR), Duration::from_secs(50));
    }

    #[test]
    fn test_poll_delay_floor() {
        assert_eq!(poll_delay(BASE, -69.5, FLOOR), Duration::from_secs(1));
        assert_eq!(poll_delay(BASE, -70.0, FLOOR), Duration::from_secs(1));
        assert_eq!(poll_delay(BASE, -1e9, FLOOR), Duration::from_secs(1));
        assert_eq!(poll_delay(BASE, f64::NEG_INFINITY, FLOOR), Duration::from_secs(1));
    }

    #[test]
    fn test_poll_delay_has_no_ceiling() {
        assert_eq!(poll_delay(BASE, 930.0, FLOOR), Duration::from_secs(1000));
        assert_eq!(poll_delay(BASE, f64::INFINITY, FLOOR), Duration::MAX);
    }

    #[test]
    fn test_poll_delay_floor_holds_for_real_samples() {
        // A huge std dev makes large negative samples common
        let mut jitter = GaussianJitter::seeded(7);
        for _ in 0..10_000 {
            let delay = poll_delay(BASE, jitter.sample(500.0), FLOOR);
            assert!(delay >= FLOOR);
        }
    }

    #[test]
    fn test_gaussian_jitter_is_centered() {
        let mut jitter = GaussianJitter::seeded(42);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| jitter.sample(20.0)).collect();

        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;

        assert!(mean.abs() < 1.0, "mean was {}", mean);
        assert!((var.sqrt() - 20.0).abs() < 1.0, "std dev was {}", var.sqrt());
    }

    #[test]
    fn test_zero_std_dev_gives_no_jitter() {
        let mut jitter = GaussianJitter::seeded(1);
        assert_eq!(jitter.sample(0.0), 0.0);
    }

    #[test]
    fn test_invalid_std_dev_falls_back_to_zero() {
        let mut jitter = GaussianJitter::seeded(1);
        for std_dev in [-3.0, -f64::MIN_POSITIVE, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(jitter.sample(std_dev), 0.0, "std dev {}", std_dev);
        }
        // Still a real sampler afterwards
        assert_ne!(jitter.sample(20.0), 0.0);
    }
}
