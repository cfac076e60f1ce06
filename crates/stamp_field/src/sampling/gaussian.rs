//! Truncated normal sampling via the Box–Muller transform.
use std::f64::consts::TAU;

use rand::RngCore;

use crate::sampling::rand01;

/// Normally distributed values clipped to `[min, max]` by rejection.
///
/// Box–Muller yields two independent deviates per pair of uniform draws. The second one is
/// kept and offered to the next call, so a sampler instance carries state between calls and
/// must not be shared across threads without its own exclusion. Give each execution context
/// its own instance.
///
/// Rejection is unbounded. When `[min, max]` lies many `sigma` away from `mu` the loop can spin
/// for a long time; callers choose ranges where acceptance is likely.
#[derive(Debug, Clone, Default)]
pub struct ConstrainedGaussianSampler {
    cached: Option<f64>,
}

impl ConstrainedGaussianSampler {
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// Returns `true` when the next call may be served from the cached deviate.
    pub fn has_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Drops the cached deviate.
    pub fn reset(&mut self) {
        self.cached = None;
    }

    /// Draw a value approximately `N(mu, sigma²)` restricted to `[min, max]`.
    ///
    /// A non-positive or non-finite `sigma` degenerates to `mu` clamped into range and
    /// consumes no randomness.
    pub fn sample(
        &mut self,
        rng: &mut dyn RngCore,
        mu: f64,
        sigma: f64,
        min: f64,
        max: f64,
    ) -> f64 {
        debug_assert!(min <= max, "empty sampling range [{min}, {max}]");

        if !(sigma.is_finite() && sigma > 0.0) {
            return mu.max(min).min(max);
        }

        if let Some(z) = self.cached.take() {
            let value = z * sigma + mu;
            if value >= min && value <= max {
                return value;
            }
        }

        loop {
            let (z0, z1) = box_muller(rng);
            let value = z0 * sigma + mu;
            if value >= min && value <= max {
                self.cached = Some(z1);
                return value;
            }
        }
    }
}

/// One pair of independent standard normal deviates.
fn box_muller(rng: &mut dyn RngCore) -> (f64, f64) {
    let (u1, u2) = loop {
        let u1 = rand01(rng);
        let u2 = rand01(rng);
        // ln(0) is undefined.
        if u1 > f64::MIN_POSITIVE {
            break (u1, u2);
        }
    };
    let radius = (-2.0 * u1.ln()).sqrt();
    let theta = TAU * u2;
    (radius * theta.cos(), radius * theta.sin())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::sampling::test_rng::{word_for, SequenceRng};

    #[test]
    fn samples_stay_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sampler = ConstrainedGaussianSampler::new();
        let cases = [
            (180.0, 5.0, 0.0, 360.0),
            (0.0, 50.0, 0.0, 360.0),
            (359.0, 1000.0, 0.0, 360.0),
            (10.0, 3.0, 9.0, 11.0),
            (-4.0, 2.0, -5.0, 5.0),
        ];
        for (mu, sigma, min, max) in cases {
            for _ in 0..10_000 {
                let x = sampler.sample(&mut rng, mu, sigma, min, max);
                assert!(
                    (min..=max).contains(&x),
                    "sample {x} out of [{min}, {max}] for mu={mu} sigma={sigma}"
                );
            }
        }
    }

    #[test]
    fn mean_and_spread_match_parameters_when_range_is_wide() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut sampler = ConstrainedGaussianSampler::new();
        let n = 20_000;
        let xs: Vec<f64> = (0..n)
            .map(|_| sampler.sample(&mut rng, 100.0, 4.0, 0.0, 200.0))
            .collect();
        let mean = xs.iter().sum::<f64>() / n as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 100.0).abs() < 0.2, "mean {mean}");
        assert!((var.sqrt() - 4.0).abs() < 0.2, "std {}", var.sqrt());
    }

    #[test]
    fn second_call_is_served_from_cache() {
        let mut rng = SequenceRng::new(vec![word_for(0.3), word_for(0.1), word_for(0.7)]);
        let mut sampler = ConstrainedGaussianSampler::new();

        sampler.sample(&mut rng, 0.0, 1.0, -100.0, 100.0);
        assert_eq!(rng.draws, 2);
        assert!(sampler.has_cached());

        sampler.sample(&mut rng, 0.0, 1.0, -100.0, 100.0);
        assert_eq!(rng.draws, 2);
        assert!(!sampler.has_cached());
    }

    #[test]
    fn cached_deviate_is_rescaled_by_the_next_call() {
        let mut rng = SequenceRng::new(vec![word_for(0.3), word_for(0.1)]);
        let mut sampler = ConstrainedGaussianSampler::new();
        sampler.sample(&mut rng, 0.0, 1.0, -100.0, 100.0);

        let radius = (-2.0 * 0.3f64.ln()).sqrt();
        let z1 = radius * (TAU * 0.1).sin();
        let x = sampler.sample(&mut rng, 50.0, 2.0, 0.0, 100.0);
        assert!((x - (z1 * 2.0 + 50.0)).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_cache_falls_through_to_fresh_draws() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut sampler = ConstrainedGaussianSampler::new();
        sampler.sample(&mut rng, 0.0, 1.0, -10.0, 10.0);
        assert!(sampler.has_cached());

        // A range no standard deviate near zero can satisfy once scaled.
        let x = sampler.sample(&mut rng, 0.0, 1.0, 0.5, 3.0);
        assert!((0.5..=3.0).contains(&x));
    }

    #[test]
    fn zero_uniform_is_redrawn_before_log() {
        let mut rng = SequenceRng::new(vec![0, word_for(0.5), word_for(0.4), word_for(0.25)]);
        let mut sampler = ConstrainedGaussianSampler::new();
        let x = sampler.sample(&mut rng, 0.0, 1.0, -10.0, 10.0);
        assert!(x.is_finite());
        assert_eq!(rng.draws, 4);
    }

    #[test]
    fn degenerate_sigma_returns_clamped_mean() {
        let mut rng = SequenceRng::new(vec![word_for(0.5)]);
        let mut sampler = ConstrainedGaussianSampler::new();
        assert_eq!(sampler.sample(&mut rng, 42.0, 0.0, 0.0, 360.0), 42.0);
        assert_eq!(sampler.sample(&mut rng, 400.0, 0.0, 0.0, 360.0), 360.0);
        assert_eq!(sampler.sample(&mut rng, 5.0, f64::NAN, 0.0, 360.0), 5.0);
        assert_eq!(rng.draws, 0);
    }
}
