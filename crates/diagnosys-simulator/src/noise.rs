//! Bounded random draws shared by the asset physics.

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Nominal value plus uniform jitter in `[-spread, spread)`.
pub fn jitter(rng: &mut impl Rng, nominal: f64, spread: f64) -> f64 {
    if spread <= 0.0 {
        return nominal;
    }
    nominal + rng.gen_range(-spread..spread)
}

/// Uniform draw in `[low, high)`. Degenerate ranges return `low`.
pub fn between(rng: &mut impl Rng, low: f64, high: f64) -> f64 {
    if high <= low {
        return low;
    }
    rng.gen_range(low..high)
}

/// Gaussian draw. A non-positive or non-finite sigma collapses to the mean.
pub fn gauss(rng: &mut impl Rng, mean: f64, sigma: f64) -> f64 {
    match Normal::new(mean, sigma) {
        Ok(normal) if sigma > 0.0 => normal.sample(rng),
        _ => mean,
    }
}

/// Clamps quantities that cannot physically go negative.
pub fn non_negative(value: f64) -> f64 {
    value.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_jitter_stays_within_spread() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = jitter(&mut rng, 10.0, 0.5);
            assert!((9.5..10.5).contains(&v));
        }
        assert_eq!(jitter(&mut rng, 3.0, 0.0), 3.0);
    }

    #[test]
    fn test_between_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(between(&mut rng, 2.0, 2.0), 2.0);
        let v = between(&mut rng, 1.2, 1.4);
        assert!((1.2..1.4).contains(&v));
    }

    #[test]
    fn test_gauss_zero_sigma_is_mean() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(gauss(&mut rng, 5.0, 0.0), 5.0);
        assert_eq!(gauss(&mut rng, 5.0, -1.0), 5.0);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(-0.3), 0.0);
        assert_eq!(non_negative(1.5), 1.5);
    }
}
