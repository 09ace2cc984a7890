//! Closed-form method-of-moments estimates.

use tracing::debug;

use crate::constants::GAMMA_SHAPE_FLOOR;
use crate::descriptive::Moments;
use crate::error::{Result, StatError};

use super::DistributionFamily;

/// Moment estimates for `family` from a mean and population std.
pub(super) fn method_of_moments(
    family: DistributionFamily,
    m: &Moments,
) -> Result<Vec<(&'static str, f64)>> {
    let mean = m.mean;
    let var = m.variance();

    let values = match family {
        DistributionFamily::Normal => vec![("mean", mean), ("std", m.std)],
        DistributionFamily::Uniform => {
            let half_range = (12.0 * var).sqrt() / 2.0;
            vec![("a", mean - half_range), ("b", mean + half_range)]
        }
        DistributionFamily::Exponential => {
            if mean <= 0.0 {
                return Err(StatError::invalid(format!(
                    "exponential rate needs a positive mean, got {}",
                    mean
                )));
            }
            vec![("lambda", 1.0 / mean)]
        }
        DistributionFamily::Poisson => {
            if mean < 0.0 {
                return Err(StatError::invalid(format!(
                    "poisson rate needs a non-negative mean, got {}",
                    mean
                )));
            }
            vec![("lambda", mean)]
        }
        DistributionFamily::Gamma => {
            let (shape, scale) = gamma_moments(mean, var)?;
            vec![("shape", shape), ("scale", scale)]
        }
        DistributionFamily::Beta => {
            let (alpha, beta) = beta_moments(mean, var)?;
            vec![("alpha", alpha), ("beta", beta)]
        }
    };

    Ok(values)
}

/// shape = max(0.001, x̄²/σ²), scale = σ²/x̄.
pub(super) fn gamma_moments(mean: f64, var: f64) -> Result<(f64, f64)> {
    if mean <= 0.0 || var <= 0.0 {
        return Err(StatError::invalid(format!(
            "gamma needs a positive mean and variance, got mean={}, variance={}",
            mean, var
        )));
    }
    let raw_shape = mean * mean / var;
    if raw_shape < GAMMA_SHAPE_FLOOR {
        debug!(raw_shape, floor = GAMMA_SHAPE_FLOOR, "gamma shape floored");
    }
    Ok((raw_shape.max(GAMMA_SHAPE_FLOOR), var / mean))
}

/// α = x̄·s, β = (1 − x̄)·s with s = x̄(1 − x̄)/σ² − 1.
pub(super) fn beta_moments(mean: f64, var: f64) -> Result<(f64, f64)> {
    if !(mean > 0.0 && mean < 1.0) || var <= 0.0 {
        return Err(StatError::invalid(format!(
            "beta needs a mean in (0, 1) and a positive variance, got mean={}, variance={}",
            mean, var
        )));
    }
    let s = mean * (1.0 - mean) / var - 1.0;
    if s <= 0.0 {
        return Err(StatError::invalid(format!(
            "variance {} is too large for a beta distribution with mean {}",
            var, mean
        )));
    }
    Ok((mean * s, (1.0 - mean) * s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn moments(mean: f64, std: f64) -> Moments {
        Moments { count: 10, mean, std }
    }

    #[test]
    fn test_gamma_moments() {
        // mean 6, var 12 -> shape 3, scale 2
        let values = method_of_moments(DistributionFamily::Gamma, &moments(6.0, 12f64.sqrt())).unwrap();
        assert_abs_diff_eq!(values[0].1, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(values[1].1, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gamma_shape_floor() {
        let (shape, scale) = gamma_moments(0.01, 1.0).unwrap();
        assert_eq!(shape, GAMMA_SHAPE_FLOOR);
        assert_abs_diff_eq!(scale, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_beta_moments() {
        // Beta(2, 3): mean 0.4, var 6 / (25 * 6) = 0.04
        let (alpha, beta) = beta_moments(0.4, 0.04).unwrap();
        assert_abs_diff_eq!(alpha, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(beta, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_domains() {
        assert!(gamma_moments(-1.0, 1.0).is_err());
        assert!(gamma_moments(1.0, 0.0).is_err());
        assert!(beta_moments(1.5, 0.01).is_err());
        assert!(beta_moments(0.5, 0.3).is_err());
        assert!(method_of_moments(DistributionFamily::Exponential, &moments(0.0, 1.0)).is_err());
        assert!(method_of_moments(DistributionFamily::Poisson, &moments(-2.0, 1.0)).is_err());
    }

    #[test]
    fn test_exponential_and_poisson() {
        let m = moments(4.0, 2.0);
        assert_eq!(method_of_moments(DistributionFamily::Exponential, &m).unwrap(), vec![("lambda", 0.25)]);
        assert_eq!(method_of_moments(DistributionFamily::Poisson, &m).unwrap(), vec![("lambda", 4.0)]);
    }
}
