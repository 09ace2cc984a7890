// =============================================================================
// Numerical Maximum Likelihood (gamma, beta)
// =============================================================================
//
// GAMMA (shape k, scale θ)
// ------------------------
// Setting the score to zero gives θ = x̄/k and one equation in k:
//
//     ln k − ψ(k) = ln x̄ − mean(ln x)  =: s        (s > 0 by Jensen)
//
// Newton on f(k) = ln k − ψ(k) − s with f'(k) = 1/k − ψ'(k), started from
// the closed-form approximation k₀ = (3 − s + √((s − 3)² + 24s)) / (12s),
// which is already within a few percent of the root.
//
// BETA (α, β)
// -----------
// Two equations in two unknowns:
//
//     ψ(α) − ψ(α + β) = mean(ln x)
//     ψ(β) − ψ(α + β) = mean(ln(1 − x))
//
// 2-D Newton with the Jacobian
//
//     | ψ'(α) − ψ'(α+β)     −ψ'(α+β)      |
//     |   −ψ'(α+β)       ψ'(β) − ψ'(α+β)  |
//
// solved with nalgebra, started from the moment estimates.
//
// Both loops halve a step that would make a parameter non-positive.
//
// =============================================================================

use nalgebra::{Matrix2, Vector2};
use statrs::function::gamma::digamma;
use tracing::{trace, warn};

use super::moments::beta_moments;
use crate::descriptive::Moments;
use crate::error::{Result, StatError};

/// Maximum step halvings before a Newton step is abandoned.
const MAX_STEP_HALVINGS: usize = 60;

/// Configuration for the Newton iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericalMleConfig {
    /// Maximum Newton iterations before giving up.
    /// Default: 100 (typically converges in under 10)
    pub max_iterations: usize,

    /// Stop when every relative parameter change is below this.
    /// Default: 1e-10
    pub tolerance: f64,
}

impl Default for NumericalMleConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-10,
        }
    }
}

/// Trigamma function ψ'(x) for x > 0.
///
/// Shifts x up to at least 10 with ψ'(x) = ψ'(x + 1) + 1/x², then applies the
/// asymptotic series.
fn trigamma(x: f64) -> f64 {
    let mut x = x;
    let mut acc = 0.0;
    while x < 10.0 {
        acc += 1.0 / (x * x);
        x += 1.0;
    }
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    // 1/x + 1/(2x²) + 1/(6x³) − 1/(30x⁵) + 1/(42x⁷) − 1/(30x⁹)
    let series = inv
        + inv2 / 2.0
        + inv * inv2 * (1.0 / 6.0 - inv2 * (1.0 / 30.0 - inv2 * (1.0 / 42.0 - inv2 / 30.0)));
    acc + series
}

fn mean_of(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    values.sum::<f64>() / n as f64
}

/// Gamma MLE, returns `(shape, scale)`.
pub(super) fn gamma_mle(
    data: &[f64],
    m: &Moments,
    config: &NumericalMleConfig,
) -> Result<(f64, f64)> {
    if let Some(bad) = data.iter().find(|&&x| x <= 0.0) {
        return Err(StatError::invalid(format!(
            "gamma likelihood needs strictly positive data, found {}",
            bad
        )));
    }

    if m.std == 0.0 {
        return Err(StatError::invalid(
            "gamma likelihood has no finite maximum for a constant sample",
        ));
    }

    let mean_ln = mean_of(data.iter().map(|x| x.ln()), data.len());
    let s = m.mean.ln() - mean_ln;
    if !(s.is_finite() && s > 0.0) {
        return Err(StatError::invalid(format!(
            "gamma likelihood needs ln(mean) > mean(ln x), got a difference of {}",
            s
        )));
    }

    let mut k = (3.0 - s + ((s - 3.0).powi(2) + 24.0 * s).sqrt()) / (12.0 * s);
    let mut converged = false;

    for iteration in 0..config.max_iterations {
        let f = k.ln() - digamma(k) - s;
        let df = 1.0 / k - trigamma(k);
        let mut step = f / df;

        let mut halvings = 0;
        while k - step <= 0.0 && halvings < MAX_STEP_HALVINGS {
            step /= 2.0;
            halvings += 1;
        }
        k -= step;
        trace!(iteration, shape = k, step, "gamma MLE Newton step");

        if (step / k).abs() < config.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            max_iterations = config.max_iterations,
            shape = k,
            "gamma MLE did not converge, returning last iterate"
        );
    }

    Ok((k, m.mean / k))
}

/// Beta MLE, returns `(alpha, beta)`.
pub(super) fn beta_mle(
    data: &[f64],
    m: &Moments,
    config: &NumericalMleConfig,
) -> Result<(f64, f64)> {
    if let Some(bad) = data.iter().find(|&&x| x <= 0.0 || x >= 1.0) {
        return Err(StatError::invalid(format!(
            "beta likelihood needs data strictly inside (0, 1), found {}",
            bad
        )));
    }

    let n = data.len();
    let mean_ln = mean_of(data.iter().map(|x| x.ln()), n);
    let mean_ln_1m = mean_of(data.iter().map(|x| (-x).ln_1p()), n);

    let (mut a, mut b) = beta_moments(m.mean, m.variance())?;
    let mut converged = false;

    for iteration in 0..config.max_iterations {
        let psi_ab = digamma(a + b);
        let tri_ab = trigamma(a + b);

        let residual = Vector2::new(
            digamma(a) - psi_ab - mean_ln,
            digamma(b) - psi_ab - mean_ln_1m,
        );
        let jacobian = Matrix2::new(
            trigamma(a) - tri_ab,
            -tri_ab,
            -tri_ab,
            trigamma(b) - tri_ab,
        );

        let mut delta = match jacobian.lu().solve(&(-residual)) {
            Some(d) => d,
            None => {
                return Err(StatError::invalid(
                    "beta likelihood Jacobian is singular at the current estimate",
                ))
            }
        };

        let mut halvings = 0;
        while (a + delta[0] <= 0.0 || b + delta[1] <= 0.0) && halvings < MAX_STEP_HALVINGS {
            delta /= 2.0;
            halvings += 1;
        }
        a += delta[0];
        b += delta[1];
        trace!(iteration, alpha = a, beta = b, "beta MLE Newton step");

        if (delta[0] / a).abs() < config.tolerance && (delta[1] / b).abs() < config.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            max_iterations = config.max_iterations,
            alpha = a,
            beta = b,
            "beta MLE did not converge, returning last iterate"
        );
    }

    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use statrs::function::gamma::ln_gamma;
    use std::f64::consts::PI;

    fn gamma_log_likelihood(data: &[f64], k: f64, theta: f64) -> f64 {
        data.iter()
            .map(|&x| (k - 1.0) * x.ln() - x / theta - k * theta.ln() - ln_gamma(k))
            .sum()
    }

    fn beta_log_likelihood(data: &[f64], a: f64, b: f64) -> f64 {
        let ln_beta = ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b);
        data.iter()
            .map(|&x| (a - 1.0) * x.ln() + (b - 1.0) * (1.0 - x).ln() - ln_beta)
            .sum()
    }

    #[test]
    fn test_trigamma_known_values() {
        assert_abs_diff_eq!(trigamma(1.0), PI * PI / 6.0, epsilon = 1e-10);
        assert_abs_diff_eq!(trigamma(0.5), PI * PI / 2.0, epsilon = 1e-10);
        // Derivative of digamma
        for &x in &[0.3, 2.5, 7.0, 40.0] {
            let h = 1e-5;
            let numeric = (digamma(x + h) - digamma(x - h)) / (2.0 * h);
            assert_abs_diff_eq!(trigamma(x), numeric, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_gamma_mle_solves_score_equation() {
        let data = [0.8, 1.9, 2.4, 3.1, 0.6, 4.7, 2.2, 1.3, 5.5, 2.9];
        let m = Moments::from_sample(&data).unwrap();
        let (k, theta) = gamma_mle(&data, &m, &NumericalMleConfig::default()).unwrap();

        let s = m.mean.ln() - data.iter().map(|x| x.ln()).sum::<f64>() / data.len() as f64;
        assert_abs_diff_eq!(k.ln() - digamma(k), s, epsilon = 1e-9);
        assert_abs_diff_eq!(k * theta, m.mean, epsilon = 1e-12);
    }

    #[test]
    fn test_gamma_mle_beats_moment_estimate() {
        let data = [0.8, 1.9, 2.4, 3.1, 0.6, 4.7, 2.2, 1.3, 5.5, 2.9];
        let m = Moments::from_sample(&data).unwrap();
        let (k, theta) = gamma_mle(&data, &m, &NumericalMleConfig::default()).unwrap();

        let k_mom = m.mean * m.mean / m.variance();
        let theta_mom = m.variance() / m.mean;
        assert!(
            gamma_log_likelihood(&data, k, theta) >= gamma_log_likelihood(&data, k_mom, theta_mom)
        );
        // Small perturbations around the MLE do not improve the likelihood
        let best = gamma_log_likelihood(&data, k, theta);
        for &dk in &[-1e-3, 1e-3] {
            let kk = k + dk;
            assert!(gamma_log_likelihood(&data, kk, m.mean / kk) <= best);
        }
    }

    #[test]
    fn test_beta_mle_solves_score_equations() {
        let data = [0.12, 0.35, 0.41, 0.28, 0.55, 0.19, 0.33, 0.47, 0.26, 0.38];
        let m = Moments::from_sample(&data).unwrap();
        let (a, b) = beta_mle(&data, &m, &NumericalMleConfig::default()).unwrap();

        let n = data.len() as f64;
        let g1 = data.iter().map(|x| x.ln()).sum::<f64>() / n;
        let g2 = data.iter().map(|x| (1.0 - x).ln()).sum::<f64>() / n;
        assert_abs_diff_eq!(digamma(a) - digamma(a + b), g1, epsilon = 1e-9);
        assert_abs_diff_eq!(digamma(b) - digamma(a + b), g2, epsilon = 1e-9);

        let (a_mom, b_mom) = beta_moments(m.mean, m.variance()).unwrap();
        assert!(beta_log_likelihood(&data, a, b) >= beta_log_likelihood(&data, a_mom, b_mom));
    }

    #[test]
    fn test_domain_errors() {
        let config = NumericalMleConfig::default();

        let with_zero = [0.0, 1.0, 2.0];
        let m = Moments::from_sample(&with_zero).unwrap();
        assert!(matches!(gamma_mle(&with_zero, &m, &config), Err(StatError::InvalidInput(_))));

        let constant = [2.0, 2.0, 2.0];
        let m = Moments::from_sample(&constant).unwrap();
        assert!(gamma_mle(&constant, &m, &config).is_err());

        let outside = [0.2, 0.5, 1.0];
        let m = Moments::from_sample(&outside).unwrap();
        assert!(matches!(beta_mle(&outside, &m, &config), Err(StatError::InvalidInput(_))));
    }
}
