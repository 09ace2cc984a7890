// =============================================================================
// Numeric Approximation Primitives
// =============================================================================
//
// Everything else in the crate is built on a handful of scalar functions:
//
//   - erf / inverse_erf:  the Gauss error function and its inverse
//   - normal_cdf / normal_pdf / normal_quantile
//   - t_cdf / t_quantile: a Student-t CDF *approximation* and its inverse
//   - z_critical_value / t_critical_value: table-driven critical values
//     (see `critical.rs`)
//
// ACCURACY, NOT EXACTNESS
// -----------------------
// None of these are exact special-function implementations, and that is
// deliberate. erf is the Abramowitz–Stegun 7.1.26 rational approximation
// (|error| ≤ 1.5e-7), and the t CDF is the normal CDF plus a first-order
// correction in 1/df:
//
//     F_t(x; ν) ≈ Φ(x) − φ(x) · (x + x³) / (4ν)
//
// which is symmetric (F(−x) = 1 − F(x)) and strictly increasing for ν ≥ 1.
// For ν ≥ 30 we just use Φ(x).
//
// WHY THE QUANTILE FUNCTIONS MATTER
// ---------------------------------
// A hypothesis test can be decided three ways: compare the statistic with a
// critical value, compare the p-value with α, or check whether the null value
// falls outside the companion interval. With approximate CDFs those rules only
// agree if the critical value is the inverse of *the same* CDF used for the
// p-value. `normal_quantile` and `t_quantile` invert these CDFs to within a
// few ULPs; the testing module starts from them and then pins the critical
// value to the exact float where the rounded p-value crosses α.
//
// =============================================================================

mod critical;

pub use critical::{t_critical_value, z_critical_value, STANDARD_LEVELS};

use std::f64::consts::{FRAC_2_SQRT_PI, PI, SQRT_2};

use crate::constants::{QUANTILE_BISECTION_ITERS, T_NORMAL_CUTOVER_DF};

// =============================================================================
// Error Function
// =============================================================================

// Abramowitz & Stegun 7.1.26 coefficients
const AS_A1: f64 = 0.254829592;
const AS_A2: f64 = -0.284496736;
const AS_A3: f64 = 1.421413741;
const AS_A4: f64 = -1.453152027;
const AS_A5: f64 = 1.061405429;
const AS_P: f64 = 0.3275911;

/// Gauss error function, Abramowitz–Stegun 7.1.26 (|error| ≤ 1.5e-7).
///
/// Odd by construction: `erf(-x) == -erf(x)`.
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == 0.0 {
        return x;
    }

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let ax = x.abs();

    let t = 1.0 / (1.0 + AS_P * ax);
    let poly = ((((AS_A5 * t + AS_A4) * t + AS_A3) * t + AS_A2) * t + AS_A1) * t;

    sign * (1.0 - poly * (-ax * ax).exp())
}

// Winitzki's constant for the closed-form inverse
const WINITZKI_A: f64 = 0.147;

// Newton steps used to polish the closed form against `erf`
const INVERSE_ERF_NEWTON_STEPS: usize = 3;

/// Inverse error function on [-1, 1].
///
/// Uses Winitzki's log-based closed form
///
/// ```text
/// erf⁻¹(x) ≈ sgn(x) · sqrt( sqrt(t² − ln(1 − x²)/a) − t ),   t = 2/(πa) + ln(1 − x²)/2
/// ```
///
/// followed by up to three Newton steps against [`erf`], each kept only if it
/// shrinks the residual. The closed form alone is good to roughly 2e-3
/// relative; after polishing, `erf(inverse_erf(x))` matches `x` to near
/// machine precision over the range that matters for critical values.
///
/// Returns `±∞` at `x = ±1` and NaN outside [-1, 1].
pub fn inverse_erf(x: f64) -> f64 {
    if x.is_nan() || x.abs() > 1.0 {
        return f64::NAN;
    }
    if x == 1.0 {
        return f64::INFINITY;
    }
    if x == -1.0 {
        return f64::NEG_INFINITY;
    }
    if x == 0.0 {
        return 0.0;
    }

    // ln(1 - x²) without cancellation for small x
    let ln_term = (-x * x).ln_1p();
    let t = 2.0 / (PI * WINITZKI_A) + ln_term / 2.0;
    let mut y = x.signum() * ((t * t - ln_term / WINITZKI_A).sqrt() - t).sqrt();

    for _ in 0..INVERSE_ERF_NEWTON_STEPS {
        let residual = erf(y) - x;
        let slope = FRAC_2_SQRT_PI * (-y * y).exp();
        if residual == 0.0 || slope == 0.0 {
            break;
        }
        let next = y - residual / slope;
        if !next.is_finite() || (erf(next) - x).abs() >= residual.abs() {
            break;
        }
        y = next;
    }

    y
}

// =============================================================================
// Float stepping
// =============================================================================

/// Smallest float greater than `x`. NaN and `+∞` map to themselves.
pub(crate) fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Largest float less than `x`. NaN and `−∞` map to themselves.
pub(crate) fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

// =============================================================================
// Normal Distribution
// =============================================================================

/// Standard normal CDF: Φ(x) = ½(1 + erf(x/√2)).
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

/// Standard normal density φ(x).
pub fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Inverse of [`normal_cdf`]: √2 · erf⁻¹(2p − 1).
///
/// `p <= 0` gives `-∞`, `p >= 1` gives `+∞`.
pub fn normal_quantile(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    SQRT_2 * inverse_erf(2.0 * p - 1.0)
}

// =============================================================================
// Student's t Distribution (approximate)
// =============================================================================

/// Approximate Student-t CDF.
///
/// For `df >= 30` this is [`normal_cdf`]. Below that the normal CDF gets a
/// first-order correction, `−φ(x)(x + x³)/(4·df)`, and the result is clamped
/// to [0, 1]. Returns NaN for NaN `x` or `df < 1`.
pub fn t_cdf(x: f64, df: f64) -> f64 {
    if x.is_nan() || df.is_nan() || df < 1.0 {
        return f64::NAN;
    }
    if df >= T_NORMAL_CUTOVER_DF {
        return normal_cdf(x);
    }
    if x.is_infinite() {
        return if x > 0.0 { 1.0 } else { 0.0 };
    }

    let correction = normal_pdf(x) * (x + x * x * x) / (4.0 * df);
    (normal_cdf(x) - correction).clamp(0.0, 1.0)
}

/// Inverse of [`t_cdf`].
///
/// Falls through to [`normal_quantile`] for `df >= 30`. Otherwise bisects on
/// the (monotone) approximate CDF and returns the smallest float `q` found
/// with `t_cdf(q, df) >= p`, so `x >= q` implies `t_cdf(x, df) >= p`.
pub fn t_quantile(p: f64, df: f64) -> f64 {
    if p.is_nan() || df.is_nan() || df < 1.0 {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    if df >= T_NORMAL_CUTOVER_DF {
        return normal_quantile(p);
    }
    if p < 0.5 {
        return -t_quantile(1.0 - p, df);
    }

    // Bracket [lo, hi] with t_cdf(lo) < p <= t_cdf(hi)
    let mut lo = f64::NEG_INFINITY;
    let mut hi = normal_quantile(p).max(1.0);
    while t_cdf(hi, df) < p {
        lo = hi;
        hi *= 2.0;
        if !hi.is_finite() {
            return f64::INFINITY;
        }
    }
    if lo == f64::NEG_INFINITY {
        lo = -hi;
    }

    for _ in 0..QUANTILE_BISECTION_ITERS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if t_cdf(mid, df) < p {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    hi
}

// =============================================================================
// Tests
// =============================================================================
