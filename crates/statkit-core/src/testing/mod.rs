// =============================================================================
// Hypothesis Testing
// =============================================================================
//
// One-sample tests of H₀: μ = μ₀ against a two-sided, left (μ < μ₀) or right
// (μ > μ₀) alternative:
//
//   - z_test: population σ known,   statistic (x̄ − μ₀) / (σ/√n)
//   - t_test: σ estimated by s,      statistic (x̄ − μ₀) / (s/√n), df = n − 1
//
// s is the standard deviation with divisor n, as in `descriptive::std_dev`.
//
// THREE WAYS TO DECIDE
// --------------------
// A test can reject H₀ because
//
//   1. the statistic is beyond the critical value,
//   2. the p-value is at most α, or
//   3. μ₀ is not strictly inside the companion confidence interval.
//
// These are the same rule written three ways, but only if the critical value
// is the inverse of the CDF that produced the p-value. The table critical
// values used for confidence intervals (1.96, the t rows) are rounded and do
// not satisfy that, so the tests start from `normal_quantile` / `t_quantile`
// (1.95996... for α = 0.05 two-sided, not 1.96) and then CALIBRATE: bisect
// over floats to the smallest c whose rounded p-value is at most α, so that
// p(c) ≤ α < p(c⁻) with c⁻ the float just below c.
//
// The approximate CDFs are monotone in exact arithmetic but only up to
// rounding in floating point. A statistic within a few ULPs of c can land on
// the wrong side of that wobble; the p-value then decides, the reported
// critical value is moved onto the statistic, and an interval bound that
// disagrees only through rounding is moved onto μ₀.
//
// The companion interval is built from the same critical value c:
//
//   two-sided:  [x̄ − c·SE, x̄ + c·SE]
//   left:       (−∞, x̄ + c·SE]
//   right:      [x̄ − c·SE, +∞)
//
// and μ₀ landing exactly on a finite bound counts as a rejection, matching
// `statistic == critical` in rule 1.
//
// =============================================================================

use std::str::FromStr;

use tracing::debug;

use crate::descriptive::{mean, std_dev};
use crate::error::{check_min_len, check_sample, check_unit_open, Result, StatError};
use crate::intervals::ConfidenceInterval;
use crate::special::{next_down, next_up, normal_cdf, normal_quantile, t_cdf, t_quantile};

// =============================================================================
// Tail
// =============================================================================

/// Direction of the alternative hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Tail {
    /// H₁: μ ≠ μ₀
    #[default]
    Two,
    /// H₁: μ < μ₀
    Left,
    /// H₁: μ > μ₀
    Right,
}

impl Tail {
    pub fn name(&self) -> &'static str {
        match self {
            Tail::Two => "two-sided",
            Tail::Left => "left-tailed",
            Tail::Right => "right-tailed",
        }
    }
}

impl FromStr for Tail {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "two" | "two-sided" | "two_sided" | "both" => Ok(Tail::Two),
            "left" | "less" | "lower" => Ok(Tail::Left),
            "right" | "greater" | "upper" => Ok(Tail::Right),
            other => Err(StatError::unsupported(format!(
                "test tail '{}' (expected two, left or right)",
                other
            ))),
        }
    }
}

// =============================================================================
// Result record
// =============================================================================

/// Outcome of a one-sample hypothesis test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HypothesisTest {
    /// z or t statistic
    pub statistic: f64,
    /// `Some(n − 1)` for the t-test, `None` for the z-test
    pub degrees_of_freedom: Option<usize>,
    pub p_value: f64,
    /// Signed: negative for a left-tailed test
    pub critical_value: f64,
    /// Whether H₀ is rejected at level `alpha`
    pub rejected: bool,
    /// Companion interval built from the same critical value
    pub confidence_interval: ConfidenceInterval,
    pub method: &'static str,
    /// Sample mean
    pub mean: f64,
    pub standard_error: f64,
    /// μ₀
    pub null_value: f64,
    pub alpha: f64,
    pub tail: Tail,
}

impl HypothesisTest {
    /// Rule 1: the statistic is at or beyond the critical value.
    pub fn rejects_by_statistic(&self) -> bool {
        match self.tail {
            Tail::Two => self.statistic.abs() >= self.critical_value,
            Tail::Left => self.statistic <= self.critical_value,
            Tail::Right => self.statistic >= self.critical_value,
        }
    }

    /// Rule 2: the p-value is at most α.
    pub fn rejects_by_p_value(&self) -> bool {
        self.p_value <= self.alpha
    }

    /// Rule 3: μ₀ is not strictly inside the companion interval.
    pub fn rejects_by_interval(&self) -> bool {
        let ci = &self.confidence_interval;
        !(ci.lower < self.null_value && self.null_value < ci.upper)
    }
}

// =============================================================================
// p-values
// =============================================================================

/// Signed distance into the rejection region: rule 1 rejects when this is at
/// least the critical magnitude.
fn directional(statistic: f64, tail: Tail) -> f64 {
    match tail {
        Tail::Two => statistic.abs(),
        Tail::Right => statistic,
        Tail::Left => -statistic,
    }
}

/// p-value as a function of the directional statistic `d`.
///
/// Non-increasing in `d` on the whole real line (two-sided values below 0
/// clamp to 1), which is what the critical-value bisection relies on.
fn directional_p_value(d: f64, tail: Tail, cdf: impl Fn(f64) -> f64) -> f64 {
    let upper = 1.0 - cdf(d);
    let p = match tail {
        Tail::Two => 2.0 * upper,
        Tail::Left | Tail::Right => upper,
    };
    p.clamp(0.0, 1.0)
}

/// Tail probability from an upper-tail CDF complement.
fn tail_p_value(statistic: f64, tail: Tail, cdf: impl Fn(f64) -> f64) -> f64 {
    directional_p_value(directional(statistic, tail), tail, cdf)
}

/// p-value of a z statistic under the standard normal.
pub fn z_test_p_value(z: f64, tail: Tail) -> f64 {
    tail_p_value(z, tail, normal_cdf)
}

/// p-value of a t statistic with `df` degrees of freedom.
///
/// Uses the approximate [`t_cdf`], which is the normal CDF for `df >= 30`.
/// Returns NaN for `df < 1`.
pub fn t_test_p_value(t: f64, df: f64, tail: Tail) -> f64 {
    if df.is_nan() || df < 1.0 {
        return f64::NAN;
    }
    tail_p_value(t, tail, |x| t_cdf(x, df))
}

// =============================================================================
// Critical values
// =============================================================================

/// Upper bound on bracket widenings and bisection halvings.
const CALIBRATION_ITERS: usize = 2200;

/// Critical magnitude c for `tail`: the smallest float with
/// `directional_p_value(c) <= alpha`.
///
/// `quantile` gives the starting point; the bracket is widened geometrically
/// around it and then bisected down to adjacent floats.
fn calibrated_critical(
    alpha: f64,
    tail: Tail,
    quantile: impl Fn(f64) -> f64,
    cdf: impl Fn(f64) -> f64,
) -> f64 {
    let rejects = |d: f64| directional_p_value(d, tail, &cdf) <= alpha;

    let start = match tail {
        Tail::Two => quantile(1.0 - alpha / 2.0),
        Tail::Left | Tail::Right => quantile(1.0 - alpha),
    }
    .clamp(-f64::MAX, f64::MAX);

    // Bracket: !rejects(lo) && rejects(hi)
    let (mut lo, mut hi) = (start, start);
    let mut step = f64::EPSILON * start.abs().max(1.0);
    if rejects(start) {
        for _ in 0..CALIBRATION_ITERS {
            lo = (hi - step).max(-f64::MAX);
            if !rejects(lo) {
                break;
            }
            hi = lo;
            step *= 2.0;
        }
    } else {
        for _ in 0..CALIBRATION_ITERS {
            hi = (lo + step).min(f64::MAX);
            if rejects(hi) {
                break;
            }
            lo = hi;
            step *= 2.0;
        }
    }

    for _ in 0..CALIBRATION_ITERS {
        let mid = lo / 2.0 + hi / 2.0;
        if mid <= lo || mid >= hi {
            break;
        }
        if rejects(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    hi
}

// =============================================================================
// Tests
// =============================================================================

fn companion_interval(
    sample_mean: f64,
    se: f64,
    multiplier: f64,
    tail: Tail,
    degrees_of_freedom: Option<usize>,
    method: &'static str,
) -> ConfidenceInterval {
    let reach = multiplier * se;
    let (lower, upper) = match tail {
        Tail::Two => (sample_mean - reach, sample_mean + reach),
        Tail::Left => (f64::NEG_INFINITY, sample_mean + reach),
        Tail::Right => (sample_mean - reach, f64::INFINITY),
    };
    ConfidenceInterval {
        lower,
        upper,
        margin_of_error: reach.abs(),
        method,
        critical_value: multiplier,
        estimate: sample_mean,
        standard_error: se,
        degrees_of_freedom,
    }
}

/// Moves the bound nearest μ₀ so the interval rule matches `rejected`.
///
/// Only reached when `x̄ ± c·SE` and `(x̄ − μ₀)/SE` round to opposite sides
/// of the boundary.
fn align_interval(
    ci: &mut ConfidenceInterval,
    null_value: f64,
    statistic: f64,
    tail: Tail,
    rejected: bool,
) {
    let inside = ci.lower < null_value && null_value < ci.upper;
    if inside != rejected {
        return;
    }
    debug!(
        lower = ci.lower,
        upper = ci.upper,
        null_value,
        rejected,
        "companion interval bound moved onto the null value"
    );
    if rejected {
        match tail {
            Tail::Left => ci.upper = null_value,
            Tail::Right => ci.lower = null_value,
            Tail::Two if statistic >= 0.0 => ci.lower = null_value,
            Tail::Two => ci.upper = null_value,
        }
    } else {
        if ci.lower >= null_value {
            ci.lower = next_down(null_value);
        }
        if ci.upper <= null_value {
            ci.upper = next_up(null_value);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    statistic: f64,
    degrees_of_freedom: Option<usize>,
    p_value: f64,
    calibrated: f64,
    sample_mean: f64,
    se: f64,
    null_value: f64,
    alpha: f64,
    tail: Tail,
    method: &'static str,
) -> HypothesisTest {
    let d = directional(statistic, tail);
    let by_p_value = p_value <= alpha;

    let mut critical = calibrated;
    if by_p_value != (d >= critical) {
        critical = if by_p_value { d } else { next_up(d) };
        debug!(
            statistic,
            calibrated,
            critical,
            p_value,
            "statistic within rounding of the critical value, p-value decides"
        );
    }

    let mut confidence_interval =
        companion_interval(sample_mean, se, critical, tail, degrees_of_freedom, method);
    align_interval(&mut confidence_interval, null_value, statistic, tail, by_p_value);

    let mut test = HypothesisTest {
        statistic,
        degrees_of_freedom,
        p_value,
        critical_value: if tail == Tail::Left { -critical } else { critical },
        rejected: false,
        confidence_interval,
        method,
        mean: sample_mean,
        standard_error: se,
        null_value,
        alpha,
        tail,
    };
    test.rejected = test.rejects_by_statistic();
    debug!(
        method,
        statistic,
        critical_value = test.critical_value,
        p_value,
        rejected = test.rejected,
        "hypothesis test"
    );
    test
}

fn check_null_and_alpha(null_value: f64, alpha: f64) -> Result<()> {
    if !null_value.is_finite() {
        return Err(StatError::invalid(format!(
            "hypothesised mean must be finite, got {}",
            null_value
        )));
    }
    check_unit_open(alpha, "significance level")
}

/// One-sample z-test with known population standard deviation `sigma`.
///
/// # Arguments
/// * `data` - The sample
/// * `null_value` - μ₀ under the null hypothesis
/// * `sigma` - Known population standard deviation (> 0)
/// * `alpha` - Significance level in (0, 1)
/// * `tail` - Direction of the alternative
pub fn z_test(
    data: &[f64],
    null_value: f64,
    sigma: f64,
    alpha: f64,
    tail: Tail,
) -> Result<HypothesisTest> {
    check_sample(data, "sample")?;
    check_null_and_alpha(null_value, alpha)?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(StatError::invalid(format!(
            "population standard deviation must be positive and finite, got {}",
            sigma
        )));
    }

    let sample_mean = mean(data)?;
    let se = sigma / (data.len() as f64).sqrt();
    let z = (sample_mean - null_value) / se;

    let method = match tail {
        Tail::Two => "Z-test (known variance, two-sided)",
        Tail::Left => "Z-test (known variance, left-tailed)",
        Tail::Right => "Z-test (known variance, right-tailed)",
    };

    Ok(assemble(
        z,
        None,
        z_test_p_value(z, tail),
        calibrated_critical(alpha, tail, normal_quantile, normal_cdf),
        sample_mean,
        se,
        null_value,
        alpha,
        tail,
        method,
    ))
}

/// One-sample t-test; σ is estimated by [`std_dev`] (divisor n).
///
/// Needs at least two observations and a sample that is not constant.
pub fn t_test(data: &[f64], null_value: f64, alpha: f64, tail: Tail) -> Result<HypothesisTest> {
    check_min_len(data, 2, "sample")?;
    check_null_and_alpha(null_value, alpha)?;

    let n = data.len();
    let sample_mean = mean(data)?;
    let s = std_dev(data)?;
    if s == 0.0 {
        return Err(StatError::invalid(
            "sample has zero variance, t statistic is undefined",
        ));
    }

    let se = s / (n as f64).sqrt();
    let t = (sample_mean - null_value) / se;
    let df = n - 1;
    let nu = df as f64;

    let method = match tail {
        Tail::Two => "t-test (unknown variance, two-sided)",
        Tail::Left => "t-test (unknown variance, left-tailed)",
        Tail::Right => "t-test (unknown variance, right-tailed)",
    };

    Ok(assemble(
        t,
        Some(df),
        t_test_p_value(t, nu, tail),
        calibrated_critical(alpha, tail, |p| t_quantile(p, nu), |x| t_cdf(x, nu)),
        sample_mean,
        se,
        null_value,
        alpha,
        tail,
        method,
    ))
}
