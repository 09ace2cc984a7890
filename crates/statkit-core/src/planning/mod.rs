// =============================================================================
// Sample Size Planning
// =============================================================================
//
// How many observations are needed so that a confidence interval has a given
// half-width E (the margin of error)?
//
//   mean:        n = (c · σ / E)²
//   proportion:  n = z² · p(1 − p) / E²
//
// rounded up, and never less than 1.
//
// THE t REFINEMENT
// ----------------
// When σ is only an estimate, the interval that is eventually computed will
// use a t critical value with n − 1 degrees of freedom, and that value
// depends on the n we are trying to find. So we iterate:
//
//     n₀ = (z·σ/E)²
//     nₖ₊₁ = (t(⌊nₖ⌋ − 1) · σ / E)²
//
// until successive values differ by at most 0.5. Because the t table is
// stepwise, the iteration can fall into a two-cycle between adjacent rows
// (σ/E = 1 at 95% alternates between ~7.7 and ~6.0 forever). The loop is
// capped by `PlannerConfig::max_iterations`; if the cap is hit we keep the
// LARGER of the last two iterates.
//
// The iterate only seeds the answer. The reported size is the smallest n that
// is self-consistent:
//
//     n ≥ (t(max(1, n − 1)) · σ / E)²
//
// The right-hand side never increases with n (the t table falls with df), so
// every n above a qualifying one also qualifies, and a larger E only lowers
// the right-hand side. The smallest qualifying n is therefore found by
// bisection, and it can only shrink as E grows. Rounding up whichever iterate
// the loop stopped on does not have that property: at 90% with σ = 1 it gives
// 16 for E = 0.439 and 17 for E = 0.440.
//
// =============================================================================

use tracing::{debug, warn};

use crate::error::{check_unit_open, Result, StatError};
use crate::special::{t_critical_value, z_critical_value};

// =============================================================================
// Configuration
// =============================================================================

/// What is known about the spread when planning for a mean.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeanSizeOptions {
    /// Known population standard deviation; takes precedence when set
    pub population_std: Option<f64>,
    /// Estimated standard deviation (pilot study, prior data)
    pub estimated_std: Option<f64>,
    /// Refine with t critical values when only `estimated_std` is available
    pub use_t_distribution: bool,
}

/// What is known about the proportion when planning for one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProportionSizeOptions {
    pub estimated_proportion: Option<f64>,
    /// Plan for p = 0.5, the worst case, ignoring `estimated_proportion`
    pub use_conservative_estimate: bool,
}

/// Limits for the t refinement loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    /// Maximum refinement iterations.
    /// Default: 100
    pub max_iterations: usize,

    /// Stop once |nₖ₊₁ − nₖ| is at most this.
    /// Default: 0.5
    pub convergence_threshold: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_threshold: 0.5,
        }
    }
}

// =============================================================================
// Result record
// =============================================================================

/// The assumption a plan was computed under.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PlanningAssumption {
    /// Population σ known, z critical value
    KnownStd { std: f64 },
    /// σ estimated; `t_refined` when the t iteration was applied
    EstimatedStd { std: f64, t_refined: bool },
    /// Proportion planning with this p
    Proportion { p: f64, conservative: bool },
}

/// A required sample size and how it was reached.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SampleSizePlan {
    pub confidence_level: f64,
    pub margin_of_error: f64,
    pub assumption: PlanningAssumption,
    /// Smallest sample size meeting the margin, at least 1
    pub required_n: u64,
    /// Critical value behind `required_n`
    pub critical_value: f64,
    /// Refinement iterations performed (0 when no refinement applies)
    pub iterations: usize,
    /// False only when the refinement loop hit `max_iterations`
    pub converged: bool,
}

fn check_margin(margin_of_error: f64) -> Result<()> {
    if !margin_of_error.is_finite() || margin_of_error <= 0.0 {
        return Err(StatError::invalid(format!(
            "margin of error must be positive and finite, got {}",
            margin_of_error
        )));
    }
    Ok(())
}

fn round_up(n: f64) -> u64 {
    (n.ceil() as u64).max(1)
}

/// Degrees of freedom the t refinement pairs with a sample size.
fn refinement_df(n: u64) -> usize {
    n.saturating_sub(1).max(1) as usize
}

/// Smallest `n >= 1` with `n >= required(n)`, where `required` is
/// non-increasing in `n`. `start` is a guess that usually qualifies.
fn smallest_self_consistent(start: u64, required: impl Fn(u64) -> f64) -> u64 {
    let fits = |n: u64| n as f64 >= required(n);

    let mut hi = start.max(1);
    while !fits(hi) && hi < u64::MAX {
        hi = hi.saturating_mul(2);
    }

    // 0 never qualifies; keep fits(hi) && !fits(lo)
    let mut lo = 0;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if fits(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}

// =============================================================================
// Mean
// =============================================================================

/// Sample size for estimating a mean to within `margin_of_error`, using the
/// default [`PlannerConfig`].
pub fn sample_size_for_mean(
    confidence_level: f64,
    margin_of_error: f64,
    options: &MeanSizeOptions,
) -> Result<SampleSizePlan> {
    sample_size_for_mean_with(confidence_level, margin_of_error, options, &PlannerConfig::default())
}

/// [`sample_size_for_mean`] with explicit iteration limits.
pub fn sample_size_for_mean_with(
    confidence_level: f64,
    margin_of_error: f64,
    options: &MeanSizeOptions,
    config: &PlannerConfig,
) -> Result<SampleSizePlan> {
    check_unit_open(confidence_level, "confidence level")?;
    check_margin(margin_of_error)?;

    let (std, known) = match (options.population_std, options.estimated_std) {
        (Some(s), _) => (s, true),
        (None, Some(s)) => (s, false),
        (None, None) => {
            return Err(StatError::invalid(
                "either population_std or estimated_std must be provided",
            ))
        }
    };
    if !std.is_finite() || std < 0.0 {
        return Err(StatError::invalid(format!(
            "standard deviation must be non-negative and finite, got {}",
            std
        )));
    }

    let size = |c: f64| (c * std / margin_of_error).powi(2);

    let z = z_critical_value(confidence_level);
    let mut current = (size(z), z);
    let mut iterations = 0;
    let mut converged = true;
    let refine = !known && options.use_t_distribution;

    if refine {
        // Sentinel so the first pass always runs unless n₀ is already tiny
        let mut previous = (0.0, z);
        while (current.0 - previous.0).abs() > config.convergence_threshold {
            if iterations == config.max_iterations {
                converged = false;
                break;
            }
            previous = current;
            let df = refinement_df(previous.0.floor() as u64);
            let t = t_critical_value(df, confidence_level);
            current = (size(t), t);
            iterations += 1;
            debug!(iteration = iterations, df, t, n = current.0, "sample size t refinement");
        }

        if !converged {
            warn!(
                max_iterations = config.max_iterations,
                last = current.0,
                previous = previous.0,
                "sample size refinement did not converge, keeping the larger of the last two"
            );
            if previous.0 > current.0 {
                current = previous;
            }
        }
    }

    let (required_n, critical_value) = if refine {
        let t_for = |n: u64| t_critical_value(refinement_df(n), confidence_level);
        let n = smallest_self_consistent(round_up(current.0), |n| size(t_for(n)));
        debug!(iterate = current.0, required_n = n, "self-consistent sample size");
        (n, t_for(n))
    } else {
        (round_up(current.0), current.1)
    };

    let assumption = if known {
        PlanningAssumption::KnownStd { std }
    } else {
        PlanningAssumption::EstimatedStd {
            std,
            t_refined: refine,
        }
    };

    Ok(SampleSizePlan {
        confidence_level,
        margin_of_error,
        assumption,
        required_n,
        critical_value,
        iterations,
        converged,
    })
}

// =============================================================================
// Proportion
// =============================================================================

/// Sample size for estimating a proportion to within `margin_of_error`.
///
/// With `use_conservative_estimate` the plan assumes p = 0.5, which maximises
/// p(1 − p) and so covers any true proportion.
pub fn sample_size_for_proportion(
    confidence_level: f64,
    margin_of_error: f64,
    options: &ProportionSizeOptions,
) -> Result<SampleSizePlan> {
    check_unit_open(confidence_level, "confidence level")?;
    check_margin(margin_of_error)?;

    let p = if options.use_conservative_estimate {
        0.5
    } else {
        options.estimated_proportion.ok_or_else(|| {
            StatError::invalid(
                "estimated_proportion is required unless use_conservative_estimate is set",
            )
        })?
    };
    if !(0.0..=1.0).contains(&p) {
        return Err(StatError::invalid(format!(
            "estimated proportion must be in [0, 1], got {}",
            p
        )));
    }

    let z = z_critical_value(confidence_level);
    let n = z * z * p * (1.0 - p) / (margin_of_error * margin_of_error);

    Ok(SampleSizePlan {
        confidence_level,
        margin_of_error,
        assumption: PlanningAssumption::Proportion {
            p,
            conservative: options.use_conservative_estimate,
        },
        required_n: round_up(n),
        critical_value: z,
        iterations: 0,
        converged: true,
    })
}
