//! Confidence intervals for a binomial proportion and for the difference of
//! two proportions.
//!
//! Both use the z critical value and clamp to the parameter's natural range.

use std::str::FromStr;

use tracing::trace;

use super::ConfidenceInterval;
use crate::constants::CONTINUITY_ADJUSTMENT;
use crate::error::{check_unit_open, Result, StatError};
use crate::special::z_critical_value;

// =============================================================================
// Method selectors
// =============================================================================

/// One-proportion interval construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ProportionMethod {
    /// Normal approximation, p̂ ± z·√(p̂(1−p̂)/n)
    #[default]
    Wald,
    /// Wilson score interval
    Wilson,
}

impl ProportionMethod {
    pub fn name(&self) -> &'static str {
        match self {
            ProportionMethod::Wald => "Wald interval (normal approximation)",
            ProportionMethod::Wilson => "Wilson score interval",
        }
    }
}

impl FromStr for ProportionMethod {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "wald" | "normal" => Ok(ProportionMethod::Wald),
            "wilson" | "score" => Ok(ProportionMethod::Wilson),
            other => Err(StatError::unsupported(format!(
                "proportion method '{}' (expected wald or wilson)",
                other
            ))),
        }
    }
}

/// Two-proportion interval construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TwoProportionMethod {
    #[default]
    Wald,
    /// Adds 0.5 to each success count before computing both the centre and
    /// the standard error
    Continuity,
}

impl TwoProportionMethod {
    pub fn name(&self) -> &'static str {
        match self {
            TwoProportionMethod::Wald => "Wald interval (normal approximation)",
            TwoProportionMethod::Continuity => "Continuity correction method",
        }
    }
}

impl FromStr for TwoProportionMethod {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "wald" | "normal" => Ok(TwoProportionMethod::Wald),
            "continuity" | "continuity-correction" => Ok(TwoProportionMethod::Continuity),
            other => Err(StatError::unsupported(format!(
                "two-proportion method '{}' (expected wald or continuity)",
                other
            ))),
        }
    }
}

fn check_counts(successes: u64, trials: u64, which: &str) -> Result<()> {
    if trials == 0 {
        return Err(StatError::invalid(format!("{}trials must be greater than 0", which)));
    }
    if successes > trials {
        return Err(StatError::invalid(format!(
            "{}successes ({}) exceed trials ({})",
            which, successes, trials
        )));
    }
    Ok(())
}

// =============================================================================
// One proportion
// =============================================================================

/// Confidence interval for a binomial proportion `successes / trials`.
///
/// * Wald: p̂ ± z·√(p̂(1−p̂)/n)
/// * Wilson: centre p̃ = (x + z²/2)/(n + z²), half-width
///   z·√(n·p̂(1−p̂) + z²/4)/(n + z²)
///
/// Bounds are clamped to [0, 1] and `margin_of_error` becomes half the
/// clamped width. `estimate` is always the raw p̂.
pub fn proportion_interval(
    successes: u64,
    trials: u64,
    confidence_level: f64,
    method: ProportionMethod,
) -> Result<ConfidenceInterval> {
    check_counts(successes, trials, "")?;
    check_unit_open(confidence_level, "confidence level")?;

    let n = trials as f64;
    let x = successes as f64;
    let p_hat = x / n;
    let z = z_critical_value(confidence_level);

    let ci = match method {
        ProportionMethod::Wald => {
            let se = (p_hat * (1.0 - p_hat) / n).sqrt();
            ConfidenceInterval::symmetric(p_hat, se, z, None, method.name())
        }
        ProportionMethod::Wilson => {
            let z2 = z * z;
            let denominator = n + z2;
            let centre = (x + z2 / 2.0) / denominator;
            let half_width = z * (n * p_hat * (1.0 - p_hat) + z2 / 4.0).sqrt() / denominator;
            ConfidenceInterval {
                lower: centre - half_width,
                upper: centre + half_width,
                margin_of_error: half_width,
                method: method.name(),
                critical_value: z,
                estimate: p_hat,
                standard_error: half_width / z,
                degrees_of_freedom: None,
            }
        }
    };

    trace!(?method, successes, trials, p_hat, "proportion interval");
    Ok(ci.clamped(0.0, 1.0))
}

// =============================================================================
// Two proportions
// =============================================================================

/// Confidence interval for p₁ − p₂.
///
/// * Wald: SE = √(p₁(1−p₁)/n₁ + p₂(1−p₂)/n₂) on the raw proportions.
/// * Continuity: p̃ᵢ = (xᵢ + 0.5)/nᵢ replaces the raw proportions in BOTH the
///   centre and the SE, so the interval is centred on p̃₁ − p̃₂. A variance
///   term p̃(1−p̃) that goes negative (xᵢ = nᵢ) is treated as zero.
///
/// Bounds are clamped to [−1, 1]. `estimate` is the raw difference p₁ − p₂
/// for both methods.
pub fn two_proportion_interval(
    successes1: u64,
    trials1: u64,
    successes2: u64,
    trials2: u64,
    confidence_level: f64,
    method: TwoProportionMethod,
) -> Result<ConfidenceInterval> {
    check_counts(successes1, trials1, "first sample: ")?;
    check_counts(successes2, trials2, "second sample: ")?;
    check_unit_open(confidence_level, "confidence level")?;

    let n1 = trials1 as f64;
    let n2 = trials2 as f64;
    let raw_diff = successes1 as f64 / n1 - successes2 as f64 / n2;

    let adjustment = match method {
        TwoProportionMethod::Wald => 0.0,
        TwoProportionMethod::Continuity => CONTINUITY_ADJUSTMENT,
    };
    let p1 = (successes1 as f64 + adjustment) / n1;
    let p2 = (successes2 as f64 + adjustment) / n2;

    let variance_term = |p: f64, n: f64| (p * (1.0 - p)).max(0.0) / n;
    let se = (variance_term(p1, n1) + variance_term(p2, n2)).sqrt();
    let z = z_critical_value(confidence_level);

    let mut ci = ConfidenceInterval::symmetric(p1 - p2, se, z, None, method.name());
    ci.estimate = raw_diff;

    trace!(?method, p1, p2, se, "two-proportion interval");
    Ok(ci.clamped(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_method_parsing() {
        assert_eq!("Wilson".parse::<ProportionMethod>().unwrap(), ProportionMethod::Wilson);
        assert_eq!("wald".parse::<ProportionMethod>().unwrap(), ProportionMethod::Wald);
        assert!(matches!(
            "clopper-pearson".parse::<ProportionMethod>(),
            Err(StatError::Unsupported(_))
        ));
        assert_eq!(
            "continuity".parse::<TwoProportionMethod>().unwrap(),
            TwoProportionMethod::Continuity
        );
        assert!("wilson".parse::<TwoProportionMethod>().is_err());
    }

    #[test]
    fn test_wald_interval() {
        let ci = proportion_interval(40, 100, 0.95, ProportionMethod::Wald).unwrap();
        let se = (0.4f64 * 0.6 / 100.0).sqrt();
        assert_abs_diff_eq!(ci.lower, 0.4 - 1.96 * se, epsilon = 1e-12);
        assert_abs_diff_eq!(ci.upper, 0.4 + 1.96 * se, epsilon = 1e-12);
        assert_abs_diff_eq!(ci.margin_of_error, 1.96 * se, epsilon = 1e-12);
        assert_eq!(ci.estimate, 0.4);
    }

    #[test]
    fn test_wilson_interval() {
        // Classic textbook values: 40/100 at 95% -> roughly (0.3094, 0.4980)
        let ci = proportion_interval(40, 100, 0.95, ProportionMethod::Wilson).unwrap();
        assert_abs_diff_eq!(ci.lower, 0.3094, epsilon = 1e-3);
        assert_abs_diff_eq!(ci.upper, 0.4980, epsilon = 1e-3);
        assert!(ci.contains(0.4));
    }

    #[test]
    fn test_wilson_pulls_extremes_inward() {
        // Zero successes: Wald collapses to a point, Wilson does not
        let wald = proportion_interval(0, 20, 0.95, ProportionMethod::Wald).unwrap();
        assert_eq!((wald.lower, wald.upper), (0.0, 0.0));

        let wilson = proportion_interval(0, 20, 0.95, ProportionMethod::Wilson).unwrap();
        assert_abs_diff_eq!(wilson.lower, 0.0, epsilon = 1e-12);
        assert!(wilson.upper > 0.1 && wilson.upper < 0.2);
    }

    #[test]
    fn test_wald_clamped_near_boundary() {
        let ci = proportion_interval(1, 20, 0.99, ProportionMethod::Wald).unwrap();
        assert_eq!(ci.lower, 0.0);
        assert_abs_diff_eq!(ci.margin_of_error, ci.upper / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_proportion_invalid_counts() {
        assert!(matches!(
            proportion_interval(5, 0, 0.95, ProportionMethod::Wald),
            Err(StatError::InvalidInput(_))
        ));
        assert!(matches!(
            proportion_interval(11, 10, 0.95, ProportionMethod::Wilson),
            Err(StatError::InvalidInput(_))
        ));
        assert!(proportion_interval(5, 10, 1.5, ProportionMethod::Wald).is_err());
    }

    #[test]
    fn test_two_proportion_wald() {
        let ci = two_proportion_interval(45, 100, 30, 100, 0.95, TwoProportionMethod::Wald).unwrap();
        let se = (0.45f64 * 0.55 / 100.0 + 0.3 * 0.7 / 100.0).sqrt();
        assert_abs_diff_eq!(ci.estimate, 0.15, epsilon = 1e-12);
        assert_abs_diff_eq!(ci.lower, 0.15 - 1.96 * se, epsilon = 1e-12);
        assert_abs_diff_eq!(ci.upper, 0.15 + 1.96 * se, epsilon = 1e-12);
    }

    #[test]
    fn test_two_proportion_continuity_shifts_centre() {
        // Unequal n: the +0.5 shifts p1 and p2 by different amounts
        let ci = two_proportion_interval(10, 20, 30, 100, 0.95, TwoProportionMethod::Continuity)
            .unwrap();
        let p1 = 10.5 / 20.0;
        let p2 = 30.5 / 100.0;
        let centre = (ci.lower + ci.upper) / 2.0;
        assert_abs_diff_eq!(centre, p1 - p2, epsilon = 1e-12);
        // The reported estimate is still the raw difference
        assert_abs_diff_eq!(ci.estimate, 0.5 - 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_two_proportion_continuity_all_successes() {
        // x = n makes (x + 0.5)/n > 1; the variance term is floored at zero
        let ci = two_proportion_interval(10, 10, 0, 10, 0.95, TwoProportionMethod::Continuity)
            .unwrap();
        assert!(ci.lower >= -1.0 && ci.upper <= 1.0);
        assert!(ci.lower <= ci.upper);
        assert!(ci.standard_error.is_finite());
    }

    #[test]
    fn test_two_proportion_invalid_counts() {
        assert!(two_proportion_interval(1, 0, 1, 5, 0.95, TwoProportionMethod::Wald).is_err());
        assert!(two_proportion_interval(1, 5, 6, 5, 0.95, TwoProportionMethod::Wald).is_err());
    }
}
