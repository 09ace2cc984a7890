//! Confidence interval for the difference of two means, μ₁ − μ₂.

use std::str::FromStr;

use tracing::{debug, trace};

use super::ConfidenceInterval;
use crate::descriptive::{mean, std_dev, variance};
use crate::error::{check_min_len, check_sample, check_unit_open, Result, StatError};
use crate::special::t_critical_value;

/// How the two samples relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TwoSampleMethod {
    /// Independent samples, equal population variances
    Pooled,
    /// Independent samples, variances not assumed equal
    #[default]
    Welch,
    /// Observations matched pairwise (before/after, twins, ...)
    Paired,
}

impl TwoSampleMethod {
    pub fn name(&self) -> &'static str {
        match self {
            TwoSampleMethod::Pooled => "Pooled variance t-interval",
            TwoSampleMethod::Welch => "Welch-Satterthwaite t-interval",
            TwoSampleMethod::Paired => "Paired t-interval",
        }
    }
}

impl FromStr for TwoSampleMethod {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pooled" | "equal" | "equal-variance" => Ok(TwoSampleMethod::Pooled),
            "welch" | "unequal" | "unequal-variance" => Ok(TwoSampleMethod::Welch),
            "paired" => Ok(TwoSampleMethod::Paired),
            other => Err(StatError::unsupported(format!(
                "two-sample method '{}' (expected pooled, welch or paired)",
                other
            ))),
        }
    }
}

/// Confidence interval for `mean(data1) − mean(data2)`.
///
/// * Pooled: s²ₚ = ((n₁ − 1)·v₁ + (n₂ − 1)·v₂)/(n₁ + n₂ − 2),
///   SE = sₚ·√(1/n₁ + 1/n₂), df = n₁ + n₂ − 2.
/// * Welch: SE = √(v₁/n₁ + v₂/n₂), df from Welch–Satterthwaite, floored.
/// * Paired: one-sample t-interval on the differences xᵢ − yᵢ, df = n − 1.
///   The samples must have equal length.
///
/// `v₁`, `v₂` are the per-sample [`variance`]s (divisor n). All three use the
/// table t critical value.
pub fn two_sample_interval(
    data1: &[f64],
    data2: &[f64],
    confidence_level: f64,
    method: TwoSampleMethod,
) -> Result<ConfidenceInterval> {
    check_sample(data1, "first sample")?;
    check_sample(data2, "second sample")?;
    check_unit_open(confidence_level, "confidence level")?;

    let n1 = data1.len();
    let n2 = data2.len();
    let mean1 = mean(data1)?;
    let mean2 = mean(data2)?;
    let diff = mean1 - mean2;

    let (se, df) = match method {
        TwoSampleMethod::Paired => {
            if n1 != n2 {
                return Err(StatError::invalid(format!(
                    "paired samples must have the same length, got {} and {}",
                    n1, n2
                )));
            }
            let differences: Vec<f64> = data1.iter().zip(data2).map(|(x, y)| x - y).collect();
            check_min_len(&differences, 2, "paired differences")?;
            let s = std_dev(&differences)?;
            (s / (n1 as f64).sqrt(), n1 - 1)
        }
        TwoSampleMethod::Pooled => {
            if n1 + n2 <= 2 {
                return Err(StatError::invalid(
                    "pooled interval needs more than two observations in total",
                ));
            }
            let df = n1 + n2 - 2;
            let weighted = (n1 - 1) as f64 * variance(data1)? + (n2 - 1) as f64 * variance(data2)?;
            let pooled_var = weighted / df as f64;
            let se = (pooled_var * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
            (se, df)
        }
        TwoSampleMethod::Welch => {
            check_min_len(data1, 2, "first sample")?;
            check_min_len(data2, 2, "second sample")?;
            let v1 = variance(data1)? / n1 as f64;
            let v2 = variance(data2)? / n2 as f64;
            let se = (v1 + v2).sqrt();
            (se, welch_degrees_of_freedom(v1, v2, n1, n2))
        }
    };

    let t = t_critical_value(df, confidence_level);
    trace!(?method, n1, n2, diff, se, df, t, "two-sample interval");
    Ok(ConfidenceInterval::symmetric(diff, se, t, Some(df), method.name()))
}

/// Welch–Satterthwaite degrees of freedom, floored, at least 1.
///
/// `v1`, `v2` are the per-sample variances of the mean, v/n. When both are
/// zero the formula is 0/0; fall back to n₁ + n₂ − 2.
fn welch_degrees_of_freedom(v1: f64, v2: f64, n1: usize, n2: usize) -> usize {
    let numerator = (v1 + v2).powi(2);
    let denominator = v1 * v1 / (n1 - 1) as f64 + v2 * v2 / (n2 - 1) as f64;
    if denominator == 0.0 {
        debug!(n1, n2, "both samples constant, Welch df falls back to n1 + n2 - 2");
        return (n1 + n2 - 2).max(1);
    }
    ((numerator / denominator).floor() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const A: [f64; 6] = [5.1, 4.9, 5.6, 5.8, 6.0, 5.4];
    const B: [f64; 5] = [4.2, 4.8, 4.4, 5.0, 4.6];

    #[test]
    fn test_method_parsing() {
        assert_eq!("pooled".parse::<TwoSampleMethod>().unwrap(), TwoSampleMethod::Pooled);
        assert_eq!(" Welch ".parse::<TwoSampleMethod>().unwrap(), TwoSampleMethod::Welch);
        assert_eq!("PAIRED".parse::<TwoSampleMethod>().unwrap(), TwoSampleMethod::Paired);
        assert!(matches!(
            "bootstrap".parse::<TwoSampleMethod>(),
            Err(StatError::Unsupported(_))
        ));
        assert_eq!(TwoSampleMethod::default(), TwoSampleMethod::Welch);
    }

    #[test]
    fn test_pooled_interval() {
        let ci = two_sample_interval(&A, &B, 0.95, TwoSampleMethod::Pooled).unwrap();
        let (m1, m2) = (A.iter().sum::<f64>() / 6.0, B.iter().sum::<f64>() / 5.0);
        let var1: f64 = A.iter().map(|x| (x - m1).powi(2)).sum::<f64>() / 6.0;
        let var2: f64 = B.iter().map(|x| (x - m2).powi(2)).sum::<f64>() / 5.0;
        let pooled = (5.0 * var1 + 4.0 * var2) / 9.0;
        let se = (pooled * (1.0 / 6.0 + 1.0 / 5.0)).sqrt();

        assert_eq!(ci.degrees_of_freedom, Some(9));
        assert_eq!(ci.critical_value, 2.262);
        assert_abs_diff_eq!(ci.estimate, m1 - m2, epsilon = 1e-12);
        assert_abs_diff_eq!(ci.standard_error, se, epsilon = 1e-12);
        assert_abs_diff_eq!(ci.lower, m1 - m2 - 2.262 * se, epsilon = 1e-12);
    }

    #[test]
    fn test_welch_interval() {
        let ci = two_sample_interval(&A, &B, 0.95, TwoSampleMethod::Welch).unwrap();
        let v1 = crate::descriptive::variance(&A).unwrap() / 6.0;
        let v2 = crate::descriptive::variance(&B).unwrap() / 5.0;
        let df = ((v1 + v2).powi(2) / (v1 * v1 / 5.0 + v2 * v2 / 4.0)).floor() as usize;

        assert_eq!(ci.degrees_of_freedom, Some(df));
        assert_abs_diff_eq!(ci.standard_error, (v1 + v2).sqrt(), epsilon = 1e-12);
        assert!(ci.lower > 0.0, "means are clearly separated: {:?}", ci);
    }

    #[test]
    fn test_welch_df_bounded_by_sample_sizes() {
        // Welch df lies between min(n1, n2) - 1 and n1 + n2 - 2
        let ci = two_sample_interval(&A, &B, 0.90, TwoSampleMethod::Welch).unwrap();
        let df = ci.degrees_of_freedom.unwrap();
        assert!(df >= 4 && df <= 9, "df = {}", df);
    }

    #[test]
    fn test_welch_constant_samples_fallback() {
        let ci = two_sample_interval(&[1.0, 1.0, 1.0], &[2.0, 2.0], 0.95, TwoSampleMethod::Welch)
            .unwrap();
        assert_eq!(ci.degrees_of_freedom, Some(3));
        assert_eq!(ci.standard_error, 0.0);
        assert_eq!((ci.lower, ci.upper), (-1.0, -1.0));
    }

    #[test]
    fn test_paired_interval() {
        let before = [200.0, 190.0, 210.0, 220.0, 205.0];
        let after = [195.0, 188.0, 202.0, 214.0, 203.0];
        let ci = two_sample_interval(&before, &after, 0.95, TwoSampleMethod::Paired).unwrap();

        // d = [5, 2, 8, 6, 2], mean 4.6, Σ(d − 4.6)² = 27.2
        let sd = (27.2f64 / 5.0).sqrt();
        assert_eq!(ci.degrees_of_freedom, Some(4));
        assert_eq!(ci.critical_value, 2.776);
        assert_abs_diff_eq!(ci.estimate, 4.6, epsilon = 1e-12);
        assert_abs_diff_eq!(ci.standard_error, sd / 5f64.sqrt(), epsilon = 1e-12);
        assert_eq!(ci.method, "Paired t-interval");
    }

    #[test]
    fn test_paired_length_mismatch() {
        assert!(matches!(
            two_sample_interval(&A, &B, 0.95, TwoSampleMethod::Paired),
            Err(StatError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(two_sample_interval(&[], &B, 0.95, TwoSampleMethod::Welch).is_err());
        assert!(two_sample_interval(&[1.0], &B, 0.95, TwoSampleMethod::Welch).is_err());
        assert!(two_sample_interval(&[1.0], &[2.0], 0.95, TwoSampleMethod::Pooled).is_err());
        // Pooled only needs n1 + n2 > 2
        assert!(two_sample_interval(&[1.0], &[2.0, 3.0], 0.95, TwoSampleMethod::Pooled).is_ok());
    }
}
