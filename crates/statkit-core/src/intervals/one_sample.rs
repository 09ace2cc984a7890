//! Confidence interval for a single population mean.

use tracing::trace;

use super::ConfidenceInterval;
use crate::constants::CLT_SAMPLE_SIZE;
use crate::descriptive::{mean, std_dev};
use crate::error::{check_min_len, check_sample, check_unit_open, Result, StatError};
use crate::special::{t_critical_value, z_critical_value};

/// What the caller is willing to assume about the population.
///
/// The default assumes nothing: variance unknown, distribution not known to
/// be normal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DistributionAssumption {
    /// Population is (approximately) normal
    pub is_normal: bool,
    /// Population variance is known; `population_variance` must then be set
    pub known_variance: bool,
    pub population_variance: Option<f64>,
}

impl DistributionAssumption {
    /// Known population variance σ².
    pub fn known(population_variance: f64) -> Self {
        Self {
            is_normal: false,
            known_variance: true,
            population_variance: Some(population_variance),
        }
    }

    /// Unknown variance, normal population.
    pub fn normal() -> Self {
        Self {
            is_normal: true,
            ..Self::default()
        }
    }
}

/// Confidence interval for the mean of `data`.
///
/// The critical value depends on the assumptions:
///
/// | variance | population | n      | critical value          | SE     |
/// |----------|------------|--------|-------------------------|--------|
/// | known    | any        | any    | z                       | σ / √n |
/// | unknown  | normal     | any    | t, df = n − 1           | s / √n |
/// | unknown  | not normal | ≤ 30   | t, df = n − 1           | s / √n |
/// | unknown  | not normal | > 30   | z (central limit)       | s / √n |
///
/// `s` is the standard deviation of the sample with divisor n, the same
/// [`std_dev`] the descriptive summary reports. The unknown variance branches
/// need at least two observations so that df = n − 1 is at least 1.
///
/// # Arguments
/// * `data` - The sample
/// * `confidence_level` - e.g. 0.95 for a 95% interval
/// * `assumption` - Variance knowledge and normality
pub fn mean_interval(
    data: &[f64],
    confidence_level: f64,
    assumption: &DistributionAssumption,
) -> Result<ConfidenceInterval> {
    check_sample(data, "sample")?;
    check_unit_open(confidence_level, "confidence level")?;

    let n = data.len();
    let sample_mean = mean(data)?;

    if assumption.known_variance {
        let variance = assumption.population_variance.ok_or_else(|| {
            StatError::invalid("known_variance is set but population_variance is missing")
        })?;
        if !variance.is_finite() || variance <= 0.0 {
            return Err(StatError::invalid(format!(
                "population variance must be positive and finite, got {}",
                variance
            )));
        }

        let se = variance.sqrt() / (n as f64).sqrt();
        let z = z_critical_value(confidence_level);
        trace!(n, se, z, "mean interval with known variance");
        return Ok(ConfidenceInterval::symmetric(
            sample_mean,
            se,
            z,
            None,
            "Z-distribution (known variance)",
        ));
    }

    check_min_len(data, 2, "sample")?;
    let s = std_dev(data)?;
    let se = s / (n as f64).sqrt();

    if assumption.is_normal || n <= CLT_SAMPLE_SIZE {
        let df = n - 1;
        let t = t_critical_value(df, confidence_level);
        trace!(n, se, t, df, "mean interval with t critical value");
        Ok(ConfidenceInterval::symmetric(
            sample_mean,
            se,
            t,
            Some(df),
            "t-distribution (unknown variance)",
        ))
    } else {
        let z = z_critical_value(confidence_level);
        trace!(n, se, z, "mean interval with large-sample z critical value");
        Ok(ConfidenceInterval::symmetric(
            sample_mean,
            se,
            z,
            None,
            "Z-distribution (non-normal, large sample, unknown variance)",
        ))
    }
}
