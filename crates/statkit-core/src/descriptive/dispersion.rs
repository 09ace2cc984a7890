//! Dispersion: population and sample variance, and precomputed moments.

use super::location::raw_mean;
use super::sum_squared_deviations;
use crate::error::{check_min_len, check_sample, Result, StatError};

/// Population variance (divisor n).
pub fn variance(data: &[f64]) -> Result<f64> {
    check_sample(data, "sample")?;
    let m = raw_mean(data);
    Ok(sum_squared_deviations(data, m) / data.len() as f64)
}

/// Population standard deviation, √[`variance`].
pub fn std_dev(data: &[f64]) -> Result<f64> {
    variance(data).map(f64::sqrt)
}

/// Bessel-corrected sample variance (divisor n − 1). Needs n ≥ 2.
pub fn sample_variance(data: &[f64]) -> Result<f64> {
    check_min_len(data, 2, "sample")?;
    let m = raw_mean(data);
    Ok(sum_squared_deviations(data, m) / (data.len() - 1) as f64)
}

/// Bessel-corrected sample standard deviation. Needs n ≥ 2.
pub fn sample_std_dev(data: &[f64]) -> Result<f64> {
    sample_variance(data).map(f64::sqrt)
}

/// Precomputed population moments of a sample.
///
/// Callers that already hold these (e.g. from a summary they display) can
/// pass them to [`skewness`](super::skewness), [`kurtosis`](super::kurtosis)
/// and the estimators to skip a pass over the data.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Moments {
    /// Number of observations
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation (divisor n)
    pub std: f64,
}

impl Moments {
    /// Compute count, mean and population std from a sample.
    pub fn from_sample(data: &[f64]) -> Result<Self> {
        check_sample(data, "sample")?;
        let mean = raw_mean(data);
        let var = sum_squared_deviations(data, mean) / data.len() as f64;
        Ok(Self {
            count: data.len(),
            mean,
            std: var.sqrt(),
        })
    }

    /// Population variance, std².
    pub fn variance(&self) -> f64 {
        self.std * self.std
    }

    /// Use the caller's moments if given, otherwise compute them.
    pub(crate) fn resolve(data: &[f64], given: Option<&Moments>) -> Result<Self> {
        match given {
            Some(m) => {
                if m.count == 0 {
                    return Err(StatError::invalid("precomputed moments have count 0"));
                }
                if !m.mean.is_finite() || !m.std.is_finite() || m.std < 0.0 {
                    return Err(StatError::invalid(format!(
                        "precomputed moments are not usable: mean={}, std={}",
                        m.mean, m.std
                    )));
                }
                Ok(*m)
            }
            None => Self::from_sample(data),
        }
    }
}
