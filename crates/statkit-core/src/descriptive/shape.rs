//! Shape of a distribution: skewness and excess kurtosis.
//!
//! Both are standardized POPULATION moments with no small-sample bias
//! correction. A constant sample (std = 0) has no defined shape, so both
//! return 0 for it.

use tracing::debug;

use super::dispersion::Moments;
use crate::error::{check_sample, Result};

/// Third standardized moment, mean((x − μ)³) / σ³.
///
/// Pass `moments` to reuse a mean and std the caller already has.
pub fn skewness(data: &[f64], moments: Option<&Moments>) -> Result<f64> {
    Ok(standardized_moment(data, moments, 3)?.unwrap_or(0.0))
}

/// Excess kurtosis, mean((x − μ)⁴) / σ⁴ − 3.
pub fn kurtosis(data: &[f64], moments: Option<&Moments>) -> Result<f64> {
    Ok(standardized_moment(data, moments, 4)?.map_or(0.0, |m4| m4 - 3.0))
}

/// `None` for a constant sample, where the moment is undefined.
fn standardized_moment(data: &[f64], moments: Option<&Moments>, order: i32) -> Result<Option<f64>> {
    check_sample(data, "sample")?;
    let m = Moments::resolve(data, moments)?;
    if m.std == 0.0 {
        debug!(n = data.len(), order, "constant sample, shape statistic reported as 0");
        return Ok(None);
    }
    Ok(Some(raw_standardized(data, &m, order)))
}

fn raw_standardized(data: &[f64], m: &Moments, order: i32) -> f64 {
    let n = data.len() as f64;
    data.iter()
        .map(|&x| ((x - m.mean) / m.std).powi(order))
        .sum::<f64>()
        / n
}
