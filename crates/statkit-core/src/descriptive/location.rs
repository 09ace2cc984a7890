//! Measures of location: mean, median, mode and quartiles.

use super::sorted_copy;
use crate::error::{check_sample, Result};

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> Result<f64> {
    check_sample(data, "sample")?;
    Ok(raw_mean(data))
}

/// Mean without validation; callers have already checked the sample.
pub(crate) fn raw_mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

/// Median. For even `n` this is the average of the two middle values.
pub fn median(data: &[f64]) -> Result<f64> {
    check_sample(data, "sample")?;
    Ok(median_of_sorted(&sorted_copy(data)))
}

pub(crate) fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Every value tied at the highest frequency, in ascending order.
///
/// A sample with no repeated values returns all of its (distinct) values.
pub fn mode(data: &[f64]) -> Result<Vec<f64>> {
    check_sample(data, "sample")?;
    Ok(modes_of_sorted(&sorted_copy(data)))
}

pub(crate) fn modes_of_sorted(sorted: &[f64]) -> Vec<f64> {
    // Run-length encode the sorted values
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for &x in sorted {
        if let Some((value, count)) = runs.last_mut() {
            if *value == x {
                *count += 1;
                continue;
            }
        }
        runs.push((x, 1));
    }

    let max_count = runs.iter().map(|&(_, c)| c).max().unwrap_or(0);
    runs.into_iter()
        .filter(|&(_, c)| c == max_count)
        .map(|(v, _)| v)
        .collect()
}

/// First and third quartiles plus the interquartile range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Quartiles {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

/// Index-based quartiles: `sorted[⌊0.25n⌋]` and `sorted[⌊0.75n⌋]`.
///
/// No interpolation between order statistics.
pub fn quartiles(data: &[f64]) -> Result<Quartiles> {
    check_sample(data, "sample")?;
    Ok(quartiles_of_sorted(&sorted_copy(data)))
}

pub(crate) fn quartiles_of_sorted(sorted: &[f64]) -> Quartiles {
    let n = sorted.len();
    // floor(n * 0.75) < n for every n >= 1
    let q1 = sorted[(n as f64 * 0.25).floor() as usize];
    let q3 = sorted[(n as f64 * 0.75).floor() as usize];
    Quartiles { q1, q3, iqr: q3 - q1 }
}
