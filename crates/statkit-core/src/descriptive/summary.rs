//! One-call summary of a sample, and equal-width histogram binning.

use super::dispersion::Moments;
use super::location::{median_of_sorted, modes_of_sorted, quartiles_of_sorted};
use super::shape::{kurtosis, skewness};
use super::sorted_copy;
use crate::error::{check_sample, Result, StatError};

/// Every descriptive statistic of a sample, computed from one sort and one
/// set of moments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DescriptiveSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// All values tied at the highest frequency, ascending
    pub modes: Vec<f64>,
    /// Population variance
    pub variance: f64,
    /// Population standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub skewness: f64,
    /// Excess kurtosis
    pub kurtosis: f64,
}

/// Compute a [`DescriptiveSummary`].
pub fn describe(data: &[f64]) -> Result<DescriptiveSummary> {
    check_sample(data, "sample")?;

    let sorted = sorted_copy(data);
    let moments = Moments::from_sample(data)?;
    let quartiles = quartiles_of_sorted(&sorted);

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    Ok(DescriptiveSummary {
        count: moments.count,
        mean: moments.mean,
        median: median_of_sorted(&sorted),
        modes: modes_of_sorted(&sorted),
        variance: moments.variance(),
        std: moments.std,
        min,
        max,
        range: max - min,
        q1: quartiles.q1,
        q3: quartiles.q3,
        iqr: quartiles.iqr,
        skewness: skewness(data, Some(&moments))?,
        kurtosis: kurtosis(data, Some(&moments))?,
    })
}

/// One histogram bin, `[lower, upper)`; the last bin is `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Bin a sample into equal-width bins spanning [min, max].
///
/// `bins = None` uses ⌈√n⌉ bins. The last bin is closed on the right so the
/// maximum is counted. A constant sample yields one zero-width bin holding
/// every observation.
pub fn histogram(data: &[f64], bins: Option<usize>) -> Result<Vec<HistogramBin>> {
    check_sample(data, "sample")?;

    let bin_count = match bins {
        Some(0) => return Err(StatError::invalid("histogram needs at least one bin")),
        Some(b) => b,
        None => ((data.len() as f64).sqrt().ceil() as usize).max(1),
    };

    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return Ok(vec![HistogramBin {
            lower: min,
            upper: max,
            count: data.len(),
        }]);
    }

    let width = (max - min) / bin_count as f64;
    let mut result: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + i as f64 * width,
            upper: if i + 1 == bin_count {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count: 0,
        })
        .collect();

    for &x in data {
        // Rounding can put x == max one past the end
        let idx = (((x - min) / width).floor() as usize).min(bin_count - 1);
        result[idx].count += 1;
    }

    Ok(result)
}
