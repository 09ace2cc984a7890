// =============================================================================
// Descriptive Statistics
// =============================================================================
//
// Summaries of a single sample:
//
// - LOCATION:   mean, median, mode, quartiles
// - DISPERSION: population variance / std (divisor n), plus the
//               Bessel-corrected versions (divisor n − 1) for callers that
//               want an unbiased variance
// - SHAPE:      skewness and excess kurtosis (population moments)
// - SUMMARY:    everything at once, plus histogram binning
//
// CONVENTIONS
// -----------
// - Quartiles are index-based, not interpolated:
//       q1 = sorted[⌊0.25·n⌋],  q3 = sorted[⌊0.75·n⌋]
//   so they are always actual observations.
// - `variance` / `std_dev` are POPULATION quantities, and they are what the
//   interval, testing and estimation modules use for standard errors.
// - Empty samples and non-finite values are InvalidInput everywhere.
//
// =============================================================================

mod dispersion;
mod location;
mod shape;
mod summary;

pub use dispersion::{
    sample_std_dev,
    sample_variance,
    std_dev,
    variance,
    Moments,
};

pub use location::{
    mean,
    median,
    mode,
    quartiles,
    Quartiles,
};

pub use shape::{
    kurtosis,
    skewness,
};

pub use summary::{
    describe,
    histogram,
    DescriptiveSummary,
    HistogramBin,
};

/// Sorted copy of the data (total order, so -0.0 sorts before 0.0).
pub(crate) fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Σ (xᵢ − mean)²
pub(crate) fn sum_squared_deviations(data: &[f64], mean: f64) -> f64 {
    data.iter().map(|&x| (x - mean) * (x - mean)).sum()
}
