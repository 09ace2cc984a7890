// =============================================================================
// Error Types
// =============================================================================
//
// Every fallible function in the library returns `Result<T>`, which is
// `std::result::Result<T, StatError>`.
//
// There are only two kinds of failure:
//
//   - InvalidInput: the caller handed us something outside the domain of the
//     computation (empty sample, confidence level of 1.2, 12 successes out of
//     10 trials, paired samples of different lengths, ...)
//
//   - Unsupported: a selector string (distribution family, interval method,
//     test tail) that we don't recognise.
//
// All computations are deterministic, so there is nothing to retry: fix the
// input and call again.
//
// =============================================================================

use thiserror::Error;

/// Errors produced by the inference engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatError {
    /// Input outside the domain of the requested computation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unrecognised distribution family, method or tail selector.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl StatError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        StatError::InvalidInput(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        StatError::Unsupported(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StatError>;

// =============================================================================
// Shared input validation
// =============================================================================

/// Reject empty samples and samples containing NaN or infinities.
pub(crate) fn check_sample(data: &[f64], what: &str) -> Result<()> {
    if data.is_empty() {
        return Err(StatError::invalid(format!("{} is empty", what)));
    }
    if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
        return Err(StatError::invalid(format!(
            "{} contains a non-finite value at index {}",
            what, pos
        )));
    }
    Ok(())
}

/// Require at least `min` observations (after the usual empty/finite checks).
pub(crate) fn check_min_len(data: &[f64], min: usize, what: &str) -> Result<()> {
    check_sample(data, what)?;
    if data.len() < min {
        return Err(StatError::invalid(format!(
            "{} needs at least {} observations, got {}",
            what,
            min,
            data.len()
        )));
    }
    Ok(())
}

/// Confidence levels and significance levels both live in the open interval (0, 1).
pub(crate) fn check_unit_open(value: f64, what: &str) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(StatError::invalid(format!(
            "{} must be in (0, 1), got {}",
            what, value
        )));
    }
    Ok(())
}
