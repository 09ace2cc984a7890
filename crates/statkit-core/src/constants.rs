//! Numeric constants shared across modules.

/// Tolerance used when matching a confidence level against a tabulated one.
/// Levels arrive as user-supplied floats (0.95 vs 0.9500000001).
pub const LEVEL_MATCH_TOLERANCE: f64 = 1e-9;

/// Degrees of freedom at and above which the t CDF is replaced by the normal CDF.
pub const T_NORMAL_CUTOVER_DF: f64 = 30.0;

/// Sample size above which a non-normal, unknown-variance mean interval
/// switches from t to z critical values.
pub const CLT_SAMPLE_SIZE: usize = 30;

/// Floor applied to the gamma shape parameter.
pub const GAMMA_SHAPE_FLOOR: f64 = 0.001;

/// Continuity adjustment added to successes in the two-proportion interval.
pub const CONTINUITY_ADJUSTMENT: f64 = 0.5;

/// Bisection iterations for inverting the t CDF (interval shrinks by 2^-n).
pub const QUANTILE_BISECTION_ITERS: usize = 200;

/// MLE and MoM estimates further apart than this (percent of their mean) are
/// flagged by `compare_estimates`.
pub const NOTABLE_DIFFERENCE_PERCENT: f64 = 5.0;
