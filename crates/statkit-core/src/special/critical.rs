// =============================================================================
// Critical Values
// =============================================================================
//
// Two-sided critical values for confidence intervals.
//
// Z: exact table for the three standard levels, inverse-erf otherwise.
//
// t: a lookup table rather than a quantile computation. Rows are keyed by
// degrees of freedom (1–25, 30, 40, 50, 60, 100, 1000, 10000); a df that is
// not tabulated resolves to the nearest LOWER row. t critical values shrink
// as df grows, so rounding df down can only widen an interval, never make it
// optimistic. Levels other than 0.90/0.95/0.99 use the 0.95 column.
//
// =============================================================================

use std::f64::consts::SQRT_2;

use super::inverse_erf;
use crate::constants::LEVEL_MATCH_TOLERANCE;

/// The confidence levels with exact table entries, in column order.
pub const STANDARD_LEVELS: [f64; 3] = [0.90, 0.95, 0.99];

const COLUMN_95: usize = 1;

const Z_TABLE: [f64; 3] = [1.645, 1.96, 2.576];

#[rustfmt::skip]
const T_TABLE: [(usize, [f64; 3]); 32] = [
    (1,     [6.314, 12.706, 63.657]),
    (2,     [2.920,  4.303,  9.925]),
    (3,     [2.353,  3.182,  5.841]),
    (4,     [2.132,  2.776,  4.604]),
    (5,     [2.015,  2.571,  4.032]),
    (6,     [1.943,  2.447,  3.707]),
    (7,     [1.895,  2.365,  3.499]),
    (8,     [1.860,  2.306,  3.355]),
    (9,     [1.833,  2.262,  3.250]),
    (10,    [1.812,  2.228,  3.169]),
    (11,    [1.796,  2.201,  3.106]),
    (12,    [1.782,  2.179,  3.055]),
    (13,    [1.771,  2.160,  3.012]),
    (14,    [1.761,  2.145,  2.977]),
    (15,    [1.753,  2.131,  2.947]),
    (16,    [1.746,  2.120,  2.921]),
    (17,    [1.740,  2.110,  2.898]),
    (18,    [1.734,  2.101,  2.878]),
    (19,    [1.729,  2.093,  2.861]),
    (20,    [1.725,  2.086,  2.845]),
    (21,    [1.721,  2.080,  2.831]),
    (22,    [1.717,  2.074,  2.819]),
    (23,    [1.714,  2.069,  2.807]),
    (24,    [1.711,  2.064,  2.797]),
    (25,    [1.708,  2.060,  2.787]),
    (30,    [1.697,  2.042,  2.750]),
    (40,    [1.684,  2.021,  2.704]),
    (50,    [1.676,  2.009,  2.678]),
    (60,    [1.671,  2.000,  2.660]),
    (100,   [1.660,  1.984,  2.626]),
    (1000,  [1.646,  1.962,  2.581]),
    (10000, [1.645,  1.960,  2.576]),
];

/// Column index of a standard confidence level, if `level` is one.
fn standard_column(level: f64) -> Option<usize> {
    STANDARD_LEVELS
        .iter()
        .position(|&l| (l - level).abs() < LEVEL_MATCH_TOLERANCE)
}

/// Two-sided z critical value for a confidence level.
///
/// 0.90, 0.95 and 0.99 come straight from the table (1.645, 1.96, 2.576).
/// Any other level in (0, 1) is derived as `√2 · erf⁻¹(2(1 − α/2) − 1)`.
pub fn z_critical_value(confidence_level: f64) -> f64 {
    if let Some(col) = standard_column(confidence_level) {
        return Z_TABLE[col];
    }
    let alpha = 1.0 - confidence_level;
    (SQRT_2 * inverse_erf(2.0 * (1.0 - alpha / 2.0) - 1.0)).abs()
}

/// Two-sided t critical value from the lookup table.
///
/// `df` rounds down to the nearest tabulated row (0 is treated as 1, anything
/// past 10000 uses the 10000 row). Non-standard levels read the 0.95 column.
pub fn t_critical_value(df: usize, confidence_level: f64) -> f64 {
    let df = df.max(1);
    let (_, row) = T_TABLE
        .iter()
        .rev()
        .find(|(tabulated, _)| *tabulated <= df)
        .unwrap_or(&T_TABLE[0]);
    let col = standard_column(confidence_level).unwrap_or(COLUMN_95);
    row[col]
}
