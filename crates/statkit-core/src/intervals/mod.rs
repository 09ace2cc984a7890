// =============================================================================
// Confidence Intervals
// =============================================================================
//
// Interval estimates for a mean, a difference of means, a proportion and a
// difference of proportions:
//
//   - one_sample:  mean_interval            (Z or t, chosen by assumptions)
//   - two_sample:  two_sample_interval      (pooled / Welch / paired)
//   - proportion:  proportion_interval      (Wald / Wilson)
//                  two_proportion_interval  (Wald / continuity)
//
// Every interval is `estimate ± critical · SE` before any clamping, and every
// function returns the same `ConfidenceInterval` record so that callers can
// display them uniformly.
//
// CRITICAL VALUES
// ---------------
// Intervals use the TABLE critical values from `special` (1.645 / 1.96 /
// 2.576 for Z, the df-row lookup for t). The hypothesis tests do not; they
// invert the CDFs directly. See `testing` for why.
//
// CLAMPING
// --------
// Proportions live in [0, 1] and their differences in [-1, 1]. When a bound
// falls outside that range it is clamped, and `margin_of_error` is redefined
// as half of the clamped width. The interval is then no longer centred on
// the point estimate.
//
// =============================================================================

mod one_sample;
mod proportion;
mod two_sample;

pub use one_sample::{mean_interval, DistributionAssumption};
pub use proportion::{
    proportion_interval,
    two_proportion_interval,
    ProportionMethod,
    TwoProportionMethod,
};
pub use two_sample::{two_sample_interval, TwoSampleMethod};

/// A confidence interval and how it was built.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConfidenceInterval {
    /// Lower bound (may be -∞ for a one-sided interval)
    pub lower: f64,
    /// Upper bound (may be +∞ for a one-sided interval)
    pub upper: f64,
    /// Half-width; after clamping, half of the clamped width
    pub margin_of_error: f64,
    /// Human-readable name of the construction used
    pub method: &'static str,
    /// The Z or t multiplier applied to the standard error
    pub critical_value: f64,
    /// Point estimate the interval was built around
    pub estimate: f64,
    pub standard_error: f64,
    /// Degrees of freedom behind a t critical value; `None` for Z intervals
    pub degrees_of_freedom: Option<usize>,
}

impl ConfidenceInterval {
    /// `estimate ± critical · se`.
    pub(crate) fn symmetric(
        estimate: f64,
        standard_error: f64,
        critical_value: f64,
        degrees_of_freedom: Option<usize>,
        method: &'static str,
    ) -> Self {
        let margin = critical_value * standard_error;
        Self {
            lower: estimate - margin,
            upper: estimate + margin,
            margin_of_error: margin,
            method,
            critical_value,
            estimate,
            standard_error,
            degrees_of_freedom,
        }
    }

    /// Clamp both bounds into `[min, max]` and recompute the margin.
    pub(crate) fn clamped(mut self, min: f64, max: f64) -> Self {
        self.lower = self.lower.clamp(min, max);
        self.upper = self.upper.clamp(min, max);
        self.margin_of_error = (self.upper - self.lower) / 2.0;
        self
    }

    /// Whether `value` lies in the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_interval() {
        let ci = ConfidenceInterval::symmetric(10.0, 2.0, 1.96, None, "test");
        assert_eq!(ci.lower, 10.0 - 3.92);
        assert_eq!(ci.upper, 10.0 + 3.92);
        assert_eq!(ci.margin_of_error, 3.92);
        assert!(ci.contains(10.0));
        assert!(ci.contains(ci.lower));
        assert!(!ci.contains(14.0));
    }

    #[test]
    fn test_clamping_recomputes_margin() {
        let ci = ConfidenceInterval::symmetric(0.05, 0.05, 1.96, None, "test").clamped(0.0, 1.0);
        assert_eq!(ci.lower, 0.0);
        assert!((ci.upper - 0.148).abs() < 1e-12);
        assert!((ci.margin_of_error - 0.074).abs() < 1e-12);
        // Point estimate is kept even though the interval is no longer centred on it
        assert_eq!(ci.estimate, 0.05);
    }

    #[test]
    fn test_clamping_keeps_order_when_estimate_is_out_of_range() {
        let ci = ConfidenceInterval::symmetric(1.2, 0.01, 1.96, None, "test").clamped(-1.0, 1.0);
        assert_eq!((ci.lower, ci.upper), (1.0, 1.0));
        assert_eq!(ci.margin_of_error, 0.0);
    }
}
