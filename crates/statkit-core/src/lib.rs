// =============================================================================
// statkit Core Library
// =============================================================================
//
// A statistical-inference engine in pure Rust: give it a sample and a few
// configuration choices, get back descriptive statistics, confidence
// intervals, hypothesis-test verdicts, parameter estimates and sample-size
// plans.
//
// STRUCTURE:
// ----------
// Modules in dependency order; each only uses the ones above it:
//
//   - special:     erf, inverse erf, normal and t CDFs, critical values
//   - descriptive: mean, median, mode, variance, quartiles, shape, summary
//   - intervals:   confidence intervals for means and proportions
//   - testing:     one-sample z- and t-tests
//   - estimation:  MLE / method-of-moments fits for six families, fitted
//                  densities and MLE-vs-MoM comparison
//   - planning:    required sample size for a target margin of error
//   - error:       error types used throughout the library
//
// Every function is pure and synchronous. Nothing is cached, nothing is
// global, and every result is a plain value the caller owns.
//
// ADDING AN OPERATION:
// --------------------
// Hand-computed fixtures go in a #[cfg(test)] block beside the code; anything
// that must hold for every input (bounds, ordering, monotonicity, the three
// test decision rules agreeing) becomes a proptest in tests/properties.rs.
// Entry points and their result records are listed in the `pub use` block
// below as well as in their own module.
//
// =============================================================================

pub mod constants;
pub mod descriptive;
pub mod error;
pub mod estimation;
pub mod intervals;
pub mod planning;
pub mod special;
pub mod testing;

// Flat paths for the entry points: `statkit_core::t_test` as well as
// `statkit_core::testing::t_test`
pub use descriptive::{describe, histogram, DescriptiveSummary, HistogramBin, Moments};
pub use error::{Result, StatError};
pub use estimation::{
    compare_estimates,
    estimate_both,
    estimate_mle,
    estimate_mle_with,
    estimate_mom,
    DistributionFamily,
    Estimate,
    EstimationMethod,
    MleStrategy,
    NumericalMleConfig,
    ParameterComparison,
};
pub use intervals::{
    mean_interval,
    proportion_interval,
    two_proportion_interval,
    two_sample_interval,
    ConfidenceInterval,
    DistributionAssumption,
    ProportionMethod,
    TwoProportionMethod,
    TwoSampleMethod,
};
pub use planning::{
    sample_size_for_mean,
    sample_size_for_mean_with,
    sample_size_for_proportion,
    MeanSizeOptions,
    PlannerConfig,
    PlanningAssumption,
    ProportionSizeOptions,
    SampleSizePlan,
};
pub use special::{t_critical_value, z_critical_value};
pub use testing::{t_test, t_test_p_value, z_test, z_test_p_value, HypothesisTest, Tail};
