// =============================================================================
// Parameter Estimation
// =============================================================================
//
// Fit a distribution family to a sample by maximum likelihood (MLE) or the
// method of moments (MoM).
//
//   family        parameters       MLE                    MoM
//   ------        ----------       ---                    ---
//   normal        mean, std        x̄, σ (divisor n)       same
//   uniform       a, b             min, max               x̄ ∓ √(12σ²)/2
//   exponential   lambda           1/x̄                    same
//   poisson       lambda           x̄                      same
//   gamma         shape, scale     see below              x̄²/σ², σ²/x̄
//   beta          alpha, beta      see below              x̄·s, (1−x̄)·s
//                                                          s = x̄(1−x̄)/σ² − 1
//
// GAMMA AND BETA MLE
// ------------------
// Neither has a closed-form MLE. By default (`MleStrategy::MomentApproximation`)
// the "MLE" for these two families IS the moment estimate. That is a known
// simplification and the strategy is named so that nobody mistakes it for the
// real thing.
//
// `MleStrategy::Numerical` solves the likelihood equations with Newton's
// method, seeded at the moment estimate (see `numerical.rs`). It needs
// strictly positive data for gamma and data strictly inside (0, 1) for beta,
// because the likelihood involves ln x (and ln(1 − x)).
//
// The moment formulas use the POPULATION variance σ² (divisor n), and can
// take caller-supplied `Moments` to skip recomputing mean and std.
//
// USING A FIT
// -----------
// `fitted.rs` evaluates the fitted density (PMF for poisson), builds a Wald
// interval for the location parameter of the normal and poisson fits, and
// compares an MLE against a MoM estimate parameter by parameter.
//
// =============================================================================

mod fitted;
mod moments;
mod numerical;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::descriptive::Moments;
use crate::error::{check_sample, Result, StatError};

pub use fitted::{compare_estimates, ParameterComparison};
pub use numerical::NumericalMleConfig;

// =============================================================================
// Selectors
// =============================================================================

/// Distribution families that can be fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DistributionFamily {
    Normal,
    Uniform,
    Exponential,
    Poisson,
    Gamma,
    Beta,
}

impl DistributionFamily {
    pub const ALL: [DistributionFamily; 6] = [
        DistributionFamily::Normal,
        DistributionFamily::Uniform,
        DistributionFamily::Exponential,
        DistributionFamily::Poisson,
        DistributionFamily::Gamma,
        DistributionFamily::Beta,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DistributionFamily::Normal => "normal",
            DistributionFamily::Uniform => "uniform",
            DistributionFamily::Exponential => "exponential",
            DistributionFamily::Poisson => "poisson",
            DistributionFamily::Gamma => "gamma",
            DistributionFamily::Beta => "beta",
        }
    }

    /// Parameter names, in the order they are conventionally written.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            DistributionFamily::Normal => &["mean", "std"],
            DistributionFamily::Uniform => &["a", "b"],
            DistributionFamily::Exponential | DistributionFamily::Poisson => &["lambda"],
            DistributionFamily::Gamma => &["shape", "scale"],
            DistributionFamily::Beta => &["alpha", "beta"],
        }
    }
}

impl fmt::Display for DistributionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionFamily {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" | "gaussian" => Ok(DistributionFamily::Normal),
            "uniform" => Ok(DistributionFamily::Uniform),
            "exponential" | "exp" => Ok(DistributionFamily::Exponential),
            "poisson" => Ok(DistributionFamily::Poisson),
            "gamma" => Ok(DistributionFamily::Gamma),
            "beta" => Ok(DistributionFamily::Beta),
            other => Err(StatError::unsupported(format!("distribution '{}'", other))),
        }
    }
}

/// Which estimator produced an [`Estimate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EstimationMethod {
    /// Maximum likelihood
    Mle,
    /// Method of moments
    Mom,
}

impl FromStr for EstimationMethod {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mle" | "maximum-likelihood" => Ok(EstimationMethod::Mle),
            "mom" | "moments" | "method-of-moments" => Ok(EstimationMethod::Mom),
            other => Err(StatError::unsupported(format!("estimation method '{}'", other))),
        }
    }
}

/// How gamma and beta "MLE" is computed. Other families ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MleStrategy {
    /// Report the moment estimates as the MLE
    #[default]
    MomentApproximation,
    /// Newton–Raphson on the likelihood equations
    Numerical(NumericalMleConfig),
}

// =============================================================================
// Result record
// =============================================================================

/// Fitted parameters of a distribution family.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Estimate {
    pub method: EstimationMethod,
    pub distribution: DistributionFamily,
    /// Parameter name -> value; names are `distribution.parameter_names()`
    pub params: BTreeMap<&'static str, f64>,
    /// Number of observations the fit was computed from
    pub sample_size: usize,
}

impl Estimate {
    fn new(
        method: EstimationMethod,
        distribution: DistributionFamily,
        values: &[(&'static str, f64)],
        sample_size: usize,
    ) -> Self {
        Self {
            method,
            distribution,
            params: values.iter().copied().collect(),
            sample_size,
        }
    }

    /// Value of a named parameter, if the family has it.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Method-of-moments estimate.
///
/// # Arguments
/// * `data` - The sample
/// * `family` - Distribution to fit
/// * `moments` - Optional precomputed mean and population std
pub fn estimate_mom(
    data: &[f64],
    family: DistributionFamily,
    moments: Option<&Moments>,
) -> Result<Estimate> {
    check_sample(data, "sample")?;
    let m = Moments::resolve(data, moments)?;
    let values = moments::method_of_moments(family, &m)?;
    debug!(%family, ?values, "method-of-moments estimate");
    Ok(Estimate::new(EstimationMethod::Mom, family, &values, data.len()))
}

/// Maximum-likelihood estimate with the default strategy
/// ([`MleStrategy::MomentApproximation`] for gamma and beta).
pub fn estimate_mle(
    data: &[f64],
    family: DistributionFamily,
    moments: Option<&Moments>,
) -> Result<Estimate> {
    estimate_mle_with(data, family, moments, MleStrategy::default())
}

/// Maximum-likelihood estimate with an explicit strategy for gamma and beta.
pub fn estimate_mle_with(
    data: &[f64],
    family: DistributionFamily,
    moments: Option<&Moments>,
    strategy: MleStrategy,
) -> Result<Estimate> {
    check_sample(data, "sample")?;
    let m = Moments::resolve(data, moments)?;

    let values = match (family, strategy) {
        (DistributionFamily::Uniform, _) => {
            let a = data.iter().copied().fold(f64::INFINITY, f64::min);
            let b = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            vec![("a", a), ("b", b)]
        }
        (DistributionFamily::Gamma, MleStrategy::Numerical(config)) => {
            let (shape, scale) = numerical::gamma_mle(data, &m, &config)?;
            vec![("shape", shape), ("scale", scale)]
        }
        (DistributionFamily::Beta, MleStrategy::Numerical(config)) => {
            let (alpha, beta) = numerical::beta_mle(data, &m, &config)?;
            vec![("alpha", alpha), ("beta", beta)]
        }
        // Normal, exponential and poisson MLEs coincide with the moment
        // estimates; gamma and beta fall back to them by strategy.
        _ => moments::method_of_moments(family, &m)?,
    };

    debug!(%family, ?strategy, ?values, "maximum-likelihood estimate");
    Ok(Estimate::new(EstimationMethod::Mle, family, &values, data.len()))
}

/// Both estimates side by side, `(mle, mom)`, sharing one set of moments.
pub fn estimate_both(
    data: &[f64],
    family: DistributionFamily,
    moments: Option<&Moments>,
) -> Result<(Estimate, Estimate)> {
    check_sample(data, "sample")?;
    let m = Moments::resolve(data, moments)?;
    Ok((
        estimate_mle(data, family, Some(&m))?,
        estimate_mom(data, family, Some(&m))?,
    ))
}
