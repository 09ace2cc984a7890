//! Working with a fitted [`Estimate`]: density evaluation, a Wald interval
//! for the location parameter, and MLE-versus-MoM comparison.

use std::fmt;

use statrs::distribution::{Beta, Continuous, Discrete, Exp, Gamma, Normal, Poisson, Uniform};
use tracing::trace;

use super::{DistributionFamily, Estimate};
use crate::constants::NOTABLE_DIFFERENCE_PERCENT;
use crate::error::{check_unit_open, Result, StatError};
use crate::intervals::ConfidenceInterval;
use crate::special::z_critical_value;

fn unusable(family: DistributionFamily, err: impl fmt::Display) -> StatError {
    StatError::invalid(format!("fitted {} parameters are unusable: {}", family, err))
}

impl Estimate {
    fn param(&self, name: &str) -> Result<f64> {
        self.get(name).ok_or_else(|| {
            StatError::invalid(format!("{} estimate has no '{}' parameter", self.distribution, name))
        })
    }

    /// Fitted density at `x`. For poisson this is the probability mass, and
    /// it is 0 unless `x` is a non-negative integer.
    ///
    /// Fails with `InvalidInput` when the parameters do not describe a proper
    /// distribution (a normal fit to a constant sample, for instance).
    pub fn density(&self, x: f64) -> Result<f64> {
        let family = self.distribution;
        let value = match family {
            DistributionFamily::Normal => Normal::new(self.param("mean")?, self.param("std")?)
                .map_err(|e| unusable(family, e))?
                .pdf(x),
            DistributionFamily::Uniform => Uniform::new(self.param("a")?, self.param("b")?)
                .map_err(|e| unusable(family, e))?
                .pdf(x),
            DistributionFamily::Exponential => Exp::new(self.param("lambda")?)
                .map_err(|e| unusable(family, e))?
                .pdf(x),
            DistributionFamily::Gamma => {
                // statrs takes a rate
                Gamma::new(self.param("shape")?, 1.0 / self.param("scale")?)
                    .map_err(|e| unusable(family, e))?
                    .pdf(x)
            }
            DistributionFamily::Beta => Beta::new(self.param("alpha")?, self.param("beta")?)
                .map_err(|e| unusable(family, e))?
                .pdf(x),
            DistributionFamily::Poisson => {
                let poisson =
                    Poisson::new(self.param("lambda")?).map_err(|e| unusable(family, e))?;
                if x >= 0.0 && x.fract() == 0.0 && x.is_finite() {
                    poisson.pmf(x as u64)
                } else {
                    0.0
                }
            }
        };
        Ok(value)
    }

    /// Wald interval for the location parameter of a normal or poisson fit:
    ///
    ///   normal:   mean ± z·σ/√n
    ///   poisson:  λ ± z·√(λ/n), lower bound clamped at 0
    ///
    /// `z` is the table value for `confidence_level`. Other families have no
    /// closed-form interval here and return `Unsupported`.
    pub fn parameter_interval(&self, confidence_level: f64) -> Result<ConfidenceInterval> {
        check_unit_open(confidence_level, "confidence level")?;
        if self.sample_size == 0 {
            return Err(StatError::invalid("estimate was fitted to an empty sample"));
        }
        let z = z_critical_value(confidence_level);
        let n = self.sample_size as f64;

        let ci = match self.distribution {
            DistributionFamily::Normal => {
                let se = self.param("std")? / n.sqrt();
                ConfidenceInterval::symmetric(self.param("mean")?, se, z, None, "Normal mean (Wald)")
            }
            DistributionFamily::Poisson => {
                let lambda = self.param("lambda")?;
                let se = (lambda / n).sqrt();
                ConfidenceInterval::symmetric(lambda, se, z, None, "Poisson lambda (Wald)")
                    .clamped(0.0, f64::INFINITY)
            }
            other => {
                return Err(StatError::unsupported(format!(
                    "parameter interval for the {} family",
                    other
                )))
            }
        };
        trace!(family = %self.distribution, lower = ci.lower, upper = ci.upper, "parameter interval");
        Ok(ci)
    }
}

/// One parameter of an MLE and a MoM fit, side by side.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParameterComparison {
    pub name: &'static str,
    pub mle: f64,
    pub mom: f64,
    /// |mle − mom| as a percentage of their mean
    pub percent_difference: f64,
}

impl ParameterComparison {
    /// Whether the two estimates differ by more than
    /// [`NOTABLE_DIFFERENCE_PERCENT`].
    pub fn is_notable(&self) -> bool {
        self.percent_difference > NOTABLE_DIFFERENCE_PERCENT
    }
}

fn percent_difference(a: f64, b: f64) -> f64 {
    if a == b {
        return 0.0;
    }
    let centre = (a + b).abs() / 2.0;
    if centre == 0.0 {
        f64::INFINITY
    } else {
        (a - b).abs() / centre * 100.0
    }
}

/// Compare two fits of the same family, parameter by parameter, in the
/// family's conventional parameter order.
pub fn compare_estimates(mle: &Estimate, mom: &Estimate) -> Result<Vec<ParameterComparison>> {
    if mle.distribution != mom.distribution {
        return Err(StatError::invalid(format!(
            "cannot compare a {} fit with a {} fit",
            mle.distribution, mom.distribution
        )));
    }

    mle.distribution
        .parameter_names()
        .iter()
        .map(|&name| {
            let (a, b) = (mle.param(name)?, mom.param(name)?);
            Ok(ParameterComparison {
                name,
                mle: a,
                mom: b,
                percent_difference: percent_difference(a, b),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::{estimate_both, estimate_mle, estimate_mom, EstimationMethod};
    use approx::assert_abs_diff_eq;
    use std::collections::BTreeMap;

    fn fit(family: DistributionFamily, values: &[(&'static str, f64)], n: usize) -> Estimate {
        Estimate {
            method: EstimationMethod::Mle,
            distribution: family,
            params: values.iter().copied().collect::<BTreeMap<_, _>>(),
            sample_size: n,
        }
    }

    #[test]
    fn test_density_values() {
        let normal = fit(DistributionFamily::Normal, &[("mean", 5.0), ("std", 2.0)], 8);
        assert_abs_diff_eq!(normal.density(5.0).unwrap(), 0.199471, epsilon = 1e-6);

        let uniform = fit(DistributionFamily::Uniform, &[("a", 1.0), ("b", 5.0)], 5);
        assert_abs_diff_eq!(uniform.density(2.0).unwrap(), 0.25, epsilon = 1e-12);
        assert_eq!(uniform.density(6.0).unwrap(), 0.0);

        let exp = fit(DistributionFamily::Exponential, &[("lambda", 0.5)], 5);
        assert_abs_diff_eq!(exp.density(2.0).unwrap(), 0.5 * (-1f64).exp(), epsilon = 1e-12);

        // x e^{-x/θ} / θ² at x = θ = 3
        let gamma = fit(DistributionFamily::Gamma, &[("shape", 2.0), ("scale", 3.0)], 5);
        assert_abs_diff_eq!(gamma.density(3.0).unwrap(), (-1f64).exp() / 3.0, epsilon = 1e-9);

        let beta = fit(DistributionFamily::Beta, &[("alpha", 2.0), ("beta", 2.0)], 5);
        assert_abs_diff_eq!(beta.density(0.5).unwrap(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_poisson_mass_only_at_integers() {
        let poisson = fit(DistributionFamily::Poisson, &[("lambda", 2.0)], 10);
        // 2³ e⁻² / 3!
        assert_abs_diff_eq!(poisson.density(3.0).unwrap(), 0.180447, epsilon = 1e-6);
        assert_eq!(poisson.density(2.5).unwrap(), 0.0);
        assert_eq!(poisson.density(-1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_degenerate_fit_has_no_density() {
        let est = estimate_mle(&[3.0, 3.0, 3.0], DistributionFamily::Normal, None).unwrap();
        assert!(matches!(est.density(3.0), Err(StatError::InvalidInput(_))));
    }

    #[test]
    fn test_normal_mean_interval() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let est = estimate_mle(&data, DistributionFamily::Normal, None).unwrap();
        let ci = est.parameter_interval(0.95).unwrap();
        // 5 ± 1.96 · 2/√8
        let margin = 1.96 * 2.0 / 8f64.sqrt();
        assert_abs_diff_eq!(ci.lower, 5.0 - margin, epsilon = 1e-12);
        assert_abs_diff_eq!(ci.upper, 5.0 + margin, epsilon = 1e-12);
        assert_eq!(ci.critical_value, 1.96);
        assert_eq!(ci.degrees_of_freedom, None);
    }

    #[test]
    fn test_poisson_interval_clamped_at_zero() {
        let counts = [0.0, 0.0, 0.0, 1.0];
        let est = estimate_mom(&counts, DistributionFamily::Poisson, None).unwrap();
        let ci = est.parameter_interval(0.95).unwrap();
        // 0.25 - 1.96·0.25 < 0
        assert_eq!(ci.lower, 0.0);
        assert_abs_diff_eq!(ci.upper, 0.25 + 1.96 * 0.25, epsilon = 1e-12);
        assert_eq!(ci.estimate, 0.25);
        assert!(ci.contains(0.25));

        let est = fit(DistributionFamily::Poisson, &[("lambda", 4.0)], 100);
        let ci = est.parameter_interval(0.90).unwrap();
        assert_abs_diff_eq!(ci.lower, 4.0 - 1.645 * 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(ci.margin_of_error, 1.645 * 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_parameter_interval_unsupported_families() {
        let est = fit(DistributionFamily::Gamma, &[("shape", 2.0), ("scale", 3.0)], 5);
        assert!(matches!(est.parameter_interval(0.95), Err(StatError::Unsupported(_))));
        let est = fit(DistributionFamily::Normal, &[("mean", 0.0), ("std", 1.0)], 5);
        assert!(est.parameter_interval(1.0).is_err());
    }

    #[test]
    fn test_compare_uniform_estimates() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let (mle, mom) = estimate_both(&data, DistributionFamily::Uniform, None).unwrap();
        let rows = compare_estimates(&mle, &mom).unwrap();
        assert_eq!(rows.iter().map(|r| r.name).collect::<Vec<_>>(), vec!["a", "b"]);

        // a: 1 vs 3 − √6
        let a_mom = 3.0 - 6f64.sqrt();
        assert_abs_diff_eq!(
            rows[0].percent_difference,
            (1.0 - a_mom).abs() / ((1.0 + a_mom) / 2.0) * 100.0,
            epsilon = 1e-9
        );
        assert!(rows[0].is_notable());
        assert!(rows[1].percent_difference > 0.0);
    }

    #[test]
    fn test_compare_closed_form_estimates_is_zero() {
        let data = [0.5, 1.5, 2.0, 3.5];
        let (mle, mom) = estimate_both(&data, DistributionFamily::Normal, None).unwrap();
        for row in compare_estimates(&mle, &mom).unwrap() {
            assert_eq!(row.percent_difference, 0.0);
            assert!(!row.is_notable());
        }
    }

    #[test]
    fn test_compare_requires_same_family() {
        let data = [0.5, 1.5, 2.0, 3.5];
        let normal = estimate_mle(&data, DistributionFamily::Normal, None).unwrap();
        let poisson = estimate_mom(&data, DistributionFamily::Poisson, None).unwrap();
        assert!(compare_estimates(&normal, &poisson).is_err());
    }

    #[test]
    fn test_percent_difference_edges() {
        assert_eq!(percent_difference(0.0, 0.0), 0.0);
        assert_eq!(percent_difference(1.0, -1.0), f64::INFINITY);
        assert_abs_diff_eq!(percent_difference(100.0, 110.0), 10.0 / 105.0 * 100.0, epsilon = 1e-12);
    }
}
