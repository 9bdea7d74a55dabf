//! Pairwise correlation and regression between two numeric series.
//!
//! # Mathematical Background
//!
//! ## Pearson Correlation
//!
//! ```text
//! r = Σ (x_i - x̄)(y_i - ȳ) / sqrt(Σ (x_i - x̄)² · Σ (y_i - ȳ)²)
//! ```
//!
//! The Bessel-corrected covariance and standard deviations share the same
//! `n - 1` factor, which cancels.
//!
//! ## Spearman Correlation
//!
//! Pearson applied to the rank-transformed series. Ranks are assigned by a
//! stable sort: tied values receive consecutive ranks in input order rather
//! than the averaged rank. This is a known simplification and only matters
//! for heavily tied data (e.g. many values at a detection limit).
//!
//! # Examples
//!
//! ```
//! use assay::stats::{statistics, CorrelationMethod};
//!
//! let x: Vec<f64> = (1..=10_i32).map(f64::from).collect();
//! let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 3.0).collect();
//!
//! let result = statistics(&x, &y, &[CorrelationMethod::Pearson]).expect("supported method");
//! assert!((result.pearson_r.expect("computed") - 1.0).abs() < 1e-12);
//! assert!((result.slope.expect("computed") - 2.0).abs() < 1e-12);
//! ```

use super::significance::correlation_pvalue;
use crate::error::{AssayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of valid pairs for any correlation statistic.
pub const MIN_PAIRS: usize = 3;

/// Correlation method.
///
/// Kendall's tau is reserved: it can be named (and parsed) but requesting it
/// is an [`AssayError::UnsupportedMethod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    /// Pearson product-moment correlation.
    Pearson,
    /// Spearman rank correlation.
    Spearman,
    /// Kendall's tau (not implemented).
    Kendall,
}

impl CorrelationMethod {
    /// Methods that [`statistics`] can compute.
    pub const SUPPORTED: [CorrelationMethod; 2] =
        [CorrelationMethod::Pearson, CorrelationMethod::Spearman];

    /// Lowercase method name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CorrelationMethod::Pearson => "pearson",
            CorrelationMethod::Spearman => "spearman",
            CorrelationMethod::Kendall => "kendall",
        }
    }

    /// Returns true if the method is implemented.
    #[must_use]
    pub fn is_supported(self) -> bool {
        match self {
            CorrelationMethod::Pearson | CorrelationMethod::Spearman => true,
            CorrelationMethod::Kendall => false,
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CorrelationMethod {
    type Err = AssayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pearson" => Ok(CorrelationMethod::Pearson),
            "spearman" => Ok(CorrelationMethod::Spearman),
            "kendall" => Ok(CorrelationMethod::Kendall),
            other => Err(AssayError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Rejects any method that is not implemented.
///
/// # Errors
///
/// Returns [`AssayError::UnsupportedMethod`] naming the first unsupported method.
pub fn ensure_supported(methods: &[CorrelationMethod]) -> Result<()> {
    match methods.iter().find(|m| !m.is_supported()) {
        Some(method) => Err(AssayError::UnsupportedMethod(method.name().to_string())),
        None => Ok(()),
    }
}

/// Correlation and regression statistics for one pair of series.
///
/// When fewer than [`MIN_PAIRS`] valid pairs exist, `error` is set and every
/// numeric field is `None`. Coefficients for methods that were not requested
/// are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Number of valid (finite, paired) observations used
    pub n: usize,
    /// Pearson coefficient
    pub pearson_r: Option<f64>,
    /// Two-tailed p-value of the Pearson coefficient
    pub pearson_p: Option<f64>,
    /// Spearman coefficient
    pub spearman_r: Option<f64>,
    /// Two-tailed p-value of the Spearman coefficient
    pub spearman_p: Option<f64>,
    /// OLS slope of y on x
    pub slope: Option<f64>,
    /// OLS intercept
    pub intercept: Option<f64>,
    /// Coefficient of determination of the OLS fit
    pub r_squared: Option<f64>,
    /// Set instead of the numeric fields when data is insufficient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CorrelationResult {
    /// Result for a pair with too few valid observations.
    #[must_use]
    pub fn insufficient(n: usize) -> Self {
        Self {
            n,
            error: Some(format!(
                "insufficient data: {n} valid pairs, need at least {MIN_PAIRS}"
            )),
            ..Self::default()
        }
    }

    /// Returns true if the result carries an error instead of statistics.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// `(coefficient, p-value)` for a method, if it was computed.
    #[must_use]
    pub fn coefficient(&self, method: CorrelationMethod) -> Option<(f64, f64)> {
        match method {
            CorrelationMethod::Pearson => self.pearson_r.zip(self.pearson_p),
            CorrelationMethod::Spearman => self.spearman_r.zip(self.spearman_p),
            CorrelationMethod::Kendall => None,
        }
    }

    /// True if any of `methods` has `|r| >= corr_threshold` and `p <= p_threshold`.
    #[must_use]
    pub fn is_significant(
        &self,
        methods: &[CorrelationMethod],
        corr_threshold: f64,
        p_threshold: f64,
    ) -> bool {
        if self.is_error() {
            return false;
        }
        methods.iter().any(|&method| {
            self.coefficient(method)
                .is_some_and(|(r, p)| r.abs() >= corr_threshold && p <= p_threshold)
        })
    }
}

/// Ordinary least squares fit of y on x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    /// Slope
    pub slope: f64,
    /// Intercept
    pub intercept: f64,
    /// `1 - SS_res / SS_tot`
    pub r_squared: f64,
}

/// Drops every position where either value is non-finite. Positions past
/// the shorter series are ignored; public callers check lengths first.
pub(crate) fn valid_pairs(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .unzip()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Pearson correlation of two equally long, finite series.
///
/// Returns 0.0 when either series has zero variance or fewer than two values.
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 || is_constant(&x[..n]) || is_constant(&y[..n]) {
        return 0.0;
    }

    let x_mean = mean(&x[..n]);
    let y_mean = mean(&y[..n]);

    let (sxy, sxx, syy) = x[..n].iter().zip(&y[..n]).fold(
        (0.0, 0.0, 0.0),
        |(sxy, sxx, syy), (&xi, &yi)| {
            let dx = xi - x_mean;
            let dy = yi - y_mean;
            (sxy + dx * dy, sxx + dx * dx, syy + dy * dy)
        },
    );

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

/// 1-based ranks assigned by a stable sort. Ties are not averaged: equal
/// values are ranked in input order.
#[must_use]
pub fn rank(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    for (position, &idx) in order.iter().enumerate() {
        ranks[idx] = (position + 1) as f64;
    }
    ranks
}

/// Spearman correlation of two equally long, finite series.
#[must_use]
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    pearson(&rank(x), &rank(y))
}

/// OLS regression of y on x over equally long, finite series.
///
/// A constant x gives slope 0 and intercept `mean(y)`; a constant y gives
/// `r_squared = 0`.
#[must_use]
pub fn linear_regression(x: &[f64], y: &[f64]) -> Regression {
    let n = x.len().min(y.len());
    if n == 0 {
        return Regression {
            slope: 0.0,
            intercept: 0.0,
            r_squared: 0.0,
        };
    }
    let (x, y) = (&x[..n], &y[..n]);
    let x_mean = mean(x);
    let y_mean = mean(y);

    let (sxy, sxx) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(sxy, sxx), (&xi, &yi)| {
            let dx = xi - x_mean;
            (sxy + dx * (yi - y_mean), sxx + dx * dx)
        });

    let slope = if is_constant(x) || sxx == 0.0 {
        0.0
    } else {
        sxy / sxx
    };
    let intercept = y_mean - slope * x_mean;

    let ss_tot: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
    let ss_res: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| (yi - (slope * xi + intercept)).powi(2))
        .sum();

    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    Regression {
        slope,
        intercept,
        r_squared,
    }
}

/// Correlation, significance and regression statistics for two series.
///
/// Positions where either value is non-finite are dropped pairwise. With
/// fewer than [`MIN_PAIRS`] valid pairs the result carries an `error`; this
/// is not an `Err`.
///
/// # Errors
///
/// Returns an error if the series lengths differ or a requested method is
/// not supported.
pub fn statistics(
    x: &[f64],
    y: &[f64],
    methods: &[CorrelationMethod],
) -> Result<CorrelationResult> {
    if x.len() != y.len() {
        return Err(AssayError::DimensionMismatch {
            expected: format!("{} values in x", x.len()),
            actual: format!("{} values in y", y.len()),
        });
    }
    ensure_supported(methods)?;

    let (xs, ys) = valid_pairs(x, y);
    let n = xs.len();
    if n < MIN_PAIRS {
        return Ok(CorrelationResult::insufficient(n));
    }

    let mut result = CorrelationResult {
        n,
        ..CorrelationResult::default()
    };

    if methods.contains(&CorrelationMethod::Pearson) {
        let r = pearson(&xs, &ys);
        result.pearson_r = Some(r);
        result.pearson_p = Some(correlation_pvalue(r, n));
    }
    if methods.contains(&CorrelationMethod::Spearman) {
        let r = spearman(&xs, &ys);
        result.spearman_r = Some(r);
        result.spearman_p = Some(correlation_pvalue(r, n));
    }

    let fit = linear_regression(&xs, &ys);
    result.slope = Some(fit.slope);
    result.intercept = Some(fit.intercept);
    result.r_squared = Some(fit.r_squared);

    Ok(result)
}

#[cfg(test)]
#[path = "correlation_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests_correlation_contract.rs"]
mod tests_correlation_contract;
