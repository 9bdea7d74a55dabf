//! Preprocessing transformers.
//!
//! # Example
//!
//! ```
//! use assay::prelude::*;
//! use assay::preprocessing::StandardScaler;
//!
//! // SiO2 (wt%) and Zr (ppm) on very different scales
//! let data = Matrix::from_vec(4, 2, vec![
//!     48.0, 100.0,
//!     52.0, 200.0,
//!     56.0, 300.0,
//!     60.0, 400.0,
//! ]).expect("valid matrix dimensions");
//!
//! let mut scaler = StandardScaler::new();
//! let scaled = scaler.fit_transform(&data).expect("fit_transform should succeed");
//!
//! // Both columns now share the same z-scores
//! assert!((scaled.get(0, 0) - scaled.get(0, 1)).abs() < 1e-12);
//! ```

use crate::error::{AssayError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;
use serde::{Deserialize, Serialize};

/// Standard deviations at or below this are treated as zero variance.
const ZERO_STD: f64 = 1e-12;

/// Standardizes features by removing the mean and scaling to unit variance.
///
/// z = (x - mean) / std, with the sample standard deviation (n − 1
/// denominator). Columns with zero variance map to 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Mean of each feature (computed during fit).
    mean: Option<Vec<f64>>,
    /// Sample standard deviation of each feature (computed during fit).
    std: Option<Vec<f64>>,
}

impl StandardScaler {
    /// Creates an unfitted scaler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-feature means, once fitted.
    #[must_use]
    pub fn mean(&self) -> Option<&[f64]> {
        self.mean.as_deref()
    }

    /// Per-feature sample standard deviations, once fitted.
    #[must_use]
    pub fn std(&self) -> Option<&[f64]> {
        self.std.as_deref()
    }

    /// Returns true if the scaler has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }

    fn fitted(&self) -> Result<(&[f64], &[f64])> {
        match (&self.mean, &self.std) {
            (Some(mean), Some(std)) => Ok((mean, std)),
            _ => Err(AssayError::InvalidInput("scaler not fitted".into())),
        }
    }
}

impl Transformer for StandardScaler {
    /// Computes the mean and sample standard deviation of each feature.
    fn fit(&mut self, x: &Matrix<f64>) -> Result<()> {
        let (n_samples, n_features) = x.shape();
        if n_samples < 2 {
            return Err(AssayError::insufficient("standardization", n_samples, 2));
        }

        let mut mean = vec![0.0; n_features];
        for row in x.rows() {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n_samples as f64;
        }

        let mut std = vec![0.0; n_features];
        for row in x.rows() {
            for ((s, v), m) in std.iter_mut().zip(row).zip(&mean) {
                let diff = v - m;
                *s += diff * diff;
            }
        }
        for s in &mut std {
            *s = (*s / (n_samples - 1) as f64).sqrt();
        }

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    /// Standardizes the data using the fitted mean and std.
    fn transform(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        let (mean, std) = self.fitted()?;
        let (n_samples, n_features) = x.shape();
        if n_features != mean.len() {
            return Err(AssayError::dimension_mismatch(
                "features",
                mean.len(),
                n_features,
            ));
        }

        let mut result = Vec::with_capacity(n_samples * n_features);
        for row in x.rows() {
            for ((v, m), s) in row.iter().zip(mean).zip(std) {
                result.push(if *s > ZERO_STD { (v - m) / s } else { 0.0 });
            }
        }
        Matrix::from_vec(n_samples, n_features, result)
    }
}
