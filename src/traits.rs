//! Core traits for estimators and transformers.
//!
//! Clustering models implement [`UnsupervisedEstimator`]; preprocessing steps
//! such as [`StandardScaler`](crate::preprocessing::StandardScaler) implement
//! [`Transformer`].

use crate::error::Result;
use crate::primitives::Matrix;

/// Trait for unsupervised learning models.
///
/// # Examples
///
/// ```
/// use assay::prelude::*;
///
/// // Two well separated groups
/// let data = Matrix::from_vec(6, 2, vec![
///     0.0, 0.0, 0.1, 0.1, 0.2, 0.0,
///     10.0, 10.0, 10.1, 10.1, 10.0, 10.2,
/// ]).expect("6x2 matrix");
///
/// let mut kmeans = KMeans::new(2).with_random_state(42);
/// kmeans.fit(&data).expect("fit");
/// let labels = kmeans.predict(&data);
/// assert_eq!(labels.len(), 6);
/// assert_eq!(labels[0], labels[2]);
/// assert_ne!(labels[0], labels[3]);
/// ```
pub trait UnsupervisedEstimator {
    /// The type of labels/clusters produced.
    type Labels;

    /// Fits the model to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails (empty data, invalid parameters, etc.).
    fn fit(&mut self, x: &Matrix<f64>) -> Result<()>;

    /// Predicts cluster assignments for data.
    fn predict(&self, x: &Matrix<f64>) -> Self::Labels;
}

/// Trait for data transformers.
///
/// ```text
/// let mut scaler = StandardScaler::new();
/// let z = scaler.fit_transform(&x)?;
/// ```
pub trait Transformer {
    /// Fits the transformer to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit(&mut self, x: &Matrix<f64>) -> Result<()>;

    /// Transforms data using fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformer is not fitted or the column count
    /// differs from the fitted one.
    fn transform(&self, x: &Matrix<f64>) -> Result<Matrix<f64>>;

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting or transforming fails.
    fn fit_transform(&mut self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}
