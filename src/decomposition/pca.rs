//! Principal component analysis of sample rows.
//!
//! # Pipeline
//!
//! 1. Admit rows with at least `max(ceil(row_threshold·V), 2)` parseable
//!    fields; impute the rest of their fields with the column mean over all
//!    parseable values (computed before admission)
//! 2. Standardize retained rows ([`StandardScaler`], n − 1 denominator)
//! 3. Covariance `ZᵀZ / (n − 1)` of the standardized data
//! 4. All eigenpairs by power iteration with deflation
//! 5. Scores = standardized row · eigenvector
//!
//! Loadings are the raw unit eigenvectors, never scaled by √λ.
//! [`PcaResult::biplot_vectors`] follows the same convention.
//!
//! Rows that fail admission keep their position in every row-aligned output:
//! a zero score vector and cluster −1.

use super::eigen::PowerIteration;
use crate::cluster::{cluster_scores, KSelection};
use crate::data::SampleMatrix;
use crate::error::{AssayError, Result};
use crate::preprocessing::StandardScaler;
use crate::primitives::{dot, Matrix};
use crate::traits::Transformer;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Cluster id of rows that were excluded or not clustered.
pub const UNCLUSTERED: i32 = -1;

/// Minimum retained rows for a decomposition.
pub const MIN_PCA_ROWS: usize = 3;

/// Components kept when none are requested.
pub const DEFAULT_COMPONENTS: usize = 2;

/// PCA settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PcaConfig {
    /// Components to keep; `None` means [`DEFAULT_COMPONENTS`].
    pub n_components: Option<usize>,
    /// Fraction of variables that must parse for a row to be retained.
    pub row_threshold: f64,
    /// Seed for the eigen solver start vectors.
    pub random_state: Option<u64>,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            n_components: Some(2),
            row_threshold: 0.8,
            random_state: None,
        }
    }
}

impl PcaConfig {
    /// Two components, 80 % row threshold, unseeded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the requested number of components (`None` for the default of 2).
    #[must_use]
    pub fn with_n_components(mut self, n_components: Option<usize>) -> Self {
        self.n_components = n_components;
        self
    }

    /// Sets the row admission threshold.
    #[must_use]
    pub fn with_row_threshold(mut self, row_threshold: f64) -> Self {
        self.row_threshold = row_threshold;
        self
    }

    /// Sets the random seed for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Sets or clears the random seed.
    #[must_use]
    pub fn with_optional_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for zero requested components or a
    /// row threshold outside (0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.n_components == Some(0) {
            return Err(AssayError::invalid_hyperparameter(
                "n_components",
                0,
                ">= 1",
            ));
        }
        if self.row_threshold.is_nan() || self.row_threshold <= 0.0 || self.row_threshold > 1.0 {
            return Err(AssayError::invalid_hyperparameter(
                "row_threshold",
                self.row_threshold,
                "in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Display arrow for one variable on a PC1/PC2 biplot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiplotVector {
    /// Variable name
    pub variable: String,
    /// PC1 coordinate
    pub x: f64,
    /// PC2 coordinate
    pub y: f64,
}

/// Outcome of a PCA run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaResult {
    /// Variables in column order
    pub variables: Vec<String>,
    /// Scores, one row per input row (zeros for excluded rows) × components
    pub scores: Matrix<f64>,
    /// Raw unit eigenvectors, components × variables
    pub loadings: Matrix<f64>,
    /// Eigenvalues of the kept components, descending
    pub eigenvalues: Vec<f64>,
    /// Percentage of total variance per kept component
    pub explained_variance: Vec<f64>,
    /// Running sum of `explained_variance`, capped at 100
    pub cumulative_variance: Vec<f64>,
    /// Cluster per input row, [`UNCLUSTERED`] for excluded or unclustered rows
    pub clusters: Vec<i32>,
    /// Indices of rows used in the fit
    pub retained_rows: Vec<usize>,
    /// Indices of rows that failed admission
    pub excluded_rows: Vec<usize>,
    /// Column means of the imputed retained data
    pub means: Vec<f64>,
    /// Column sample standard deviations of the imputed retained data
    pub std_devs: Vec<f64>,
}

impl PcaResult {
    /// Number of kept components.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Scores of the retained rows only, in retained order.
    #[must_use]
    pub fn retained_scores(&self) -> Matrix<f64> {
        let cols = self.scores.n_cols();
        let mut out = Matrix::zeros(self.retained_rows.len(), cols);
        for (i, &row) in self.retained_rows.iter().enumerate() {
            for j in 0..cols {
                out.set(i, j, self.scores.get(row, j));
            }
        }
        out
    }

    /// Loading arrows on PC1/PC2, stretched so the longest arrow reaches the
    /// largest absolute PC1/PC2 score. Empty with fewer than two components.
    #[must_use]
    pub fn biplot_vectors(&self) -> Vec<BiplotVector> {
        if self.n_components() < 2 {
            return Vec::new();
        }
        let pc1 = self.loadings.row(0);
        let pc2 = self.loadings.row(1);

        let max_arrow = pc1
            .iter()
            .zip(pc2)
            .map(|(x, y)| x.hypot(*y))
            .fold(0.0_f64, f64::max);
        let max_score = self
            .retained_rows
            .iter()
            .flat_map(|&row| [self.scores.get(row, 0), self.scores.get(row, 1)])
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let scale = if max_arrow > 0.0 && max_score > 0.0 {
            max_score / max_arrow
        } else {
            1.0
        };

        self.variables
            .iter()
            .zip(pc1.iter().zip(pc2))
            .map(|(variable, (x, y))| BiplotVector {
                variable: variable.clone(),
                x: x * scale,
                y: y * scale,
            })
            .collect()
    }
}

/// PCA engine.
///
/// # Examples
///
/// ```
/// use assay::data::SampleMatrix;
/// use assay::decomposition::{Pca, PcaConfig};
///
/// let samples = SampleMatrix::from_columns(&[
///     ("SiO2", vec![48.0, 52.0, 55.0, 60.0, 66.0, 71.0]),
///     ("MgO", vec![9.0, 7.5, 6.0, 4.0, 2.0, 0.8]),
///     ("K2O", vec![0.4, 1.1, 0.7, 1.9, 1.2, 2.6]),
/// ]);
/// let variables = ["SiO2", "MgO", "K2O"].map(String::from);
///
/// let result = Pca::new(PcaConfig::new().with_random_state(3))
///     .run(&samples, &variables)
///     .expect("enough data");
/// assert_eq!(result.n_components(), 2);
/// assert!(result.explained_variance[0] > 60.0);
/// assert!(result.clusters.iter().all(|&c| c == -1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pca {
    config: PcaConfig,
}

impl Pca {
    /// Creates an engine with the given settings.
    #[must_use]
    pub fn new(config: PcaConfig) -> Self {
        Self { config }
    }

    /// Engine settings.
    #[must_use]
    pub fn config(&self) -> &PcaConfig {
        &self.config
    }

    /// Runs PCA without clustering; every cluster id is [`UNCLUSTERED`].
    ///
    /// # Errors
    ///
    /// - `InvalidHyperparameter` for invalid settings
    /// - `InvalidInput` for a variable absent from every row
    /// - `InsufficientData` for fewer than 2 variables, fewer than 3
    ///   retained rows, or no variance at all
    pub fn run(&self, samples: &SampleMatrix, variables: &[String]) -> Result<PcaResult> {
        self.config.validate()?;
        if let Some(unknown) = variables.iter().find(|v| !samples.has_variable(v)) {
            return Err(AssayError::InvalidInput(format!(
                "unknown variable '{unknown}'"
            )));
        }
        let breakdown = || -> Vec<(String, usize)> {
            variables
                .iter()
                .map(|v| (v.clone(), samples.valid_count(v)))
                .collect()
        };

        let n_vars = variables.len();
        if n_vars < 2 {
            return Err(AssayError::InsufficientData {
                context: "PCA variables".into(),
                found: n_vars,
                required: 2,
                breakdown: breakdown(),
            });
        }

        // Admission and imputation
        let column_means: Vec<f64> = variables
            .iter()
            .map(|v| samples.column_mean(v).unwrap_or(0.0))
            .collect();
        let min_fields = ((self.config.row_threshold * n_vars as f64).ceil() as usize).max(2);
        let (retained_rows, excluded_rows): (Vec<usize>, Vec<usize>) = (0..samples.len())
            .partition(|&row| samples.parsed_fields(row, variables) >= min_fields);

        debug!(
            retained = retained_rows.len(),
            excluded = excluded_rows.len(),
            min_fields,
            "PCA row admission"
        );
        if retained_rows.len() < MIN_PCA_ROWS {
            return Err(AssayError::InsufficientData {
                context: "PCA rows".into(),
                found: retained_rows.len(),
                required: MIN_PCA_ROWS,
                breakdown: breakdown(),
            });
        }

        let mut data = Matrix::zeros(retained_rows.len(), n_vars);
        for (i, &row) in retained_rows.iter().enumerate() {
            for (j, name) in variables.iter().enumerate() {
                data.set(i, j, samples.value(row, name).unwrap_or(column_means[j]));
            }
        }

        // Standardize and decompose
        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(&data)?;
        let n = retained_rows.len();
        let covariance = z.transpose().matmul(&z)?.mul_scalar(1.0 / (n - 1) as f64);

        let pairs = PowerIteration::new()
            .with_optional_random_state(self.config.random_state)
            .top_eigen_pairs(&covariance, n_vars)?;
        let total: f64 = pairs.iter().map(|p| p.eigenvalue).sum();

        let requested = self.config.n_components.unwrap_or(DEFAULT_COMPONENTS);
        let n_components = requested.min(n_vars).min(n - 1).min(pairs.len());
        if n_components < requested.min(n_vars).min(n - 1) {
            warn!(
                requested,
                available = pairs.len(),
                "fewer non-degenerate components than requested"
            );
        }
        if n_components == 0 {
            return Err(AssayError::InsufficientData {
                context: "PCA components with non-zero variance".into(),
                found: 0,
                required: 1,
                breakdown: breakdown(),
            });
        }
        let kept = &pairs[..n_components];

        let mut loadings = Matrix::zeros(n_components, n_vars);
        for (c, pair) in kept.iter().enumerate() {
            for (j, &v) in pair.eigenvector.iter().enumerate() {
                loadings.set(c, j, v);
            }
        }

        let mut scores = Matrix::zeros(samples.len(), n_components);
        for (i, &row) in retained_rows.iter().enumerate() {
            let standardized = z.row(i);
            for (c, pair) in kept.iter().enumerate() {
                scores.set(row, c, dot(standardized, &pair.eigenvector));
            }
        }

        let eigenvalues: Vec<f64> = kept.iter().map(|p| p.eigenvalue).collect();
        let explained_variance: Vec<f64> = eigenvalues
            .iter()
            .map(|l| l / total * 100.0)
            .collect();
        let cumulative_variance: Vec<f64> = explained_variance
            .iter()
            .scan(0.0, |acc, v| {
                *acc += v;
                Some(acc.min(100.0))
            })
            .collect();

        debug!(
            n_components,
            eigenvalues = ?eigenvalues,
            cumulative = cumulative_variance.last().copied().unwrap_or(0.0),
            "PCA complete"
        );

        Ok(PcaResult {
            variables: variables.to_vec(),
            scores,
            loadings,
            eigenvalues,
            explained_variance,
            cumulative_variance,
            clusters: vec![UNCLUSTERED; samples.len()],
            retained_rows,
            excluded_rows,
            means: scaler.mean().map(<[f64]>::to_vec).unwrap_or_default(),
            std_devs: scaler.std().map(<[f64]>::to_vec).unwrap_or_default(),
        })
    }

    /// Runs PCA, then clusters the retained rows on PC1/PC2 and writes their
    /// labels into `clusters`.
    ///
    /// # Errors
    ///
    /// Any error of [`Pca::run`] or [`KSelection::select`].
    pub fn run_with_clusters(
        &self,
        samples: &SampleMatrix,
        variables: &[String],
        selection: &KSelection,
    ) -> Result<PcaResult> {
        let mut result = self.run(samples, variables)?;
        let assignment = cluster_scores(&result.retained_scores(), selection)?;
        for (&row, &label) in result.retained_rows.iter().zip(&assignment.labels) {
            result.clusters[row] = i32::try_from(label).unwrap_or(UNCLUSTERED);
        }
        debug!(k = assignment.k, "PCA scores clustered");
        Ok(result)
    }
}

/// Runs PCA with the given settings and no clustering.
///
/// # Errors
///
/// See [`Pca::run`].
pub fn run_pca(
    samples: &SampleMatrix,
    variables: &[String],
    config: &PcaConfig,
) -> Result<PcaResult> {
    Pca::new(config.clone()).run(samples, variables)
}

#[cfg(test)]
#[path = "pca_tests.rs"]
mod tests;
