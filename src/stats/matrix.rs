//! All-pairs Pearson correlation matrix.
//!
//! Used for variable grouping and ranking, not significance testing, so only
//! coefficients are stored. Pairs with fewer than three valid observations or
//! a zero-variance side map to 0; the diagonal is 1.
//!
//! The build is O(V²·N). [`CorrelationMatrixJob`] computes one row per
//! [`step`](CorrelationMatrixJob::step) so a host event loop can interleave
//! work; dropping the job cancels it.

use super::correlation::{pearson, valid_pairs, MIN_PAIRS};
use crate::data::SampleMatrix;
use crate::error::{AssayError, Result};
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Symmetric variable × variable Pearson matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    values: Matrix<f64>,
}

impl CorrelationMatrix {
    /// Variable names in matrix order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the matrix has no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of a variable.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Coefficient by position.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.values.get(i, j)
    }

    /// Coefficient by name.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.value(self.index_of(a)?, self.index_of(b)?))
    }

    /// The underlying square matrix.
    #[must_use]
    pub fn as_matrix(&self) -> &Matrix<f64> {
        &self.values
    }

    /// Off-diagonal pairs with `|r| >= min_abs`, strongest first.
    #[must_use]
    pub fn strongest_pairs(&self, min_abs: f64) -> Vec<(String, String, f64)> {
        let n = self.len();
        let mut pairs: Vec<(String, String, f64)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| (i, j, self.value(i, j)))
            .filter(|&(_, _, r)| r.abs() >= min_abs)
            .map(|(i, j, r)| (self.names[i].clone(), self.names[j].clone(), r))
            .collect();
        pairs.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));
        pairs
    }
}

/// Pearson coefficient of one pair, 0 when degenerate.
fn pair_coefficient(x: &[f64], y: &[f64]) -> f64 {
    let (xs, ys) = valid_pairs(x, y);
    if xs.len() < MIN_PAIRS {
        return 0.0;
    }
    pearson(&xs, &ys)
}

/// Incremental correlation matrix build, one row per step.
#[derive(Debug, Clone)]
pub struct CorrelationMatrixJob {
    names: Vec<String>,
    series: Vec<Vec<f64>>,
    values: Matrix<f64>,
    next_row: usize,
}

impl CorrelationMatrixJob {
    /// Prepares a build over named series.
    ///
    /// # Errors
    ///
    /// Returns an error if no variables are given or series lengths differ.
    pub fn new(variables: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let Some(first) = variables.first() else {
            return Err(AssayError::empty_input("correlation matrix variables"));
        };
        let n_obs = first.1.len();
        if let Some((name, series)) = variables.iter().find(|(_, s)| s.len() != n_obs) {
            return Err(AssayError::dimension_mismatch(
                &format!("length of series '{name}'"),
                n_obs,
                series.len(),
            ));
        }

        let v = variables.len();
        let (names, series): (Vec<String>, Vec<Vec<f64>>) = variables.into_iter().unzip();
        Ok(Self {
            names,
            series,
            values: Matrix::eye(v),
            next_row: 0,
        })
    }

    /// Computes the next row of the upper triangle. Returns true while work
    /// remains.
    pub fn step(&mut self) -> bool {
        let v = self.names.len();
        if self.next_row >= v {
            return false;
        }
        let i = self.next_row;
        for j in (i + 1)..v {
            let r = pair_coefficient(&self.series[i], &self.series[j]);
            self.values.set(i, j, r);
            self.values.set(j, i, r);
        }
        self.next_row += 1;
        self.next_row < v
    }

    /// Returns true once every row is computed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.next_row >= self.names.len()
    }

    /// Fraction of rows computed, in [0, 1].
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.names.is_empty() {
            1.0
        } else {
            self.next_row as f64 / self.names.len() as f64
        }
    }

    /// Runs any remaining rows and returns the matrix.
    #[must_use]
    pub fn finish(mut self) -> CorrelationMatrix {
        while self.step() {}
        debug!(variables = self.names.len(), "correlation matrix built");
        CorrelationMatrix {
            names: self.names,
            values: self.values,
        }
    }
}

/// Builds the Pearson matrix over named, row-aligned series.
///
/// # Errors
///
/// Returns an error if no variables are given or series lengths differ.
///
/// # Examples
///
/// ```
/// use assay::stats::correlation_matrix;
///
/// let m = correlation_matrix(&[
///     ("Fe".to_string(), vec![1.0, 2.0, 3.0, 4.0]),
///     ("Mn".to_string(), vec![2.0, 4.0, 6.0, 8.0]),
///     ("Ca".to_string(), vec![5.0, 5.0, 5.0, 5.0]),
/// ]).expect("equal lengths");
///
/// assert!((m.get("Fe", "Mn").expect("known names") - 1.0).abs() < 1e-12);
/// assert_eq!(m.get("Fe", "Ca"), Some(0.0));
/// assert_eq!(m.get("Ca", "Ca"), Some(1.0));
/// ```
pub fn correlation_matrix(variables: &[(String, Vec<f64>)]) -> Result<CorrelationMatrix> {
    Ok(CorrelationMatrixJob::new(variables.to_vec())?.finish())
}

/// Builds the Pearson matrix for selected columns of a sample matrix.
///
/// # Errors
///
/// Returns an error if `names` is empty or names a variable absent from
/// every row.
pub fn correlation_matrix_from_samples(
    samples: &SampleMatrix,
    names: &[String],
) -> Result<CorrelationMatrix> {
    if let Some(missing) = names.iter().find(|n| !samples.has_variable(n)) {
        return Err(AssayError::InvalidInput(format!(
            "unknown variable '{missing}'"
        )));
    }
    let variables: Vec<(String, Vec<f64>)> = names
        .iter()
        .map(|name| (name.clone(), samples.column(name)))
        .collect();
    Ok(CorrelationMatrixJob::new(variables)?.finish())
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
