//! Top-k eigenpairs of a symmetric matrix by power iteration with deflation.
//!
//! # Algorithm
//!
//! 1. Start from a random unit vector
//! 2. Repeat `v ← normalize(A·v)` until the Rayleigh quotient `vᵀAv` changes
//!    by less than `tol`, or `max_iter` iterations elapse
//! 3. Record `(λ, v)`, deflate `A ← A − λ·v·vᵀ` and repeat
//!
//! Extraction stops early once `λ <= eigen_tol`: what remains is numerical
//! noise (or negative, which a covariance matrix cannot legitimately have).
//! Callers therefore receive at most `k` pairs and must handle fewer.
//!
//! Intended for positive semi-definite matrices (covariance / correlation).
//! Non-convergence is not an error; the estimate at the iteration cap is
//! returned.
//!
//! Convergence is judged on the eigenvalue, not the vector. When
//! eigenvalues are nearly equal the Rayleigh quotient settles long before
//! the vector does, so eigenvectors of a near-flat spectrum are approximate:
//! they may be off by ~1e-2 from orthogonal and vary with the seed. The
//! eigenvalues stay accurate to the gap between them.

use crate::error::{AssayError, Result};
use crate::primitives::{dot, Matrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// An eigenvalue and its unit eigenvector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EigenPair {
    /// Eigenvalue
    pub eigenvalue: f64,
    /// Unit-norm eigenvector, oriented so its largest-magnitude entry is positive
    pub eigenvector: Vec<f64>,
}

/// Power-iteration eigen solver.
///
/// # Examples
///
/// ```
/// use assay::decomposition::PowerIteration;
/// use assay::primitives::Matrix;
///
/// let a = Matrix::diag(&[5.0, 3.0, 1.0]);
/// let pairs = PowerIteration::new()
///     .with_random_state(7)
///     .top_eigen_pairs(&a, 3)
///     .expect("symmetric input");
///
/// assert_eq!(pairs.len(), 3);
/// assert!((pairs[0].eigenvalue - 5.0).abs() < 1e-6);
/// assert!((pairs[0].eigenvector[0] - 1.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerIteration {
    /// Iteration cap per eigenpair.
    max_iter: usize,
    /// Convergence tolerance on the Rayleigh quotient change.
    tol: f64,
    /// Eigenvalues at or below this are discarded.
    eigen_tol: f64,
    /// Random seed for the start vectors.
    random_state: Option<u64>,
}

impl Default for PowerIteration {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerIteration {
    /// Creates a solver with 100 iterations, tolerance 1e-8 and eigenvalue
    /// cut-off 1e-10.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_iter: 100,
            tol: 1e-8,
            eigen_tol: 1e-10,
            random_state: None,
        }
    }

    /// Sets the maximum number of iterations per eigenpair.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the Rayleigh-quotient convergence tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Sets the eigenvalue cut-off.
    #[must_use]
    pub fn with_eigen_tol(mut self, eigen_tol: f64) -> Self {
        self.eigen_tol = eigen_tol;
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

    /// Extracts up to `k` eigenpairs in descending eigenvalue order.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is not square, not symmetric, has
    /// non-finite entries, or `k` exceeds its dimension.
    pub fn top_eigen_pairs(&self, matrix: &Matrix<f64>, k: usize) -> Result<Vec<EigenPair>> {
        validate_symmetric(matrix)?;
        let n = matrix.n_rows();
        if k > n {
            return Err(AssayError::invalid_hyperparameter(
                "k",
                k,
                &format!("<= matrix dimension {n}"),
            ));
        }

        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut residual = matrix.clone();
        let mut pairs = Vec::with_capacity(k);

        for component in 0..k {
            let (eigenvalue, eigenvector, iterations) = self.dominant_pair(&residual, &mut rng);
            if eigenvalue <= self.eigen_tol {
                debug!(
                    component,
                    eigenvalue, "eigenvalue below tolerance, stopping extraction"
                );
                break;
            }
            trace!(component, eigenvalue, iterations, "eigenpair extracted");

            residual.sub_outer(eigenvalue, &eigenvector);
            pairs.push(EigenPair {
                eigenvalue,
                eigenvector: orient(eigenvector),
            });
        }

        pairs.sort_by(|a, b| b.eigenvalue.total_cmp(&a.eigenvalue));
        Ok(pairs)
    }

    /// Dominant eigenpair of `a` and the iterations used.
    fn dominant_pair(&self, a: &Matrix<f64>, rng: &mut StdRng) -> (f64, Vec<f64>, usize) {
        let n = a.n_rows();
        let mut v: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        if !normalize(&mut v) {
            v = vec![0.0; n];
            v[0] = 1.0;
        }

        let mut w = multiply(a, &v);
        let mut rayleigh = dot(&v, &w);

        for iteration in 1..=self.max_iter {
            v = w;
            if !normalize(&mut v) {
                // A·v vanished: v lies in the null space
                return (0.0, v, iteration);
            }
            w = multiply(a, &v);
            let next = dot(&v, &w);
            let converged = (next - rayleigh).abs() < self.tol;
            rayleigh = next;
            if converged {
                return (rayleigh, v, iteration);
            }
        }

        (rayleigh, v, self.max_iter)
    }
}

/// Top-k eigenpairs with the default solver.
///
/// # Errors
///
/// See [`PowerIteration::top_eigen_pairs`].
pub fn top_eigen_pairs(matrix: &Matrix<f64>, k: usize) -> Result<Vec<EigenPair>> {
    PowerIteration::new().top_eigen_pairs(matrix, k)
}

fn validate_symmetric(matrix: &Matrix<f64>) -> Result<()> {
    let (rows, cols) = matrix.shape();
    if rows != cols {
        return Err(AssayError::DimensionMismatch {
            expected: format!("square matrix ({rows}x{rows})"),
            actual: format!("{rows}x{cols}"),
        });
    }
    if matrix.as_slice().iter().any(|v| !v.is_finite()) {
        return Err(AssayError::InvalidInput(
            "matrix contains non-finite entries".into(),
        ));
    }
    let scale = matrix
        .as_slice()
        .iter()
        .fold(1.0_f64, |acc, v| acc.max(v.abs()));
    if !matrix.is_symmetric(1e-9 * scale) {
        return Err(AssayError::InvalidInput("matrix is not symmetric".into()));
    }
    Ok(())
}

fn multiply(a: &Matrix<f64>, v: &[f64]) -> Vec<f64> {
    a.rows().map(|row| dot(row, v)).collect()
}

/// Normalizes in place; false if the vector is (numerically) zero.
fn normalize(v: &mut [f64]) -> bool {
    let norm = dot(v, v).sqrt();
    if norm <= f64::MIN_POSITIVE || !norm.is_finite() {
        return false;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
    true
}

/// Flips the sign so the largest-magnitude entry is positive.
fn orient(mut v: Vec<f64>) -> Vec<f64> {
    let pivot = v
        .iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        for x in &mut v {
            *x = -*x;
        }
    }
    v
}

#[cfg(test)]
#[path = "eigen_tests.rs"]
mod tests;
