//! K-Means clustering with farthest-point seeding.

use crate::error::{AssayError, Result};
use crate::metrics::inertia;
use crate::primitives::Matrix;
use crate::traits::UnsupervisedEstimator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Number of leading dimensions used for distances.
pub(crate) const CLUSTER_DIMS: usize = 2;

/// K-Means clustering on the first two dimensions of the data.
///
/// # Algorithm
///
/// 1. Seed: a random point, then repeatedly the point farthest from its
///    nearest chosen centroid
/// 2. Assign each point to its nearest centroid
/// 3. Move centroids to the mean of their points (empty clusters stay put)
/// 4. Repeat until no label changes or `max_iter` passes
///
/// With no more points than clusters every point is its own cluster.
///
/// # Examples
///
/// ```
/// use assay::prelude::*;
///
/// let data = Matrix::from_vec(6, 2, vec![
///     1.0, 2.0,
///     1.5, 1.8,
///     5.0, 8.0,
///     8.0, 8.0,
///     1.0, 0.6,
///     9.0, 11.0,
/// ]).expect("Valid matrix dimensions and data length");
///
/// let mut kmeans = KMeans::new(2).with_random_state(7);
/// kmeans.fit(&data).expect("Fit succeeds with valid data");
///
/// let labels = kmeans.predict(&data);
/// assert_eq!(labels.len(), 6);
/// assert!(labels.iter().all(|&l| l < 2));
/// ```
///
/// # Performance
///
/// - Time complexity: O(nki) where n=points, k=clusters, i=iterations
/// - Space complexity: O(n + k)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeans {
    /// Number of clusters.
    n_clusters: usize,
    /// Maximum Lloyd passes.
    max_iter: usize,
    /// Random seed for the first centroid.
    random_state: Option<u64>,
    /// Cluster centroids after fitting.
    centroids: Option<Matrix<f64>>,
    /// Labels for training data.
    labels: Option<Vec<usize>>,
    /// Within-cluster sum of squares.
    wcss: f64,
    /// Number of iterations run.
    n_iter: usize,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(3)
    }
}

impl KMeans {
    /// Creates a new K-Means with the specified number of clusters.
    #[must_use]
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            max_iter: 100,
            random_state: None,
            centroids: None,
            labels: None,
            wcss: 0.0,
            n_iter: 0,
        }
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
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

    /// Requested number of clusters.
    #[must_use]
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Cluster centroids (first two dimensions), once fitted.
    #[must_use]
    pub fn centroids(&self) -> Option<&Matrix<f64>> {
        self.centroids.as_ref()
    }

    /// Labels of the training data, once fitted.
    #[must_use]
    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    /// Within-cluster sum of squares of the training data.
    #[must_use]
    pub fn wcss(&self) -> f64 {
        self.wcss
    }

    /// Returns the number of iterations run.
    #[must_use]
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Returns true if the model has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.centroids.is_some()
    }

    /// Greedy farthest-point seeding.
    fn farthest_point_init(&self, x: &Matrix<f64>) -> Matrix<f64> {
        let n_samples = x.n_rows();
        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut chosen = vec![false; n_samples];
        let first = rng.gen_range(0..n_samples);
        chosen[first] = true;
        let mut seeds = vec![first];
        let mut min_distances: Vec<f64> = (0..n_samples)
            .map(|i| squared_distance(x.row(i), x.row(first)))
            .collect();

        while seeds.len() < self.n_clusters {
            let mut next = None;
            let mut max_dist = f64::NEG_INFINITY;
            for (i, &dist) in min_distances.iter().enumerate() {
                if !chosen[i] && dist > max_dist {
                    max_dist = dist;
                    next = Some(i);
                }
            }
            let Some(next) = next else { break };

            chosen[next] = true;
            seeds.push(next);
            for (i, min_dist) in min_distances.iter_mut().enumerate() {
                *min_dist = min_dist.min(squared_distance(x.row(i), x.row(next)));
            }
        }

        let rows: Vec<Vec<f64>> = seeds.iter().map(|&i| x.row(i).to_vec()).collect();
        gather(&rows, x.n_cols())
    }

    /// Moves each centroid to the mean of its points; empty clusters keep
    /// their previous position.
    fn update_centroids(x: &Matrix<f64>, labels: &[usize], previous: &Matrix<f64>) -> Matrix<f64> {
        let (n_clusters, n_features) = previous.shape();
        let mut sums = vec![vec![0.0; n_features]; n_clusters];
        let mut counts = vec![0usize; n_clusters];

        for (i, &label) in labels.iter().enumerate() {
            counts[label] += 1;
            for (s, v) in sums[label].iter_mut().zip(x.row(i)) {
                *s += v;
            }
        }

        let rows: Vec<Vec<f64>> = sums
            .into_iter()
            .zip(&counts)
            .enumerate()
            .map(|(k, (sum, &count))| {
                if count == 0 {
                    previous.row(k).to_vec()
                } else {
                    sum.into_iter().map(|s| s / count as f64).collect()
                }
            })
            .collect();
        gather(&rows, n_features)
    }
}

impl UnsupervisedEstimator for KMeans {
    type Labels = Vec<usize>;

    /// Fits the model on the first two columns of `x`.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` has no rows or `n_clusters` is zero.
    fn fit(&mut self, x: &Matrix<f64>) -> Result<()> {
        if self.n_clusters == 0 {
            return Err(AssayError::invalid_hyperparameter("n_clusters", 0, ">= 1"));
        }
        if x.n_rows() == 0 {
            return Err(AssayError::empty_input("k-means points"));
        }

        let x = leading_columns(x, CLUSTER_DIMS);
        let n_samples = x.n_rows();

        if n_samples <= self.n_clusters {
            self.labels = Some((0..n_samples).collect());
            self.centroids = Some(x);
            self.wcss = 0.0;
            self.n_iter = 0;
            return Ok(());
        }

        let mut centroids = self.farthest_point_init(&x);
        let mut labels = assign_labels(&x, &centroids);
        let mut n_iter = 0;

        while n_iter < self.max_iter {
            n_iter += 1;
            centroids = Self::update_centroids(&x, &labels, &centroids);
            let next = assign_labels(&x, &centroids);
            let changed = next != labels;
            labels = next;
            if !changed {
                break;
            }
        }

        self.wcss = inertia(&x, &centroids, &labels);
        trace!(
            k = self.n_clusters,
            n_iter,
            wcss = self.wcss,
            "k-means converged"
        );
        self.n_iter = n_iter;
        self.labels = Some(labels);
        self.centroids = Some(centroids);
        Ok(())
    }

    /// Assigns each row to its nearest fitted centroid. Unfitted models
    /// return no labels.
    fn predict(&self, x: &Matrix<f64>) -> Vec<usize> {
        match &self.centroids {
            Some(centroids) => assign_labels(&leading_columns(x, CLUSTER_DIMS), centroids),
            None => Vec::new(),
        }
    }
}

/// Runs k-means and returns one label per point.
///
/// # Errors
///
/// Returns an error if `points` is empty or `k` is zero.
///
/// # Examples
///
/// ```
/// use assay::cluster::kmeans;
/// use assay::primitives::Matrix;
///
/// let points = Matrix::from_vec(2, 2, vec![0.0, 0.0, 1.0, 1.0]).expect("2x2");
/// // No more points than clusters: identity assignment
/// assert_eq!(kmeans(&points, 3, 100).expect("valid"), vec![0, 1]);
/// ```
pub fn kmeans(points: &Matrix<f64>, k: usize, max_iter: usize) -> Result<Vec<usize>> {
    let mut model = KMeans::new(k).with_max_iter(max_iter);
    model.fit(points)?;
    Ok(model.labels.unwrap_or_default())
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Nearest centroid per row; ties go to the lower index.
fn assign_labels(x: &Matrix<f64>, centroids: &Matrix<f64>) -> Vec<usize> {
    x.rows()
        .map(|point| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (k, centroid) in centroids.rows().enumerate() {
                let dist = squared_distance(point, centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = k;
                }
            }
            best
        })
        .collect()
}

/// First `dims` columns of `x` (all of them if it has fewer).
pub(crate) fn leading_columns(x: &Matrix<f64>, dims: usize) -> Matrix<f64> {
    let keep = dims.min(x.n_cols());
    let rows: Vec<Vec<f64>> = x.rows().map(|row| row[..keep].to_vec()).collect();
    gather(&rows, keep)
}

fn gather(rows: &[Vec<f64>], cols: usize) -> Matrix<f64> {
    let mut m = Matrix::zeros(rows.len(), cols);
    for (i, row) in rows.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            m.set(i, j, v);
        }
    }
    m
}

#[cfg(test)]
#[path = "kmeans_tests.rs"]
mod tests;
