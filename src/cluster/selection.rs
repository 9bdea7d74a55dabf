//! Choosing the number of clusters.
//!
//! Each candidate k in `2..=min(max_k, n/2, 6)` is clustered and scored by
//! mean silhouette and WCSS. The highest silhouette at or above
//! `min_silhouette` wins, unless `preferred_k` scores within
//! `preference_margin` of it. When no candidate reaches the minimum, the
//! elbow of the WCSS curve decides.

use super::kmeans::{leading_columns, KMeans, CLUSTER_DIMS};
use crate::error::{AssayError, Result};
use crate::metrics::{silhouette_score, wcss};
use crate::primitives::Matrix;
use crate::traits::UnsupervisedEstimator;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hard upper bound on candidate cluster counts.
pub const MAX_CANDIDATE_K: usize = 6;

/// Scores of one candidate k.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KCandidate {
    /// Number of clusters
    pub k: usize,
    /// Mean silhouette of the k-means partition
    pub silhouette: f64,
    /// Within-cluster sum of squares of the partition
    pub wcss: f64,
}

/// Chosen partition of a point set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    /// One label in `0..k` per point
    pub labels: Vec<usize>,
    /// Chosen cluster count
    pub k: usize,
    /// Mean silhouette of the chosen partition
    pub silhouette: f64,
    /// Within-cluster sum of squares of the chosen partition
    pub wcss: f64,
    /// Every candidate that was scored, ascending by k
    pub candidates: Vec<KCandidate>,
}

/// Optimal-k heuristic settings.
///
/// The k = 3 bias is a product preference for geochemical PCA plots, not a
/// property of the data; `with_preferred_k(None)` gives the plain
/// silhouette/elbow rule.
///
/// # Examples
///
/// ```
/// use assay::cluster::KSelection;
/// use assay::primitives::Matrix;
///
/// let points = Matrix::from_vec(8, 2, vec![
///     0.0, 0.0, 0.2, 0.1, 0.1, 0.3, 0.3, 0.2,
///     8.0, 8.0, 8.2, 8.1, 8.1, 8.3, 8.3, 8.2,
/// ]).expect("8x2");
///
/// let assignment = KSelection::new()
///     .with_preferred_k(None)
///     .with_random_state(1)
///     .select(&points)
///     .expect("non-empty points");
/// assert_eq!(assignment.k, 2);
/// assert!(assignment.silhouette > 0.9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KSelection {
    /// Largest k tried (further capped at n/2 and 6)
    pub max_k: usize,
    /// Silhouette a candidate needs to be chosen on quality
    pub min_silhouette: f64,
    /// k favoured when close to the best silhouette
    pub preferred_k: Option<usize>,
    /// How close "close" is
    pub preference_margin: f64,
    /// Lloyd pass cap per candidate
    pub max_iter: usize,
    /// Seed for k-means initialization
    pub random_state: Option<u64>,
}

impl Default for KSelection {
    fn default() -> Self {
        Self {
            max_k: MAX_CANDIDATE_K,
            min_silhouette: 0.15,
            preferred_k: Some(3),
            preference_margin: 0.05,
            max_iter: 100,
            random_state: None,
        }
    }
}

impl KSelection {
    /// Default heuristic: k ≤ 6, silhouette ≥ 0.15, k = 3 within 0.05.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the largest k tried.
    #[must_use]
    pub fn with_max_k(mut self, max_k: usize) -> Self {
        self.max_k = max_k;
        self
    }

    /// Sets the silhouette a candidate needs.
    #[must_use]
    pub fn with_min_silhouette(mut self, min_silhouette: f64) -> Self {
        self.min_silhouette = min_silhouette;
        self
    }

    /// Sets the favoured k, or disables the preference with `None`.
    #[must_use]
    pub fn with_preferred_k(mut self, preferred_k: Option<usize>) -> Self {
        self.preferred_k = preferred_k;
        self
    }

    /// Sets the silhouette margin within which the preferred k wins.
    #[must_use]
    pub fn with_preference_margin(mut self, margin: f64) -> Self {
        self.preference_margin = margin;
        self
    }

    /// Sets the Lloyd pass cap per candidate.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the k-means seed.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Sets or clears the k-means seed.
    #[must_use]
    pub fn with_optional_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    /// Checks thresholds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for a silhouette threshold outside
    /// [-1, 1], a negative margin or a zero iteration cap.
    pub fn validate(&self) -> Result<()> {
        if !(-1.0..=1.0).contains(&self.min_silhouette) {
            return Err(AssayError::invalid_hyperparameter(
                "min_silhouette",
                self.min_silhouette,
                "in [-1, 1]",
            ));
        }
        if self.preference_margin.is_nan() || self.preference_margin < 0.0 {
            return Err(AssayError::invalid_hyperparameter(
                "preference_margin",
                self.preference_margin,
                ">= 0",
            ));
        }
        if self.max_iter == 0 {
            return Err(AssayError::invalid_hyperparameter("max_iter", 0, ">= 1"));
        }
        Ok(())
    }

    /// Clusters `points` (first two columns) with the chosen k.
    ///
    /// # Errors
    ///
    /// Returns an error if `points` is empty or the settings are invalid.
    pub fn select(&self, points: &Matrix<f64>) -> Result<ClusterAssignment> {
        self.validate()?;
        let n = points.n_rows();
        if n == 0 {
            return Err(AssayError::empty_input("points to cluster"));
        }
        let points = leading_columns(points, CLUSTER_DIMS);

        let upper = self.max_k.min(n / 2).min(MAX_CANDIDATE_K);
        if upper < 2 {
            let labels = vec![0; n];
            let total = wcss(&points, &labels);
            debug!(n, "too few points for k >= 2, single cluster");
            return Ok(ClusterAssignment {
                labels,
                k: 1,
                silhouette: 0.0,
                wcss: total,
                candidates: Vec::new(),
            });
        }

        let mut candidates = Vec::with_capacity(upper - 1);
        let mut partitions = Vec::with_capacity(upper - 1);
        for k in 2..=upper {
            let mut model = KMeans::new(k)
                .with_max_iter(self.max_iter)
                .with_optional_random_state(self.random_state);
            model.fit(&points)?;
            let labels = model.labels().map(<[usize]>::to_vec).unwrap_or_default();
            candidates.push(KCandidate {
                k,
                silhouette: silhouette_score(&points, &labels),
                wcss: model.wcss(),
            });
            partitions.push(labels);
        }

        let chosen = self.choose(&candidates);
        let best = &candidates[chosen];
        debug!(
            k = best.k,
            silhouette = best.silhouette,
            wcss = best.wcss,
            "cluster count selected"
        );
        Ok(ClusterAssignment {
            k: best.k,
            silhouette: best.silhouette,
            wcss: best.wcss,
            labels: partitions.swap_remove(chosen),
            candidates,
        })
    }

    /// Index of the chosen candidate; `candidates` is non-empty.
    fn choose(&self, candidates: &[KCandidate]) -> usize {
        let mut best: Option<usize> = None;
        for (i, c) in candidates.iter().enumerate() {
            if c.silhouette < self.min_silhouette {
                continue;
            }
            if best.map_or(true, |b| c.silhouette > candidates[b].silhouette) {
                best = Some(i);
            }
        }

        match best {
            Some(b) => {
                let top = candidates[b].silhouette;
                self.preferred_k
                    .and_then(|p| {
                        candidates.iter().position(|c| {
                            c.k == p
                                && c.silhouette >= self.min_silhouette
                                && c.silhouette >= top - self.preference_margin
                        })
                    })
                    .unwrap_or(b)
            }
            None => elbow(candidates),
        }
    }
}

/// Candidate with the largest second difference of WCSS; the smallest k
/// when fewer than three candidates exist.
fn elbow(candidates: &[KCandidate]) -> usize {
    if candidates.len() < 3 {
        return 0;
    }
    let mut best = 1;
    let mut best_curvature = f64::NEG_INFINITY;
    for i in 1..candidates.len() - 1 {
        let curvature =
            candidates[i - 1].wcss - 2.0 * candidates[i].wcss + candidates[i + 1].wcss;
        if curvature > best_curvature {
            best_curvature = curvature;
            best = i;
        }
    }
    best
}

/// Optimal k for `points` with the default heuristic capped at `max_k`.
///
/// # Errors
///
/// Returns an error if `points` is empty.
pub fn choose_optimal_k(points: &Matrix<f64>, max_k: usize) -> Result<usize> {
    KSelection::new()
        .with_max_k(max_k)
        .select(points)
        .map(|assignment| assignment.k)
}

/// Clusters the first two columns of a score matrix.
///
/// # Errors
///
/// Returns an error if `scores` has no rows or `selection` is invalid.
pub fn cluster_scores(scores: &Matrix<f64>, selection: &KSelection) -> Result<ClusterAssignment> {
    selection.select(scores)
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
