//! Clustering quality metrics.
//!
//! - [`silhouette_score`]: cohesion versus separation, in [-1, 1]
//! - [`wcss`]: within-cluster sum of squares around label means (elbow quantity)
//! - [`inertia`]: within-cluster sum of squares around given centroids

use crate::primitives::Matrix;
use std::collections::BTreeSet;

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Sum of squared distances from each point to its assigned centroid.
///
/// # Examples
///
/// ```
/// use assay::metrics::inertia;
/// use assay::primitives::Matrix;
///
/// let data = Matrix::from_vec(4, 2, vec![
///     0.0, 0.0,
///     1.0, 0.0,
///     0.0, 1.0,
///     1.0, 1.0,
/// ]).expect("4x2 matrix");
/// let centroids = Matrix::from_vec(1, 2, vec![0.5, 0.5]).expect("1x2 matrix");
/// assert!((inertia(&data, &centroids, &[0, 0, 0, 0]) - 2.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn inertia(data: &Matrix<f64>, centroids: &Matrix<f64>, labels: &[usize]) -> f64 {
    labels
        .iter()
        .enumerate()
        .map(|(i, &label)| squared_distance(data.row(i), centroids.row(label)))
        .sum()
}

/// Within-cluster sum of squares, with centroids taken as label means.
///
/// Used for the elbow heuristic; decreases as k grows.
#[must_use]
pub fn wcss(data: &Matrix<f64>, labels: &[usize]) -> f64 {
    let n_features = data.n_cols();
    let n_clusters = labels.iter().max().map_or(0, |&m| m + 1);
    let mut sums = vec![vec![0.0; n_features]; n_clusters];
    let mut counts = vec![0usize; n_clusters];

    for (i, &label) in labels.iter().enumerate() {
        counts[label] += 1;
        for (s, v) in sums[label].iter_mut().zip(data.row(i)) {
            *s += v;
        }
    }

    labels
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            let n = counts[label] as f64;
            data.row(i)
                .iter()
                .zip(&sums[label])
                .map(|(v, s)| (v - s / n).powi(2))
                .sum::<f64>()
        })
        .sum()
}

/// Mean distance from a point to other points in the same cluster.
fn mean_intra_cluster_distance(
    data: &Matrix<f64>,
    point_idx: usize,
    cluster: usize,
    labels: &[usize],
) -> f64 {
    let point = data.row(point_idx);
    let (sum, count) = labels
        .iter()
        .enumerate()
        .filter(|&(j, &label)| j != point_idx && label == cluster)
        .fold((0.0, 0usize), |(s, c), (j, _)| {
            (s + distance(point, data.row(j)), c + 1)
        });

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Minimum over other clusters of the mean distance to that cluster.
fn min_inter_cluster_distance(
    data: &Matrix<f64>,
    point_idx: usize,
    cluster: usize,
    labels: &[usize],
    clusters: &BTreeSet<usize>,
) -> f64 {
    let point = data.row(point_idx);
    let mut min_mean = f64::INFINITY;

    for &other_cluster in clusters {
        if other_cluster == cluster {
            continue;
        }
        let (sum, count) = labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == other_cluster)
            .fold((0.0, 0usize), |(s, c), (j, _)| {
                (s + distance(point, data.row(j)), c + 1)
            });
        if count > 0 {
            min_mean = min_mean.min(sum / count as f64);
        }
    }

    if min_mean.is_finite() {
        min_mean
    } else {
        0.0
    }
}

fn silhouette_coefficient(a_i: f64, b_i: f64) -> f64 {
    let max_ab = a_i.max(b_i);
    if max_ab == 0.0 {
        0.0
    } else {
        (b_i - a_i) / max_ab
    }
}

/// Mean silhouette coefficient over all points.
///
/// s(i) = (b(i) - a(i)) / max(a(i), b(i)), where a(i) is the mean distance
/// to the rest of the point's cluster and b(i) the smallest mean distance to
/// another cluster. Fewer than two distinct clusters scores 0.
///
/// # Examples
///
/// ```
/// use assay::metrics::silhouette_score;
/// use assay::primitives::Matrix;
///
/// let data = Matrix::from_vec(4, 2, vec![
///     0.0, 0.0,
///     0.1, 0.1,
///     5.0, 5.0,
///     5.1, 5.1,
/// ]).expect("4x2 matrix");
/// assert!(silhouette_score(&data, &[0, 0, 1, 1]) > 0.9);
/// assert_eq!(silhouette_score(&data, &[0, 0, 0, 0]), 0.0);
/// ```
#[must_use]
pub fn silhouette_score(data: &Matrix<f64>, labels: &[usize]) -> f64 {
    let n_samples = labels.len().min(data.n_rows());
    if n_samples < 2 {
        return 0.0;
    }
    let labels = &labels[..n_samples];

    let clusters: BTreeSet<usize> = labels.iter().copied().collect();
    if clusters.len() < 2 {
        return 0.0;
    }

    let total: f64 = (0..n_samples)
        .map(|i| {
            let cluster = labels[i];
            let a_i = mean_intra_cluster_distance(data, i, cluster, labels);
            let b_i = min_inter_cluster_distance(data, i, cluster, labels, &clusters);
            silhouette_coefficient(a_i, b_i)
        })
        .sum();

    total / n_samples as f64
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
