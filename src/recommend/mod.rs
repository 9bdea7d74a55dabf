//! Correlation-driven variable grouping for PCA candidate selection.
//!
//! A pre-screening heuristic: variance shares here are estimated from the
//! group's average correlation, not computed. Run
//! [`Pca`](crate::decomposition::Pca) on a chosen group for real figures.
//!
//! # Quick Start
//!
//! ```
//! use assay::recommend::GroupRecommender;
//! use assay::stats::correlation_matrix;
//!
//! let base: Vec<f64> = (0..20_i32).map(|i| f64::from(i).sin()).collect();
//! let other: Vec<f64> = (0..20_i32).map(|i| f64::from(i * 7 % 5)).collect();
//! let series = vec![
//!     ("La".to_string(), base.clone()),
//!     ("Ce".to_string(), base.iter().map(|v| 2.0 * v + 1.0).collect()),
//!     ("Nd".to_string(), base.iter().map(|v| 3.0 * v - 2.0).collect()),
//!     ("Ba".to_string(), other),
//! ];
//! let matrix = correlation_matrix(&series).expect("equal lengths");
//! let names: Vec<String> = series.iter().map(|(n, _)| n.clone()).collect();
//!
//! let suggestions = GroupRecommender::new().suggest(&matrix, &names);
//! assert_eq!(suggestions.len(), 1);
//! assert_eq!(suggestions[0].variables.len(), 3);
//! ```

use crate::stats::CorrelationMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Estimated PC2 share below which a group is not worth suggesting.
const MIN_PC2_VARIANCE: f64 = 10.0;

/// Upper bound on suggestions per call.
pub const MAX_SUGGESTIONS: usize = 3;

/// A candidate variable set for PCA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableGroupSuggestion {
    /// Members, strongest-connected first
    pub variables: Vec<String>,
    /// Mean |r| over all member pairs
    pub average_correlation: f64,
    /// Estimated PC1% + PC2%
    pub estimated_variance: f64,
    /// Estimated PC1 share (%)
    pub pc1_variance: f64,
    /// Estimated PC2 share (%)
    pub pc2_variance: f64,
    /// Heuristic confidence in [0, 1]
    pub confidence: f64,
}

impl VariableGroupSuggestion {
    fn rank_score(&self) -> f64 {
        self.estimated_variance / 100.0 * 0.7 + self.average_correlation * 0.3
    }
}

/// Greedy grouping of variables whose mutual |r| is high.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRecommender {
    /// Average |r| a variable needs to the current members to join
    pub threshold: f64,
    /// Maximum suggestions returned, capped at [`MAX_SUGGESTIONS`]
    pub max_groups: usize,
    /// Smaller groups are dropped
    pub min_group_size: usize,
    /// Larger groups are trimmed to their best-connected members
    pub max_group_size: usize,
}

impl Default for GroupRecommender {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            max_groups: MAX_SUGGESTIONS,
            min_group_size: 3,
            max_group_size: 6,
        }
    }
}

impl GroupRecommender {
    /// Threshold 0.7, up to 3 groups of 3 to 6 variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the average |r| needed to join a group.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the maximum number of suggestions, at most [`MAX_SUGGESTIONS`].
    #[must_use]
    pub fn with_max_groups(mut self, max_groups: usize) -> Self {
        self.max_groups = max_groups.min(MAX_SUGGESTIONS);
        self
    }

    /// Suggests up to `max_groups` variable groups, best first.
    ///
    /// Variables missing from `matrix` are skipped and repeated names count
    /// once. Returns an empty list when nothing qualifies.
    #[must_use]
    pub fn suggest(
        &self,
        matrix: &CorrelationMatrix,
        variables: &[String],
    ) -> Vec<VariableGroupSuggestion> {
        let mut seen = BTreeSet::new();
        let indices: Vec<usize> = variables
            .iter()
            .filter_map(|v| matrix.index_of(v))
            .filter(|&i| seen.insert(i))
            .collect();
        let strength = |i: usize, j: usize| matrix.value(i, j).abs();

        let mut grouped = vec![false; indices.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for seed in 0..indices.len() {
            if grouped[seed] {
                continue;
            }
            grouped[seed] = true;
            let mut members = vec![indices[seed]];
            for candidate in (seed + 1)..indices.len() {
                if grouped[candidate] {
                    continue;
                }
                let idx = indices[candidate];
                if mean(members.iter().map(|&m| strength(idx, m))) >= self.threshold {
                    members.push(idx);
                    grouped[candidate] = true;
                }
            }
            if members.len() >= self.min_group_size.max(1) {
                groups.push(members);
            }
        }

        let mut suggestions: Vec<VariableGroupSuggestion> = groups
            .into_iter()
            .map(|members| self.trim(members, &strength))
            .map(|members| self.describe(matrix, &members))
            .filter(|s| s.pc2_variance >= MIN_PC2_VARIANCE)
            .collect();

        suggestions.sort_by(|a, b| b.rank_score().total_cmp(&a.rank_score()));
        suggestions.truncate(self.max_groups.min(MAX_SUGGESTIONS));
        debug!(
            candidates = indices.len(),
            suggestions = suggestions.len(),
            threshold = self.threshold,
            "variable groups suggested"
        );
        suggestions
    }

    /// Keeps the `max_group_size` members with the highest mean |r| to the
    /// rest of the group.
    fn trim(&self, members: Vec<usize>, strength: &impl Fn(usize, usize) -> f64) -> Vec<usize> {
        let mut ranked: Vec<(usize, f64)> = members
            .iter()
            .map(|&m| {
                let connectivity = mean(
                    members
                        .iter()
                        .filter(|&&other| other != m)
                        .map(|&other| strength(m, other)),
                );
                (m, connectivity)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(self.max_group_size);
        ranked.into_iter().map(|(m, _)| m).collect()
    }

    fn describe(&self, matrix: &CorrelationMatrix, members: &[usize]) -> VariableGroupSuggestion {
        let average_correlation = mean(
            members
                .iter()
                .enumerate()
                .flat_map(|(a, &i)| members[a + 1..].iter().map(move |&j| (i, j)))
                .map(|(i, j)| matrix.value(i, j).abs()),
        );
        let pc1_variance = (average_correlation * 50.0 + 40.0).min(80.0);
        let pc2_variance = (30.0 - average_correlation * 15.0).max(10.0);
        let size_share = members.len() as f64 / self.max_group_size.max(1) as f64;
        let confidence = (0.5 * average_correlation.min(1.0)
            + 0.3 * (pc2_variance / 30.0)
            + 0.2 * size_share)
            .clamp(0.0, 1.0);

        VariableGroupSuggestion {
            variables: members.iter().map(|&i| matrix.names()[i].clone()).collect(),
            average_correlation,
            estimated_variance: pc1_variance + pc2_variance,
            pc1_variance,
            pc2_variance,
            confidence,
        }
    }
}

/// Mean of an iterator, 0 when empty.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
#[path = "recommend_tests.rs"]
mod tests;
