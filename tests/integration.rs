//! Integration tests for the assay engines.
//!
//! These tests verify end-to-end workflows combining multiple components.

use assay::prelude::*;
use assay::stats::correlation_matrix_from_samples;
use std::collections::BTreeSet;

const VARIABLES: [&str; 4] = ["Fe", "Mg", "Ca", "Na"];
const GROUP_SIZE: usize = 8;
/// Row holding only Fe and a below-detection Mg.
const PARTIAL_ROW: usize = 5;

fn names() -> Vec<String> {
    VARIABLES.iter().map(|v| (*v).to_string()).collect()
}

fn jitter(i: usize, v: usize) -> f64 {
    0.05 * ((i * 7 + v * 3) as f64).sin()
}

/// Three tight groups along two latent axes, plus one mostly empty row.
///
/// Returns the samples and the group of every complete row.
fn three_groups() -> (SampleMatrix, Vec<Option<usize>>) {
    let centers = [(-3.0, 0.0), (0.0, 3.0), (3.0, 0.0)];
    let mut samples = SampleMatrix::default();
    let mut groups = Vec::new();

    let mut i = 0;
    for (g, &(l1, l2)) in centers.iter().enumerate() {
        for _ in 0..GROUP_SIZE {
            if samples.len() == PARTIAL_ROW {
                let mut row = Sample::new();
                row.insert("Fe".to_string(), RawValue::Number(12.0));
                row.insert("Mg".to_string(), RawValue::from("<0.01"));
                row.insert("Ca".to_string(), RawValue::Missing);
                samples.push(row);
                groups.push(None);
            }
            let values = [
                10.0 + 2.0 * l1,
                5.0 + l1 + 0.5 * l2,
                8.0 - l1,
                3.0 + l2,
            ];
            let row: Sample = VARIABLES
                .iter()
                .zip(values)
                .enumerate()
                .map(|(v, (name, value))| {
                    ((*name).to_string(), RawValue::Number(value + jitter(i, v)))
                })
                .collect();
            samples.push(row);
            groups.push(Some(g));
            i += 1;
        }
    }
    (samples, groups)
}

#[test]
fn test_scan_workflow() {
    let (samples, _) = three_groups();
    let entries = scan(&samples, &names(), &ScanConfig::default()).expect("valid scan");

    // 4 variables, 6 unordered pairs
    assert_eq!(entries.len(), 6);

    // Fe and Ca are mirror images of the first latent axis
    let first = &entries[0];
    assert_eq!((first.x.as_str(), first.y.as_str()), ("Fe", "Ca"));
    assert!(first.is_significant);
    assert!(first.result.pearson_r.expect("computed") < -0.99);
    // The partial row is dropped pairwise
    assert_eq!(first.result.n, 3 * GROUP_SIZE);

    // Significant entries come first
    let flags: Vec<bool> = entries.iter().map(|e| e.is_significant).collect();
    let mut sorted = flags.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(flags, sorted);
}

#[test]
fn test_pca_with_clusters_workflow() {
    let (samples, groups) = three_groups();
    let pca = Pca::new(PcaConfig::new().with_random_state(42));
    let result = pca
        .run_with_clusters(&samples, &names(), &KSelection::new().with_random_state(42))
        .expect("enough rows");

    assert_eq!(result.n_components(), 2);
    assert_eq!(result.scores.n_rows(), samples.len());
    assert_eq!(result.loadings.shape(), (2, VARIABLES.len()));
    assert_eq!(result.excluded_rows, vec![PARTIAL_ROW]);
    assert_eq!(result.retained_rows.len(), 3 * GROUP_SIZE);

    // Excluded row keeps its position with zero scores and no cluster
    assert_eq!(result.clusters[PARTIAL_ROW], -1);
    assert!(result.scores.row(PARTIAL_ROW).iter().all(|&s| s == 0.0));

    // Two latent axes carry almost everything
    assert!(result.explained_variance[0] >= result.explained_variance[1]);
    assert!(result.cumulative_variance[1] > 99.0);
    assert!(result.cumulative_variance[1] <= 100.0);

    // One cluster per group, shared by every member
    let labels: BTreeSet<i32> = result.clusters.iter().copied().filter(|&c| c >= 0).collect();
    assert_eq!(labels.len(), 3);
    for g in 0..3 {
        let members: BTreeSet<i32> = groups
            .iter()
            .zip(&result.clusters)
            .filter(|(group, _)| **group == Some(g))
            .map(|(_, &c)| c)
            .collect();
        assert_eq!(members.len(), 1, "group {g} split across {members:?}");
    }

    let arrows = result.biplot_vectors();
    assert_eq!(arrows.len(), VARIABLES.len());
    assert_eq!(arrows[0].variable, "Fe");
}

#[test]
fn test_group_recommendation_workflow() {
    let (samples, _) = three_groups();
    let matrix = correlation_matrix_from_samples(&samples, &names()).expect("known names");

    let suggestions = GroupRecommender::new().suggest(&matrix, &names());
    assert_eq!(suggestions.len(), 1);

    let mut members = suggestions[0].variables.clone();
    members.sort();
    assert_eq!(members, vec!["Ca", "Fe", "Mg"]);
    assert!(suggestions[0].average_correlation > 0.95);
    assert!((0.0..=1.0).contains(&suggestions[0].confidence));

    // The suggested group feeds straight into PCA
    let result = run_pca(&samples, &suggestions[0].variables, &PcaConfig::new())
        .expect("enough rows");
    assert!(result.explained_variance[0] > 90.0);
}

#[test]
fn test_config_driven_workflow() {
    let config = AnalysisConfig::from_json(
        r#"{
            "scan": {"corr_threshold": 0.9, "methods": ["pearson", "spearman"]},
            "pca": {"n_components": 3},
            "clustering": {"preferred_k": null},
            "random_state": 7
        }"#,
    )
    .expect("valid config");

    let (samples, _) = three_groups();
    let entries = scan(&samples, &names(), &config.scan_config()).expect("valid scan");
    assert!(entries.iter().all(|e| e.result.spearman_r.is_some()));
    assert!(entries
        .iter()
        .filter(|e| e.is_significant)
        .all(|e| e.result.pearson_r.expect("computed").abs() >= 0.9
            || e.result.spearman_r.expect("computed").abs() >= 0.9));

    let pca = Pca::new(config.pca_config());
    let first = pca
        .run_with_clusters(&samples, &names(), &config.k_selection())
        .expect("enough rows");
    let second = pca
        .run_with_clusters(&samples, &names(), &config.k_selection())
        .expect("enough rows");

    // The third axis is jitter only and may fall below the eigen cut-off
    assert!((2..=3).contains(&first.n_components()));
    assert!(first
        .cumulative_variance
        .windows(2)
        .all(|w| w[0] <= w[1] + 1e-12));
    // Shared seed makes repeated runs identical
    assert_eq!(first.clusters, second.clusters);
    assert_eq!(first.scores, second.scores);
}

#[test]
fn test_kmeans_estimator_workflow() {
    let x = Matrix::from_vec(
        6,
        2,
        vec![1.0, 1.0, 1.2, 0.9, 0.8, 1.1, 8.0, 8.0, 8.2, 7.9, 7.8, 8.1],
    )
    .expect("6x2 matrix");

    let mut model = KMeans::new(2).with_random_state(3);
    model.fit(&x).expect("valid data");

    let labels = model.predict(&x);
    assert_eq!(labels.len(), 6);
    assert_eq!(labels[0], labels[1]);
    assert_eq!(labels[0], labels[2]);
    assert_eq!(labels[3], labels[4]);
    assert_ne!(labels[0], labels[3]);

    assert!(silhouette_score(&x, &labels) > 0.9);
    assert!((wcss(&x, &labels) - model.wcss()).abs() < 1e-9);
}
