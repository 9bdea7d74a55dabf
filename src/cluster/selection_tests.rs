use super::*;

/// `per_blob` points around each center on a small fixed pattern.
fn blobs(centers: &[(f64, f64)], per_blob: usize, spread: f64) -> Matrix<f64> {
    let pattern = [
        (0.0, 0.0),
        (1.0, 0.0),
        (0.0, 1.0),
        (-1.0, 0.0),
        (0.0, -1.0),
        (0.7, 0.7),
        (-0.7, 0.7),
        (0.7, -0.7),
    ];
    let mut data = Vec::new();
    for &(cx, cy) in centers {
        for &(dx, dy) in pattern.iter().cycle().take(per_blob) {
            data.push(cx + dx * spread);
            data.push(cy + dy * spread);
        }
    }
    Matrix::from_vec(centers.len() * per_blob, 2, data).expect("blob matrix")
}

fn candidate(k: usize, silhouette: f64, wcss: f64) -> KCandidate {
    KCandidate { k, silhouette, wcss }
}

#[test]
fn test_four_clear_blobs_choose_four_without_preference() {
    let points = blobs(&[(0.0, 0.0), (20.0, 0.0), (0.0, 20.0), (20.0, 20.0)], 6, 0.5);
    let assignment = KSelection::new()
        .with_preferred_k(None)
        .with_random_state(7)
        .select(&points)
        .expect("non-empty");
    assert_eq!(assignment.k, 4);
    assert_eq!(assignment.labels.len(), 24);
    assert!(assignment.labels.iter().all(|&l| l < 4));
    assert_eq!(
        assignment.candidates.iter().map(|c| c.k).collect::<Vec<_>>(),
        vec![2, 3, 4, 5, 6]
    );
}

#[test]
fn test_candidate_range_capped_by_half_point_count() {
    let points = blobs(&[(0.0, 0.0), (9.0, 9.0)], 3, 0.3);
    let assignment = KSelection::new().with_random_state(1).select(&points).expect("non-empty");
    let ks: Vec<usize> = assignment.candidates.iter().map(|c| c.k).collect();
    assert_eq!(ks, vec![2, 3]);
}

#[test]
fn test_too_few_points_single_cluster() {
    let points = Matrix::from_vec(3, 2, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]).expect("3x2");
    let assignment = KSelection::new().select(&points).expect("non-empty");
    assert_eq!(assignment.k, 1);
    assert_eq!(assignment.labels, vec![0, 0, 0]);
    assert_eq!(assignment.silhouette, 0.0);
    assert!(assignment.candidates.is_empty());
}

#[test]
fn test_preference_wins_within_margin() {
    let selection = KSelection::new();
    let candidates = [
        candidate(2, 0.60, 50.0),
        candidate(3, 0.57, 30.0),
        candidate(4, 0.40, 20.0),
    ];
    assert_eq!(candidates[selection.choose(&candidates)].k, 3);

    let unbiased = KSelection::new().with_preferred_k(None);
    assert_eq!(candidates[unbiased.choose(&candidates)].k, 2);
}

#[test]
fn test_preference_loses_outside_margin() {
    let selection = KSelection::new();
    let candidates = [
        candidate(2, 0.70, 50.0),
        candidate(3, 0.60, 30.0),
        candidate(4, 0.40, 20.0),
    ];
    assert_eq!(candidates[selection.choose(&candidates)].k, 2);
}

#[test]
fn test_preference_needs_minimum_silhouette() {
    let selection = KSelection::new().with_preference_margin(0.5);
    let candidates = [candidate(2, 0.2, 50.0), candidate(3, 0.1, 30.0)];
    assert_eq!(candidates[selection.choose(&candidates)].k, 2);
}

#[test]
fn test_elbow_fallback_when_all_below_minimum() {
    let selection = KSelection::new().with_preferred_k(None);
    // Second differences: k=3 -> 100 - 80 + 35 = 55, k=4 -> 40 - 70 + 33 = 3
    let candidates = [
        candidate(2, 0.05, 100.0),
        candidate(3, 0.10, 40.0),
        candidate(4, 0.02, 35.0),
        candidate(5, 0.01, 33.0),
    ];
    assert_eq!(candidates[selection.choose(&candidates)].k, 3);
}

#[test]
fn test_elbow_with_two_candidates_takes_smallest() {
    let selection = KSelection::new();
    let candidates = [candidate(2, 0.05, 10.0), candidate(3, 0.01, 5.0)];
    assert_eq!(selection.choose(&candidates), 0);
}

#[test]
fn test_seeded_selection_is_reproducible() {
    let points = blobs(&[(0.0, 0.0), (6.0, 1.0), (3.0, 7.0)], 5, 1.5);
    let selection = KSelection::new().with_random_state(11);
    let first = selection.select(&points).expect("non-empty");
    let second = selection.select(&points).expect("non-empty");
    assert_eq!(first, second);
}

#[test]
fn test_cluster_scores_uses_first_two_columns() {
    let two = blobs(&[(0.0, 0.0), (20.0, 20.0)], 4, 0.5);
    let mut three = Matrix::zeros(8, 3);
    for i in 0..8 {
        three.set(i, 0, two.get(i, 0));
        three.set(i, 1, two.get(i, 1));
        three.set(i, 2, if i % 2 == 0 { 1000.0 } else { -1000.0 });
    }
    let selection = KSelection::new().with_preferred_k(None).with_random_state(2);
    let from_two = cluster_scores(&two, &selection).expect("non-empty");
    let from_three = cluster_scores(&three, &selection).expect("non-empty");
    assert_eq!(from_two, from_three);
    assert_eq!(from_two.k, 2);
}

#[test]
fn test_choose_optimal_k_respects_max_k() {
    let points = blobs(&[(0.0, 0.0), (20.0, 0.0), (0.0, 20.0), (20.0, 20.0)], 4, 0.5);
    assert_eq!(choose_optimal_k(&points, 2).expect("non-empty"), 2);
}

#[test]
fn test_select_errors() {
    let empty = Matrix::from_vec(0, 2, vec![]).expect("0x2");
    assert!(matches!(
        KSelection::new().select(&empty),
        Err(AssayError::EmptyInput(_))
    ));
    let points = blobs(&[(0.0, 0.0)], 4, 1.0);
    assert!(KSelection::new().with_min_silhouette(2.0).select(&points).is_err());
    assert!(KSelection::new().with_max_iter(0).select(&points).is_err());
}

#[test]
fn test_selection_serde_defaults() {
    let selection: KSelection =
        serde_json::from_str(r#"{"preferred_k": null}"#).expect("valid json");
    assert_eq!(selection.preferred_k, None);
    assert_eq!(selection.max_k, 6);
    assert!((selection.min_silhouette - 0.15).abs() < 1e-12);
}
