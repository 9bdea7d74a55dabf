use super::*;
use crate::data::{RawValue, Sample};
use std::f64::consts::PI;

fn wave(freq: f64, n: usize, cosine: bool) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let angle = 2.0 * PI * freq * i as f64 / n as f64;
            if cosine {
                angle.cos()
            } else {
                angle.sin()
            }
        })
        .collect()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn row(pairs: &[(&str, RawValue)]) -> Sample {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// x, y = 2x + 1 and an uncorrelated w.
fn collinear_pair_plus_independent() -> SampleMatrix {
    let n = 40;
    let x = wave(1.0, n, false);
    let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
    let w = wave(3.0, n, true);
    SampleMatrix::from_columns(&[("x", x), ("y", y), ("w", w)])
}

/// Two tight groups far apart in all three variables.
fn two_groups() -> SampleMatrix {
    let mut a = Vec::new();
    let mut b = Vec::new();
    let mut c = Vec::new();
    for group in [0.0, 10.0] {
        for i in 0..6 {
            let t = f64::from(i);
            a.push(group + 0.2 * t.sin());
            b.push(group + 0.2 * t.cos());
            c.push(group + 0.1 * (2.0 * t).sin());
        }
    }
    SampleMatrix::from_columns(&[("a", a), ("b", b), ("c", c)])
}

#[test]
fn test_collinear_pair_dominates_first_component() {
    let result = run_pca(
        &collinear_pair_plus_independent(),
        &names(&["x", "y", "w"]),
        &PcaConfig::new().with_random_state(5),
    )
    .expect("enough data");

    assert_eq!(result.n_components(), 2);
    assert!(result.explained_variance[0] > 66.0, "{:?}", result.explained_variance);
    assert!((result.eigenvalues[0] - 2.0).abs() < 1e-6);
    assert!((result.eigenvalues[1] - 1.0).abs() < 1e-6);
    assert!((result.cumulative_variance[1] - 100.0).abs() < 1e-6);

    // PC1 loads equally on x and y, not on w
    let pc1 = result.loadings.row(0);
    let s = std::f64::consts::FRAC_1_SQRT_2;
    assert!((pc1[0] - s).abs() < 1e-3);
    assert!((pc1[1] - s).abs() < 1e-3);
    assert!(pc1[2].abs() < 1e-3);
}

#[test]
fn test_variance_shares_are_monotone_and_bounded() {
    let result = Pca::new(PcaConfig::new().with_n_components(Some(3)).with_random_state(1))
        .run(&two_groups(), &names(&["a", "b", "c"]))
        .expect("enough data");

    for w in result.cumulative_variance.windows(2) {
        assert!(w[1] >= w[0]);
    }
    assert!(result.cumulative_variance.iter().all(|v| *v <= 100.0));
    for w in result.eigenvalues.windows(2) {
        assert!(w[0] >= w[1]);
    }
    assert!(result.eigenvalues.iter().all(|l| *l > 1e-10));
    let sum: f64 = result.explained_variance.iter().sum();
    assert!(sum <= 100.0 + 1e-9);
}

#[test]
fn test_scores_have_component_variance() {
    let result = run_pca(
        &collinear_pair_plus_independent(),
        &names(&["x", "y", "w"]),
        &PcaConfig::new().with_random_state(9),
    )
    .expect("enough data");
    let n = result.retained_rows.len() as f64;

    for c in 0..result.n_components() {
        let column = result.scores.column(c);
        let mean = column.iter().sum::<f64>() / n;
        let variance = column.iter().map(|v| v * v).sum::<f64>() / (n - 1.0);
        assert!(mean.abs() < 1e-9);
        assert!(
            (variance - result.eigenvalues[c]).abs() < 1e-3 * result.eigenvalues[c],
            "component {c}: {variance} vs {}",
            result.eigenvalues[c]
        );
    }
}

#[test]
fn test_loadings_are_unit_vectors() {
    let result = run_pca(
        &two_groups(),
        &names(&["a", "b", "c"]),
        &PcaConfig::new().with_random_state(4),
    )
    .expect("enough data");
    assert_eq!(result.loadings.shape(), (result.n_components(), 3));
    for loading in result.loadings.rows() {
        let norm = dot(loading, loading).sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_row_admission_and_mean_imputation() {
    let samples = SampleMatrix::new(vec![
        row(&[("A", RawValue::Number(1.0)), ("B", RawValue::Number(2.0)), ("C", RawValue::Number(1.0))]),
        row(&[("A", RawValue::Number(2.0)), ("B", RawValue::Number(4.0)), ("C", RawValue::Number(3.0))]),
        row(&[("A", RawValue::Number(3.0)), ("B", RawValue::Number(6.0)), ("C", RawValue::Number(2.0))]),
        row(&[("A", RawValue::Number(4.0)), ("B", RawValue::Number(8.0)), ("C", RawValue::Number(5.0))]),
        row(&[("A", RawValue::Missing), ("B", RawValue::Number(10.0)), ("C", RawValue::from("4"))]),
        row(&[("A", RawValue::Number(100.0)), ("B", RawValue::from("n.d."))]),
    ]);
    let variables = names(&["A", "B", "C"]);

    // 80 %: need 3 of 3 fields
    let strict = run_pca(&samples, &variables, &PcaConfig::new().with_random_state(2))
        .expect("enough data");
    assert_eq!(strict.retained_rows, vec![0, 1, 2, 3]);
    assert_eq!(strict.excluded_rows, vec![4, 5]);

    // 60 %: need 2 of 3 fields; row 4 is imputed with A's mean over all
    // parseable values, including excluded row 5
    let lenient = run_pca(
        &samples,
        &variables,
        &PcaConfig::new().with_row_threshold(0.6).with_random_state(2),
    )
    .expect("enough data");
    assert_eq!(lenient.retained_rows, vec![0, 1, 2, 3, 4]);
    assert_eq!(lenient.excluded_rows, vec![5]);
    // A imputed as (1 + 2 + 3 + 4 + 100) / 5 = 22
    assert!((lenient.means[0] - (1.0 + 2.0 + 3.0 + 4.0 + 22.0) / 5.0).abs() < 1e-12);
}

#[test]
fn test_minimum_of_two_fields_per_row() {
    // 2 variables at a low threshold still need both fields
    let samples = SampleMatrix::new(vec![
        row(&[("A", RawValue::Number(1.0)), ("B", RawValue::Number(1.0))]),
        row(&[("A", RawValue::Number(2.0)), ("B", RawValue::Number(3.0))]),
        row(&[("A", RawValue::Number(3.0)), ("B", RawValue::Number(2.0))]),
        row(&[("A", RawValue::Number(4.0))]),
    ]);
    let result = run_pca(
        &samples,
        &names(&["A", "B"]),
        &PcaConfig::new().with_row_threshold(0.1).with_random_state(0),
    )
    .expect("enough data");
    assert_eq!(result.excluded_rows, vec![3]);
}

#[test]
fn test_excluded_rows_keep_slot_with_zero_scores() {
    let mut samples = two_groups();
    samples.push(row(&[("a", RawValue::Number(5.0))]));
    let result = Pca::new(PcaConfig::new().with_random_state(8))
        .run_with_clusters(
            &samples,
            &names(&["a", "b", "c"]),
            &KSelection::new().with_preferred_k(None).with_random_state(8),
        )
        .expect("enough data");

    assert_eq!(result.scores.n_rows(), 13);
    assert_eq!(result.clusters.len(), 13);
    assert_eq!(result.excluded_rows, vec![12]);
    assert!(result.scores.row(12).iter().all(|v| *v == 0.0));
    assert_eq!(result.clusters[12], UNCLUSTERED);

    // The two groups land in different clusters
    let first = result.clusters[0];
    let second = result.clusters[6];
    assert!(first >= 0 && second >= 0);
    assert_ne!(first, second);
    assert!(result.clusters[..6].iter().all(|&c| c == first));
    assert!(result.clusters[6..12].iter().all(|&c| c == second));
}

#[test]
fn test_run_without_clusters_marks_all_unclustered() {
    let result = run_pca(
        &two_groups(),
        &names(&["a", "b", "c"]),
        &PcaConfig::new().with_random_state(3),
    )
    .expect("enough data");
    assert!(result.clusters.iter().all(|&c| c == UNCLUSTERED));
}

#[test]
fn test_component_count_capped_by_rows() {
    let samples = SampleMatrix::from_columns(&[
        ("A", vec![1.0, 2.0, 4.0]),
        ("B", vec![3.0, 1.0, 2.0]),
        ("C", vec![0.5, 0.7, 0.1]),
        ("D", vec![9.0, 4.0, 6.0]),
    ]);
    let result = run_pca(
        &samples,
        &names(&["A", "B", "C", "D"]),
        &PcaConfig::new().with_n_components(Some(4)).with_random_state(6),
    )
    .expect("enough data");
    assert!(result.n_components() <= 2);
    assert!(result.n_components() >= 1);
}

#[test]
fn test_biplot_vectors_use_raw_loadings() {
    let result = run_pca(
        &collinear_pair_plus_independent(),
        &names(&["x", "y", "w"]),
        &PcaConfig::new().with_random_state(12),
    )
    .expect("enough data");
    let arrows = result.biplot_vectors();
    assert_eq!(arrows.len(), 3);
    assert_eq!(arrows[0].variable, "x");

    // One common stretch factor for every arrow
    let scale = arrows[0].x / result.loadings.get(0, 0);
    for (j, arrow) in arrows.iter().enumerate() {
        assert!((arrow.x - scale * result.loadings.get(0, j)).abs() < 1e-9);
        assert!((arrow.y - scale * result.loadings.get(1, j)).abs() < 1e-9);
    }

    let longest = arrows
        .iter()
        .map(|a| a.x.hypot(a.y))
        .fold(0.0_f64, f64::max);
    let max_score = (0..result.scores.n_rows())
        .flat_map(|i| [result.scores.get(i, 0).abs(), result.scores.get(i, 1).abs()])
        .fold(0.0_f64, f64::max);
    assert!((longest - max_score).abs() < 1e-9);
}

#[test]
fn test_single_component_has_no_biplot() {
    let result = run_pca(
        &collinear_pair_plus_independent(),
        &names(&["x", "y", "w"]),
        &PcaConfig::new().with_n_components(Some(1)).with_random_state(1),
    )
    .expect("enough data");
    assert_eq!(result.n_components(), 1);
    assert!(result.biplot_vectors().is_empty());
}

#[test]
fn test_too_few_variables_reports_breakdown() {
    let err = run_pca(
        &two_groups(),
        &names(&["a"]),
        &PcaConfig::new(),
    )
    .unwrap_err();
    match err {
        AssayError::InsufficientData {
            found,
            required,
            breakdown,
            ..
        } => {
            assert_eq!((found, required), (1, 2));
            assert_eq!(breakdown, vec![("a".to_string(), 12)]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_too_few_rows_reports_breakdown() {
    let samples = SampleMatrix::new(vec![
        row(&[("A", RawValue::Number(1.0)), ("B", RawValue::Number(1.0))]),
        row(&[("A", RawValue::Number(2.0)), ("B", RawValue::Number(3.0))]),
        row(&[("A", RawValue::Number(3.0)), ("B", RawValue::Missing)]),
    ]);
    let err = run_pca(&samples, &names(&["A", "B"]), &PcaConfig::new()).unwrap_err();
    assert!(err.to_string().contains("A=3"), "{err}");
    assert!(matches!(
        err,
        AssayError::InsufficientData { found: 2, required: 3, .. }
    ));
}

#[test]
fn test_unknown_variable_and_bad_config() {
    let samples = two_groups();
    assert!(matches!(
        run_pca(&samples, &names(&["a", "zz"]), &PcaConfig::new()),
        Err(AssayError::InvalidInput(_))
    ));
    assert!(matches!(
        run_pca(
            &samples,
            &names(&["a", "b"]),
            &PcaConfig::new().with_n_components(Some(0))
        ),
        Err(AssayError::InvalidHyperparameter { .. })
    ));
    assert!(run_pca(
        &samples,
        &names(&["a", "b"]),
        &PcaConfig::new().with_row_threshold(1.5)
    )
    .is_err());
}

#[test]
fn test_constant_data_has_no_components() {
    let samples = SampleMatrix::from_columns(&[
        ("A", vec![1.0, 1.0, 1.0, 1.0]),
        ("B", vec![2.0, 2.0, 2.0, 2.0]),
    ]);
    assert!(matches!(
        run_pca(&samples, &names(&["A", "B"]), &PcaConfig::new()),
        Err(AssayError::InsufficientData { found: 0, .. })
    ));
}

#[test]
fn test_config_serde_defaults() {
    let config: PcaConfig = serde_json::from_str(r#"{"random_state": 7}"#).expect("valid json");
    assert_eq!(config.n_components, Some(2));
    assert!((config.row_threshold - 0.8).abs() < 1e-12);
    assert_eq!(config.random_state, Some(7));
}

#[test]
fn test_unset_component_count_keeps_two() {
    let n = 40;
    let samples = SampleMatrix::from_columns(&[
        ("a", wave(1.0, n, false)),
        ("b", wave(2.0, n, true)),
        ("c", wave(3.0, n, false)),
        ("d", wave(5.0, n, true)),
    ]);
    let result = run_pca(
        &samples,
        &names(&["a", "b", "c", "d"]),
        &PcaConfig::new().with_n_components(None).with_random_state(3),
    )
    .expect("enough data");

    assert_eq!(result.n_components(), DEFAULT_COMPONENTS);
    assert_eq!(result.eigenvalues.len(), 2);
    assert_eq!(result.loadings.shape(), (2, 4));
    assert_eq!(result.scores.n_cols(), 2);
}
