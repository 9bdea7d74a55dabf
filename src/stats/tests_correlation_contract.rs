// =========================================================================
// Correlation contract: properties every correlation result must satisfy
//
// References:
//   - Pearson (1896) "Regression, heredity, and panmixia"
//   - Spearman (1904) "The proof and measurement of association"
// =========================================================================

use super::*;

/// Coefficients stay within [-1, 1] for noisy data.
#[test]
fn falsify_corr_coefficient_bounded() {
    let x: Vec<f64> = (0..50_i32).map(|i| f64::from(i) * 0.37).collect();
    let y: Vec<f64> = x
        .iter()
        .enumerate()
        .map(|(i, v)| v.sin() * 3.0 + (i % 7) as f64)
        .collect();
    let result = statistics(&x, &y, &CorrelationMethod::SUPPORTED).expect("supported");

    for r in [result.pearson_r, result.spearman_r].into_iter().flatten() {
        assert!(
            (-1.0..=1.0).contains(&r),
            "FALSIFIED: coefficient {r} outside [-1, 1]"
        );
    }
}

/// p-values are probabilities.
#[test]
fn falsify_corr_pvalue_bounded() {
    let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let y = vec![6.0, 1.0, 5.0, 2.0, 4.0, 3.0];
    let result = statistics(&x, &y, &CorrelationMethod::SUPPORTED).expect("supported");

    for p in [result.pearson_p, result.spearman_p].into_iter().flatten() {
        assert!((0.0..=1.0).contains(&p), "FALSIFIED: p-value {p} outside [0, 1]");
    }
}

/// Correlation is symmetric in its arguments.
#[test]
fn falsify_corr_symmetric() {
    let x = vec![1.2, 3.4, 2.2, 5.1, 4.4, 0.3];
    let y = vec![2.0, 2.9, 2.1, 6.3, 3.8, 0.1];
    let xy = statistics(&x, &y, &CorrelationMethod::SUPPORTED).expect("supported");
    let yx = statistics(&y, &x, &CorrelationMethod::SUPPORTED).expect("supported");

    assert!((xy.pearson_r.expect("computed") - yx.pearson_r.expect("computed")).abs() < 1e-12);
    assert!((xy.spearman_r.expect("computed") - yx.spearman_r.expect("computed")).abs() < 1e-12);
}

/// Correlation is invariant to positive affine rescaling (ppm vs wt%).
#[test]
fn falsify_corr_scale_invariant() {
    let x = vec![0.5, 1.5, 0.9, 2.2, 1.8];
    let y = vec![10.0, 31.0, 17.0, 44.0, 39.0];
    let x_ppm: Vec<f64> = x.iter().map(|v| v * 10_000.0).collect();

    let r1 = pearson(&x, &y);
    let r2 = pearson(&x_ppm, &y);
    assert!((r1 - r2).abs() < 1e-12, "FALSIFIED: {r1} != {r2}");
}

/// Fewer than three pairs never raises.
#[test]
fn falsify_corr_short_input_never_errs() {
    for len in 0..3_i32 {
        let x: Vec<f64> = (0..len).map(f64::from).collect();
        let result = statistics(&x, &x, &CorrelationMethod::SUPPORTED);
        assert!(result.is_ok_and(|r| r.is_error()), "FALSIFIED at len {len}");
    }
}
