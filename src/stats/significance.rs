//! Significance of correlation coefficients.
//!
//! A coefficient `r` over `n` pairs is tested with
//!
//! ```text
//! t  = r · sqrt((n - 2) / (1 - r²))      df = n - 2
//! p  = I_{df / (df + t²)}(df / 2, 1 / 2)   (two-tailed)
//! ```
//!
//! where `I_x(a, b)` is the regularized incomplete beta function, evaluated
//! with a continued fraction.

use std::f64::consts::PI;

/// Two-tailed p-value of a correlation coefficient over `n` pairs.
///
/// Returns 1.0 when `n < 3` (no degrees of freedom) and 0.0 for a perfect
/// correlation.
///
/// # Examples
///
/// ```
/// use assay::stats::significance::correlation_pvalue;
///
/// // r = 0.9 over 10 pairs is highly significant
/// assert!(correlation_pvalue(0.9, 10) < 0.001);
/// // r = 0 is never significant
/// assert!((correlation_pvalue(0.0, 10) - 1.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn correlation_pvalue(r: f64, n: usize) -> f64 {
    if n < 3 || !r.is_finite() {
        return 1.0;
    }
    let r2 = r * r;
    if r2 >= 1.0 {
        return 0.0;
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r2)).sqrt();
    t_distribution_pvalue(t, df)
}

/// Two-tailed p-value of Student's t statistic with `df` degrees of freedom.
#[must_use]
pub fn t_distribution_pvalue(t: f64, df: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    if df <= 0.0 {
        return 1.0;
    }
    let x = df / (df + t * t);
    incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

/// Regularized incomplete beta function `I_x(a, b)`.
#[must_use]
pub fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_bt = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let bt = ln_bt.exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        bt * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - bt * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

include!("beta_continued_fraction.rs");
