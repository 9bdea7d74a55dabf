//! Correlation statistics for geochemical variables.
//!
//! - [`correlation`]: Pearson/Spearman coefficients, significance and OLS
//!   regression for one pair of series
//! - [`matrix`]: all-pairs Pearson matrix
//! - [`scan`]: exhaustive pairwise scan with significance flags and ranking
//! - [`significance`]: t-distribution p-values via the incomplete beta function
//!
//! # Examples
//!
//! ```
//! use assay::stats::{statistics, CorrelationMethod};
//!
//! let x: Vec<f64> = (-5..=5_i32).map(f64::from).collect();
//! let y: Vec<f64> = x.iter().map(|v| v.powi(3)).collect();
//!
//! let result = statistics(&x, &y, &CorrelationMethod::SUPPORTED).expect("supported methods");
//! assert!((result.spearman_r.expect("computed") - 1.0).abs() < 1e-12);
//! assert!(result.pearson_r.expect("computed") < 1.0);
//! ```

pub mod correlation;
pub mod matrix;
pub mod scan;
pub mod significance;

pub use correlation::{
    linear_regression, pearson, rank, spearman, statistics, CorrelationMethod,
    CorrelationResult, Regression,
};
pub use matrix::{
    correlation_matrix, correlation_matrix_from_samples, CorrelationMatrix, CorrelationMatrixJob,
};
pub use scan::{scan, Axis, AxisMode, ScanConfig, ScanEntry, ScanJob, ScanSummary};
pub use significance::correlation_pvalue;
