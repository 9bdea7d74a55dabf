//! Exhaustive pairwise correlation scan.
//!
//! Every unordered pair of axes is tested with the requested methods and
//! flagged significant when any method has `|r| >= corr_threshold` and
//! `p <= p_threshold`. An axis is either a raw variable or a ratio of two raw
//! variables; ratio rows with a zero or missing denominator are dropped.
//!
//! Output is ordered significant first, then by descending `|pearson_r|`.
//!
//! A scan over hundreds of variables means tens of thousands of pairs, so
//! [`ScanJob`] processes a bounded number of pairs per
//! [`step`](ScanJob::step). No threads are spawned; dropping the job cancels
//! it.
//!
//! # Examples
//!
//! ```
//! use assay::data::SampleMatrix;
//! use assay::stats::{scan, ScanConfig};
//!
//! let samples = SampleMatrix::from_columns(&[
//!     ("Fe", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
//!     ("Mn", vec![2.1, 3.9, 6.2, 8.1, 9.8, 12.2]),
//!     ("Ca", vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0]),
//! ]);
//! let names = vec!["Fe".to_string(), "Mn".to_string(), "Ca".to_string()];
//!
//! let entries = scan(&samples, &names, &ScanConfig::default()).expect("valid scan");
//! assert_eq!(entries.len(), 3);
//! assert!(entries[0].is_significant);
//! assert_eq!((entries[0].x.as_str(), entries[0].y.as_str()), ("Fe", "Mn"));
//! ```

use super::correlation::{ensure_supported, statistics, CorrelationMethod, CorrelationResult};
use crate::data::SampleMatrix;
use crate::error::{AssayError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// One analysis axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// A raw variable.
    Variable(String),
    /// `numerator / denominator` of two raw variables.
    Ratio {
        /// Numerator variable
        numerator: String,
        /// Denominator variable
        denominator: String,
    },
}

impl Axis {
    /// Raw-variable axis.
    #[must_use]
    pub fn variable(name: &str) -> Self {
        Axis::Variable(name.to_string())
    }

    /// Ratio axis.
    #[must_use]
    pub fn ratio(numerator: &str, denominator: &str) -> Self {
        Axis::Ratio {
            numerator: numerator.to_string(),
            denominator: denominator.to_string(),
        }
    }

    /// Display label: the variable name, or `"num/den"`.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Axis::Variable(name) => name.clone(),
            Axis::Ratio {
                numerator,
                denominator,
            } => format!("{numerator}/{denominator}"),
        }
    }

    /// Raw variables the axis reads.
    #[must_use]
    pub fn variables(&self) -> Vec<&str> {
        match self {
            Axis::Variable(name) => vec![name.as_str()],
            Axis::Ratio {
                numerator,
                denominator,
            } => vec![numerator.as_str(), denominator.as_str()],
        }
    }

    /// Row-aligned series; unusable rows are `NaN`.
    #[must_use]
    pub fn series(&self, samples: &SampleMatrix) -> Vec<f64> {
        match self {
            Axis::Variable(name) => samples.column(name),
            Axis::Ratio {
                numerator,
                denominator,
            } => samples.ratio_column(numerator, denominator),
        }
    }
}

/// How variables are turned into axes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisMode {
    /// Each variable is an axis.
    #[default]
    Raw,
    /// Each variable divided by a common denominator (the denominator itself
    /// is not scanned).
    Ratio(String),
    /// Caller-supplied axes; the variable list is ignored.
    Custom(Vec<Axis>),
}

impl AxisMode {
    /// Resolves the axes for a variable list.
    #[must_use]
    pub fn axes(&self, variables: &[String]) -> Vec<Axis> {
        match self {
            AxisMode::Raw => variables.iter().map(|v| Axis::variable(v)).collect(),
            AxisMode::Ratio(denominator) => variables
                .iter()
                .filter(|v| *v != denominator)
                .map(|v| Axis::ratio(v, denominator))
                .collect(),
            AxisMode::Custom(axes) => axes.clone(),
        }
    }
}

/// Scan thresholds and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Minimum `|r|` for significance (default 0.5)
    pub corr_threshold: f64,
    /// Maximum p-value for significance (default 0.05)
    pub p_threshold: f64,
    /// Methods to compute (default Pearson)
    pub methods: Vec<CorrelationMethod>,
    /// Axis construction
    pub axis_mode: AxisMode,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            corr_threshold: 0.5,
            p_threshold: 0.05,
            methods: vec![CorrelationMethod::Pearson],
            axis_mode: AxisMode::Raw,
        }
    }
}

impl ScanConfig {
    /// Sets the correlation threshold.
    #[must_use]
    pub fn with_corr_threshold(mut self, threshold: f64) -> Self {
        self.corr_threshold = threshold;
        self
    }

    /// Sets the p-value threshold.
    #[must_use]
    pub fn with_p_threshold(mut self, threshold: f64) -> Self {
        self.p_threshold = threshold;
        self
    }

    /// Sets the methods.
    #[must_use]
    pub fn with_methods(mut self, methods: &[CorrelationMethod]) -> Self {
        self.methods = methods.to_vec();
        self
    }

    /// Sets the axis mode.
    #[must_use]
    pub fn with_axis_mode(mut self, mode: AxisMode) -> Self {
        self.axis_mode = mode;
        self
    }

    /// Checks thresholds and methods.
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range thresholds, an empty method list or
    /// an unsupported method.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.corr_threshold) {
            return Err(AssayError::invalid_hyperparameter(
                "corr_threshold",
                self.corr_threshold,
                "in [0, 1]",
            ));
        }
        if self.p_threshold.is_nan() || self.p_threshold <= 0.0 || self.p_threshold > 1.0 {
            return Err(AssayError::invalid_hyperparameter(
                "p_threshold",
                self.p_threshold,
                "in (0, 1]",
            ));
        }
        if self.methods.is_empty() {
            return Err(AssayError::empty_input("correlation methods"));
        }
        ensure_supported(&self.methods)
    }
}

/// One scanned pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEntry {
    /// Label of the first axis
    pub x: String,
    /// Label of the second axis
    pub y: String,
    /// Statistics for the pair
    pub result: CorrelationResult,
    /// Whether any requested method crosses both thresholds
    pub is_significant: bool,
}

/// Counts over a finished scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Pairs scanned
    pub total: usize,
    /// Pairs flagged significant
    pub significant: usize,
    /// Pairs with too few valid observations
    pub errored: usize,
}

impl ScanSummary {
    /// Summarizes scan entries.
    #[must_use]
    pub fn from_entries(entries: &[ScanEntry]) -> Self {
        entries.iter().fold(Self::default(), |acc, e| Self {
            total: acc.total + 1,
            significant: acc.significant + usize::from(e.is_significant),
            errored: acc.errored + usize::from(e.result.is_error()),
        })
    }
}

/// Significant first, then descending `|pearson_r|`; missing Pearson last.
fn scan_order(a: &ScanEntry, b: &ScanEntry) -> Ordering {
    b.is_significant.cmp(&a.is_significant).then_with(|| {
        match (a.result.pearson_r, b.result.pearson_r) {
            (Some(ra), Some(rb)) => rb.abs().total_cmp(&ra.abs()),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    })
}

/// Incremental scan over all unordered axis pairs.
#[derive(Debug, Clone)]
pub struct ScanJob {
    config: ScanConfig,
    labels: Vec<String>,
    series: Vec<Vec<f64>>,
    cursor: (usize, usize),
    entries: Vec<ScanEntry>,
}

impl ScanJob {
    /// Validates the request and extracts every axis series.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, an axis names an unknown
    /// variable, or fewer than two axes remain.
    pub fn new(samples: &SampleMatrix, variables: &[String], config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let axes = config.axis_mode.axes(variables);

        for axis in &axes {
            if let Some(missing) = axis.variables().into_iter().find(|v| !samples.has_variable(v)) {
                return Err(AssayError::InvalidInput(format!(
                    "unknown variable '{missing}' in axis '{}'",
                    axis.label()
                )));
            }
        }
        if axes.len() < 2 {
            return Err(AssayError::insufficient("scan axes", axes.len(), 2));
        }

        let labels: Vec<String> = axes.iter().map(Axis::label).collect();
        let series: Vec<Vec<f64>> = axes.iter().map(|a| a.series(samples)).collect();
        let total = axes.len() * (axes.len() - 1) / 2;
        debug!(axes = axes.len(), pairs = total, "scan prepared");

        Ok(Self {
            config,
            labels,
            series,
            cursor: (0, 1),
            entries: Vec::with_capacity(total),
        })
    }

    /// Total number of pairs.
    #[must_use]
    pub fn total_pairs(&self) -> usize {
        let n = self.labels.len();
        n * (n - 1) / 2
    }

    /// Pairs processed so far.
    #[must_use]
    pub fn completed_pairs(&self) -> usize {
        self.entries.len()
    }

    /// Returns true once every pair is processed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.cursor.0 + 1 >= self.labels.len()
    }

    /// Fraction of pairs processed, in [0, 1].
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.completed_pairs() as f64 / self.total_pairs() as f64
    }

    /// Processes up to `max_pairs` pairs. Returns true while work remains.
    ///
    /// # Errors
    ///
    /// Propagates statistics errors; these cannot occur for a job built by
    /// [`ScanJob::new`].
    pub fn step(&mut self, max_pairs: usize) -> Result<bool> {
        let n = self.labels.len();
        for _ in 0..max_pairs.max(1) {
            if self.is_done() {
                break;
            }
            let (i, j) = self.cursor;
            let result = statistics(&self.series[i], &self.series[j], &self.config.methods)?;
            let is_significant = result.is_significant(
                &self.config.methods,
                self.config.corr_threshold,
                self.config.p_threshold,
            );
            trace!(x = %self.labels[i], y = %self.labels[j], n = result.n, is_significant, "pair scanned");
            self.entries.push(ScanEntry {
                x: self.labels[i].clone(),
                y: self.labels[j].clone(),
                result,
                is_significant,
            });

            self.cursor = if j + 1 < n { (i, j + 1) } else { (i + 1, i + 2) };
        }
        Ok(!self.is_done())
    }

    /// Runs any remaining pairs and returns the ordered entries.
    ///
    /// # Errors
    ///
    /// Propagates statistics errors from the remaining pairs.
    pub fn finish(mut self) -> Result<Vec<ScanEntry>> {
        while self.step(usize::MAX)? {}
        let mut entries = self.entries;
        entries.sort_by(scan_order);
        let summary = ScanSummary::from_entries(&entries);
        debug!(
            total = summary.total,
            significant = summary.significant,
            errored = summary.errored,
            "scan finished"
        );
        Ok(entries)
    }
}

/// Scans every unordered pair of axes built from `variables`.
///
/// # Errors
///
/// Returns an error if the config is invalid, a variable is unknown, or
/// fewer than two axes are available.
pub fn scan(
    samples: &SampleMatrix,
    variables: &[String],
    config: &ScanConfig,
) -> Result<Vec<ScanEntry>> {
    ScanJob::new(samples, variables, config.clone())?.finish()
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
