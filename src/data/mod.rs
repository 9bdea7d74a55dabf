//! Sample matrix for named geochemical columns.
//!
//! Rows arrive from parsers as loosely typed maps (numbers, numeric strings,
//! blanks, "<LOD" markers, ...). Nothing is coerced on ingest; every consumer
//! asks for a column and gets `NaN` where a value does not parse, so each
//! algorithm can apply its own missing-value policy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single raw cell value.
///
/// # Examples
///
/// ```
/// use assay::data::RawValue;
///
/// assert_eq!(RawValue::from(2.5).as_f64(), Some(2.5));
/// assert_eq!(RawValue::from(" 12.0 ").as_f64(), Some(12.0));
/// assert_eq!(RawValue::from("<0.01").as_f64(), None);
/// assert_eq!(RawValue::Missing.as_f64(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Numeric cell.
    Number(f64),
    /// Text cell; parses if it trims to a finite number.
    Text(String),
    /// Empty / null cell.
    Missing,
}

impl RawValue {
    /// Returns the value as a finite `f64`, if it parses.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) if v.is_finite() => Some(*v),
            RawValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<Option<f64>> for RawValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(RawValue::Missing, RawValue::Number)
    }
}

/// One sample: variable name to raw value.
pub type Sample = BTreeMap<String, RawValue>;

/// Ordered rows of samples.
///
/// Row order is significant: PCA scores and cluster labels are aligned to it.
///
/// # Examples
///
/// ```
/// use assay::data::SampleMatrix;
///
/// let samples = SampleMatrix::from_columns(&[
///     ("SiO2", vec![50.1, 52.3, 48.7]),
///     ("MgO", vec![7.2, f64::NAN, 8.1]),
/// ]);
/// assert_eq!(samples.len(), 3);
/// assert_eq!(samples.valid_count("MgO"), 2);
/// assert!(samples.column("MgO")[1].is_nan());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleMatrix {
    rows: Vec<Sample>,
}

impl SampleMatrix {
    /// Creates a sample matrix from rows.
    #[must_use]
    pub fn new(rows: Vec<Sample>) -> Self {
        Self { rows }
    }

    /// Builds a sample matrix from numeric columns. Non-finite values become
    /// [`RawValue::Missing`]. Shorter columns leave trailing cells missing.
    #[must_use]
    pub fn from_columns(columns: &[(&str, Vec<f64>)]) -> Self {
        let n_rows = columns.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
        let rows = (0..n_rows)
            .map(|i| {
                columns
                    .iter()
                    .map(|(name, col)| {
                        let value = col
                            .get(i)
                            .copied()
                            .filter(|v| v.is_finite())
                            .map_or(RawValue::Missing, RawValue::Number);
                        ((*name).to_string(), value)
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Appends a row.
    pub fn push(&mut self, row: Sample) {
        self.rows.push(row);
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[Sample] {
        &self.rows
    }

    /// Returns true if any row carries the variable.
    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.rows.iter().any(|row| row.contains_key(name))
    }

    /// Parsed value at (row, variable).
    #[must_use]
    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        self.rows.get(row)?.get(name)?.as_f64()
    }

    /// Extracts one variable as a row-aligned series; unparseable cells are `NaN`.
    #[must_use]
    pub fn column(&self, name: &str) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.get(name).and_then(RawValue::as_f64).unwrap_or(f64::NAN))
            .collect()
    }

    /// Row-aligned `numerator / denominator`. Rows where either side does not
    /// parse or the denominator is zero become `NaN`.
    #[must_use]
    pub fn ratio_column(&self, numerator: &str, denominator: &str) -> Vec<f64> {
        self.column(numerator)
            .into_iter()
            .zip(self.column(denominator))
            .map(|(num, den)| {
                if num.is_finite() && den.is_finite() && den != 0.0 {
                    let ratio = num / den;
                    if ratio.is_finite() {
                        return ratio;
                    }
                }
                f64::NAN
            })
            .collect()
    }

    /// Number of rows in which the variable parses.
    #[must_use]
    pub fn valid_count(&self, name: &str) -> usize {
        self.rows
            .iter()
            .filter(|row| row.get(name).and_then(RawValue::as_f64).is_some())
            .count()
    }

    /// Mean over all parseable values of the variable.
    #[must_use]
    pub fn column_mean(&self, name: &str) -> Option<f64> {
        let (sum, count) = self
            .rows
            .iter()
            .filter_map(|row| row.get(name).and_then(RawValue::as_f64))
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Number of the given variables that parse in `row`.
    #[must_use]
    pub fn parsed_fields(&self, row: usize, names: &[String]) -> usize {
        names
            .iter()
            .filter(|name| self.value(row, name).is_some())
            .count()
    }
}

impl From<Vec<Sample>> for SampleMatrix {
    fn from(rows: Vec<Sample>) -> Self {
        Self::new(rows)
    }
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
