//! Matrix type for 2D numeric data.

use crate::error::{AssayError, Result};
use serde::{Deserialize, Serialize};

/// A 2D matrix of values (row-major storage).
///
/// # Examples
///
/// ```
/// use assay::primitives::Matrix;
///
/// let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("data length matches rows * cols");
/// assert_eq!(m.shape(), (2, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Copy> Matrix<T> {
    /// Creates a new matrix from a vector of data.
    ///
    /// # Errors
    ///
    /// Returns an error if data length doesn't match rows * cols.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(AssayError::DimensionMismatch {
                expected: format!("{rows}x{cols} = {} values", rows * cols),
                actual: format!("{} values", data.len()),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Builds a matrix from equally sized rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows have different lengths.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(AssayError::dimension_mismatch(
                    &format!("row {i} length"),
                    cols,
                    row.len(),
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    /// Returns the shape as (rows, cols).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.cols
    }

    /// Gets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    /// Sets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    /// Returns a row as a slice.
    #[must_use]
    pub fn row(&self, row_idx: usize) -> &[T] {
        let start = row_idx * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Returns a column as an owned vector.
    #[must_use]
    pub fn column(&self, col_idx: usize) -> Vec<T> {
        (0..self.rows)
            .map(|row| self.data[row * self.cols + col_idx])
            .collect()
    }

    /// Iterates over rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// Returns the underlying data as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Converts into nested row vectors.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows().map(<[T]>::to_vec).collect()
    }
}

impl Matrix<f64> {
    /// Creates a matrix of zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Creates an identity matrix.
    #[must_use]
    pub fn eye(n: usize) -> Self {
        Self::diag(&vec![1.0; n])
    }

    /// Creates a square matrix with `values` on the diagonal.
    #[must_use]
    pub fn diag(values: &[f64]) -> Self {
        let n = values.len();
        let mut data = vec![0.0; n * n];
        for (i, &v) in values.iter().enumerate() {
            data[i * n + i] = v;
        }
        Self {
            data,
            rows: n,
            cols: n,
        }
    }

    /// Returns true if the matrix is square.
    #[must_use]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Returns true if the matrix is square and `|a_ij - a_ji| <= tol`.
    #[must_use]
    pub fn is_symmetric(&self, tol: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        for i in 0..self.rows {
            for j in (i + 1)..self.cols {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Transposes the matrix.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut data = vec![0.0; self.rows * self.cols];
        for i in 0..self.rows {
            for j in 0..self.cols {
                data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Self {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Matrix-matrix multiplication.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions don't match.
    pub fn matmul(&self, other: &Self) -> Result<Self> {
        if self.cols != other.rows {
            return Err(AssayError::dimension_mismatch(
                "inner dimension",
                self.cols,
                other.rows,
            ));
        }

        let mut result = vec![0.0; self.rows * other.cols];
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    result[i * other.cols + j] += a * other.get(k, j);
                }
            }
        }

        Ok(Self {
            data: result,
            rows: self.rows,
            cols: other.cols,
        })
    }

    /// Matrix-vector multiplication.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions don't match.
    pub fn matvec(&self, vec: &[f64]) -> Result<Vec<f64>> {
        if self.cols != vec.len() {
            return Err(AssayError::dimension_mismatch(
                "vector length",
                self.cols,
                vec.len(),
            ));
        }

        Ok(self.rows().map(|row| dot(row, vec)).collect())
    }

    /// Multiplies each element by a scalar.
    #[must_use]
    pub fn mul_scalar(&self, scalar: f64) -> Self {
        Self {
            data: self.data.iter().map(|x| x * scalar).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Subtracts `scale * v vᵀ` in place (rank-one update used for deflation).
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not `v.len()` square.
    pub fn sub_outer(&mut self, scale: f64, v: &[f64]) {
        assert!(self.rows == v.len() && self.cols == v.len());
        let n = v.len();
        for i in 0..n {
            for j in 0..n {
                self.data[i * n + j] -= scale * v[i] * v[j];
            }
        }
    }
}

/// Dot product of two equally long slices.
#[must_use]
pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
