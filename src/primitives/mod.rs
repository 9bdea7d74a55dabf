//! Core compute primitives.
//!
//! A dense row-major `f64` matrix shared by the correlation, eigen, PCA and
//! clustering code. Series are plain `Vec<f64>` / `&[f64]`.

mod matrix;

pub use matrix::Matrix;
pub(crate) use matrix::dot;
