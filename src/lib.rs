//! Assay: correlation, PCA and clustering for geochemical data in pure Rust.
//!
//! Assay explores multivariate sample data (element and oxide
//! concentrations per sample) for pairwise correlations and latent
//! structure. It consumes in-memory rows and returns plain serializable
//! results; parsing, charting and persistence belong to the caller.
//!
//! # Quick Start
//!
//! ```
//! use assay::prelude::*;
//!
//! // Zr and Hf track each other, Ba does not
//! let samples = SampleMatrix::from_columns(&[
//!     ("Zr", vec![120.0, 180.0, 240.0, 310.0, 150.0, 260.0]),
//!     ("Hf", vec![3.1, 4.6, 6.2, 8.0, 3.8, 6.7]),
//!     ("Ba", vec![410.0, 380.0, 520.0, 300.0, 610.0, 450.0]),
//! ]);
//! let variables: Vec<String> = ["Zr", "Hf", "Ba"].map(String::from).to_vec();
//!
//! let entries = scan(&samples, &variables, &ScanConfig::default()).expect("valid scan");
//! assert_eq!(entries.len(), 3);
//! assert!(entries[0].is_significant);
//! assert_eq!((entries[0].x.as_str(), entries[0].y.as_str()), ("Zr", "Hf"));
//!
//! let pca = run_pca(&samples, &variables, &PcaConfig::new().with_random_state(1))
//!     .expect("enough rows");
//! assert_eq!(pca.n_components(), 2);
//! ```
//!
//! # Modules
//!
//! - [`data`]: sample rows with raw (possibly non-numeric) values
//! - [`primitives`]: dense `f64` matrix
//! - [`stats`]: Pearson/Spearman statistics, correlation matrix, pairwise scan
//! - [`decomposition`]: power-iteration eigen solver and PCA
//! - [`preprocessing`]: z-score standardization
//! - [`cluster`]: k-means and optimal-k selection
//! - [`metrics`]: silhouette score and within-cluster sum of squares
//! - [`recommend`]: correlation-driven variable grouping for PCA
//! - [`config`]: JSON-loadable settings for every engine
//!
//! # Logging
//!
//! Engines emit [`tracing`] events at `debug` and `trace` level. The crate
//! never installs a subscriber.

pub mod cluster;
pub mod config;
pub mod data;
pub mod decomposition;
pub mod error;
pub mod metrics;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod recommend;
pub mod stats;
pub mod traits;

pub use error::{AssayError, Result};
pub use primitives::Matrix;
pub use traits::{Transformer, UnsupervisedEstimator};
