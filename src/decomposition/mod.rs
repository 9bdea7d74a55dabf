//! Matrix decomposition and principal component analysis.
//!
//! - [`eigen`]: power iteration with deflation for symmetric matrices
//! - [`pca`]: standardization, covariance, scores and variance shares

pub mod eigen;
pub mod pca;

pub use eigen::{top_eigen_pairs, EigenPair, PowerIteration};
pub use pca::{
    run_pca, BiplotVector, Pca, PcaConfig, PcaResult, DEFAULT_COMPONENTS, MIN_PCA_ROWS,
    UNCLUSTERED,
};
