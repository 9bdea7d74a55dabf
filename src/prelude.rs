//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use assay::prelude::*;
//! ```

pub use crate::cluster::{cluster_scores, ClusterAssignment, KMeans, KSelection};
pub use crate::config::AnalysisConfig;
pub use crate::data::{RawValue, Sample, SampleMatrix};
pub use crate::decomposition::{run_pca, Pca, PcaConfig, PcaResult};
pub use crate::error::{AssayError, Result};
pub use crate::metrics::{silhouette_score, wcss};
pub use crate::primitives::Matrix;
pub use crate::recommend::{GroupRecommender, VariableGroupSuggestion};
pub use crate::stats::{
    correlation_matrix, scan, statistics, CorrelationMethod, CorrelationResult, ScanConfig,
    ScanEntry,
};
pub use crate::traits::{Transformer, UnsupervisedEstimator};
