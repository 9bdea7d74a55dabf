//! Clustering of PCA scores.
//!
//! [`KMeans`] partitions points on their first two dimensions;
//! [`KSelection`] picks the cluster count from silhouette and elbow scores.
//!
//! # Examples
//!
//! ```
//! use assay::cluster::{cluster_scores, KSelection};
//! use assay::primitives::Matrix;
//!
//! let scores = Matrix::from_vec(6, 2, vec![
//!     -3.0, -3.0, -3.1, -2.9, -2.9, -3.1,
//!     3.0, 3.0, 3.1, 2.9, 2.9, 3.1,
//! ]).expect("6x2");
//!
//! let assignment = cluster_scores(&scores, &KSelection::new().with_random_state(0))
//!     .expect("non-empty scores");
//! assert_eq!(assignment.labels.len(), 6);
//! assert_eq!(assignment.labels[0], assignment.labels[1]);
//! ```

mod kmeans;
mod selection;

pub use kmeans::{kmeans, KMeans};
pub use selection::{
    choose_optimal_k, cluster_scores, ClusterAssignment, KCandidate, KSelection, MAX_CANDIDATE_K,
};
