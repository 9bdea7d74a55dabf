//! Host-facing configuration bundle.
//!
//! [`AnalysisConfig`] groups the settings of every engine so a host can load
//! them from one JSON document. Missing sections and fields take their
//! defaults.
//!
//! ```
//! use assay::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::from_json(
//!     r#"{"scan": {"corr_threshold": 0.6}, "random_state": 42}"#,
//! ).expect("valid config");
//! assert!((config.scan_config().corr_threshold - 0.6).abs() < 1e-12);
//! assert_eq!(config.pca_config().random_state, Some(42));
//! assert_eq!(config.group_recommender().threshold, 0.7);
//! ```

use crate::cluster::KSelection;
use crate::decomposition::PcaConfig;
use crate::error::{AssayError, Result};
use crate::recommend::GroupRecommender;
use crate::stats::ScanConfig;
use serde::{Deserialize, Serialize};

/// Settings for scan, PCA, clustering and grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pairwise scan thresholds
    pub scan: ScanConfig,
    /// PCA settings
    pub pca: PcaConfig,
    /// Optimal-k heuristic
    pub clustering: KSelection,
    /// Variable grouping
    pub grouping: GroupRecommender,
    /// Seed applied to PCA and clustering when they have none of their own
    pub random_state: Option<u64>,
}

impl AnalysisConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `Config` for malformed JSON and the validation error for
    /// out-of-range settings.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Config` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first section error found.
    pub fn validate(&self) -> Result<()> {
        self.scan.validate()?;
        self.pca.validate()?;
        self.clustering.validate()?;
        let threshold = self.grouping.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AssayError::invalid_hyperparameter(
                "grouping.threshold",
                threshold,
                "in [0, 1]",
            ));
        }
        if self.grouping.min_group_size > self.grouping.max_group_size {
            return Err(AssayError::Config(format!(
                "grouping.min_group_size ({}) exceeds grouping.max_group_size ({})",
                self.grouping.min_group_size, self.grouping.max_group_size
            )));
        }
        Ok(())
    }

    /// Scan settings.
    #[must_use]
    pub fn scan_config(&self) -> ScanConfig {
        self.scan.clone()
    }

    /// PCA settings, seeded from `random_state` if unseeded.
    #[must_use]
    pub fn pca_config(&self) -> PcaConfig {
        let seed = self.pca.random_state.or(self.random_state);
        self.pca.clone().with_optional_random_state(seed)
    }

    /// Clustering settings, seeded from `random_state` if unseeded.
    #[must_use]
    pub fn k_selection(&self) -> KSelection {
        let seed = self.clustering.random_state.or(self.random_state);
        self.clustering.clone().with_optional_random_state(seed)
    }

    /// Grouping settings.
    #[must_use]
    pub fn group_recommender(&self) -> GroupRecommender {
        self.grouping.clone()
    }
}
