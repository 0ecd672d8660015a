//! Detector configuration

use crate::boosting::BoostingParams;
use crate::forest::ForestParams;
use lurescan_core::{Domain, Error, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Configuration for the detector and its training runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Directory holding persisted model and scaler artifacts
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Training settings for the URL domain
    #[serde(default = "DomainTrainingConfig::url_defaults")]
    pub url: DomainTrainingConfig,

    /// Training settings for the message domain
    #[serde(default = "DomainTrainingConfig::message_defaults")]
    pub message: DomainTrainingConfig,
}

/// Voting weights for the two ensemble members
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeights {
    /// Weight of the random forest
    pub forest: f64,
    /// Weight of the gradient boosting model
    pub boosting: f64,
}

/// Per-domain training settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainTrainingConfig {
    /// Random forest hyperparameters
    pub forest: ForestParams,

    /// Gradient boosting hyperparameters
    pub boosting: BoostingParams,

    /// Soft-voting weights
    pub weights: EnsembleWeights,

    /// Fraction of each class held out for evaluation
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    /// Seed for splitting and model randomness
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

impl DomainTrainingConfig {
    /// Defaults for URL classification
    pub fn url_defaults() -> Self {
        Self {
            forest: ForestParams {
                n_estimators: 200,
                max_depth: 20,
                min_samples_split: 5,
                min_samples_leaf: 2,
                balanced_class_weight: false,
                seed: default_seed(),
            },
            boosting: BoostingParams {
                n_estimators: 150,
                max_depth: 10,
                learning_rate: 0.1,
                subsample: 1.0,
                seed: default_seed(),
            },
            weights: EnsembleWeights {
                forest: 2.0,
                boosting: 1.0,
            },
            test_fraction: default_test_fraction(),
            seed: default_seed(),
        }
    }

    /// Defaults for message classification
    pub fn message_defaults() -> Self {
        Self {
            forest: ForestParams {
                n_estimators: 300,
                max_depth: 25,
                min_samples_split: 3,
                min_samples_leaf: 1,
                balanced_class_weight: true,
                seed: default_seed(),
            },
            boosting: BoostingParams {
                n_estimators: 200,
                max_depth: 12,
                learning_rate: 0.08,
                subsample: 0.8,
                seed: default_seed(),
            },
            weights: EnsembleWeights {
                forest: 3.0,
                boosting: 2.0,
            },
            test_fraction: default_test_fraction(),
            seed: default_seed(),
        }
    }

    /// Defaults for a domain
    pub fn defaults_for(domain: Domain) -> Self {
        match domain {
            Domain::Url => Self::url_defaults(),
            Domain::Message => Self::message_defaults(),
        }
    }

    /// Check that every setting is usable
    pub fn validate(&self, domain: Domain) -> Result<()> {
        let fail = |what: String| Err(Error::config(format!("{}: {}", domain, what)));

        if self.forest.n_estimators == 0 || self.boosting.n_estimators == 0 {
            return fail("n_estimators must be at least 1".to_string());
        }
        if self.forest.max_depth == 0 || self.boosting.max_depth == 0 {
            return fail("max_depth must be at least 1".to_string());
        }
        if !(self.boosting.learning_rate.is_finite() && self.boosting.learning_rate > 0.0) {
            return fail(format!(
                "learning_rate must be positive, got {}",
                self.boosting.learning_rate
            ));
        }
        if !(self.boosting.subsample > 0.0 && self.boosting.subsample <= 1.0) {
            return fail(format!(
                "subsample must be in (0, 1], got {}",
                self.boosting.subsample
            ));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return fail(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            ));
        }
        for (name, w) in [
            ("forest", self.weights.forest),
            ("boosting", self.weights.boosting),
        ] {
            if !(w.is_finite() && w > 0.0) {
                return fail(format!("{} weight must be positive, got {}", name, w));
            }
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            url: DomainTrainingConfig::url_defaults(),
            message: DomainTrainingConfig::message_defaults(),
        }
    }
}

impl DetectorConfig {
    /// Parse and validate a YAML document
    ///
    /// The document is layered over the defaults, so a partial section only
    /// overrides the keys it names and keeps the domain's own defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let invalid = |e: serde_yaml::Error| Error::config(format!("invalid YAML: {}", e));

        let overlay: Value = serde_yaml::from_str(content).map_err(invalid)?;
        let mut merged = serde_yaml::to_value(Self::default()).map_err(invalid)?;
        merge_yaml(&mut merged, overlay);

        let config: Self = serde_yaml::from_value(merged).map_err(invalid)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Use the given models directory
    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }

    /// Training settings for a domain
    pub fn domain(&self, domain: Domain) -> &DomainTrainingConfig {
        match domain {
            Domain::Url => &self.url,
            Domain::Message => &self.message,
        }
    }

    /// Validate both domains
    pub fn validate(&self) -> Result<()> {
        self.url.validate(Domain::Url)?;
        self.message.validate(Domain::Message)
    }
}

fn merge_yaml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_domain_asymmetry() {
        let config = DetectorConfig::default();
        assert_eq!(config.models_dir, PathBuf::from("./models"));
        assert_eq!(config.url.forest.n_estimators, 200);
        assert!(!config.url.forest.balanced_class_weight);
        assert_eq!(config.url.boosting.subsample, 1.0);
        assert_eq!(config.message.forest.n_estimators, 300);
        assert!(config.message.forest.balanced_class_weight);
        assert_eq!(config.message.boosting.learning_rate, 0.08);
        assert_eq!(config.message.weights.forest, 3.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
models_dir: /tmp/lurescan-models
url:
  forest:
    n_estimators: 25
  boosting:
    learning_rate: 0.2
"#;
        let config = DetectorConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.models_dir, PathBuf::from("/tmp/lurescan-models"));
        assert_eq!(config.url.forest.n_estimators, 25);
        assert_eq!(config.url.forest.max_depth, 20);
        assert_eq!(config.url.boosting.learning_rate, 0.2);
        assert_eq!(config.url.test_fraction, 0.2);
        assert_eq!(config.message, DomainTrainingConfig::message_defaults());
    }

    #[test]
    fn test_partial_message_section_keeps_message_defaults() {
        let yaml = "message:\n  forest:\n    n_estimators: 10\n";
        let config = DetectorConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.message.forest.n_estimators, 10);
        assert_eq!(config.message.forest.max_depth, 25);
        assert!(config.message.forest.balanced_class_weight);
        assert_eq!(config.message.boosting.subsample, 0.8);
        assert_eq!(config.url, DomainTrainingConfig::url_defaults());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(DetectorConfig::from_yaml("").unwrap(), DetectorConfig::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = DetectorConfig::default();
        config.url.boosting.subsample = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = DetectorConfig::default();
        config.message.test_fraction = 1.0;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.message.weights.boosting = -1.0;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.url.forest.n_estimators = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_yaml_is_a_config_error() {
        assert!(matches!(
            DetectorConfig::from_yaml("url: [1, 2"),
            Err(Error::Config(_))
        ));
    }
}
