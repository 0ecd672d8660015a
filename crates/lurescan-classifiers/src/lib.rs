//! LureScan Classifiers
//!
//! Phishing link and scam message detection with small tree ensembles.
//!
//! Each domain (URL, message) has:
//! - a deterministic feature extractor producing a fixed, named schema
//! - a standard scaler fit on the training split
//! - a soft-voting ensemble of a random forest and gradient-boosted trees
//! - a rule table that turns raw features into human-readable reasons
//!
//! The [`Detector`] facade ties these together, loading persisted units
//! lazily and never failing on per-input anomalies.

pub mod boosting;
pub mod config;
pub mod corpus;
pub mod detector;
pub mod ensemble;
pub mod forest;
pub mod message_features;
pub mod model;
pub mod reasons;
pub mod scaler;
pub mod store;
pub mod text;
pub mod training;
pub mod tree;
pub mod url_features;

pub use boosting::{BoostingParams, GradientBoosting};
pub use config::{DetectorConfig, DomainTrainingConfig, EnsembleWeights};
pub use corpus::{LabeledCorpus, LabeledExample};
pub use detector::Detector;
pub use ensemble::{EnsembleMember, SoftVotingEnsemble, WeightedMember};
pub use forest::{ForestParams, RandomForest};
pub use message_features::{MessageFeatureExtractor, MessageFeatures, MESSAGE_FEATURE_NAMES};
pub use model::ProbabilisticModel;
pub use scaler::StandardScaler;
pub use store::{ArtifactStamp, ArtifactStore, TrainedUnit};
pub use training::{ClassificationReport, TrainingReport};
pub use url_features::{UrlFeatureExtractor, UrlFeatures, URL_FEATURE_NAMES};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::DetectorConfig;
    pub use crate::detector::Detector;
    pub use crate::message_features::MessageFeatureExtractor;
    pub use crate::model::ProbabilisticModel;
    pub use crate::url_features::UrlFeatureExtractor;
    pub use lurescan_core::{DetectionResult, Domain, Label};
}
