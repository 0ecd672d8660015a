//! Detector facade
//!
//! Owns one feature extractor and one lazily loaded trained unit per domain.
//! Detection never fails: a missing, corrupt or mismatched unit yields the
//! untrained result. A missing unit is looked up again on the next call; a
//! rejected pair is only re-read once either file changes on disk.

use crate::config::DetectorConfig;
use crate::corpus::LabeledCorpus;
use crate::message_features::MessageFeatureExtractor;
use crate::reasons::{message_reasons, url_reasons};
use crate::store::{ArtifactStamp, ArtifactStore, TrainedUnit};
use crate::training::{train_unit, TrainingReport};
use crate::url_features::UrlFeatureExtractor;
use lurescan_core::{DetectionResult, Domain, Error, FeatureVector, Label, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Cached unit for one domain, plus the stamp of the last artifacts that
/// failed to load
#[derive(Default)]
struct UnitCache {
    unit: Option<Arc<TrainedUnit>>,
    rejected: Option<ArtifactStamp>,
}

type Slot = RwLock<UnitCache>;

/// Classifies URLs and messages as legitimate or fake
pub struct Detector {
    config: DetectorConfig,
    store: ArtifactStore,
    url_extractor: UrlFeatureExtractor,
    message_extractor: MessageFeatureExtractor,
    url_unit: Slot,
    message_unit: Slot,
}

impl Detector {
    /// Create a detector; nothing is loaded until first use
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: ArtifactStore::new(config.models_dir.clone()),
            url_extractor: UrlFeatureExtractor::new()?,
            message_extractor: MessageFeatureExtractor::new()?,
            url_unit: RwLock::new(UnitCache::default()),
            message_unit: RwLock::new(UnitCache::default()),
            config,
        })
    }

    /// Detector with the default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(DetectorConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Artifact store backing this detector
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Feature names for a domain, in model order
    pub fn feature_names(&self, domain: Domain) -> &'static [&'static str] {
        match domain {
            Domain::Url => self.url_extractor.feature_names(),
            Domain::Message => self.message_extractor.feature_names(),
        }
    }

    /// Raw (unscaled) feature vector for an input
    pub fn extract_features(&self, domain: Domain, input: &str) -> FeatureVector {
        match domain {
            Domain::Url => self.url_extractor.extract_vector(input),
            Domain::Message => self.message_extractor.extract_vector(input),
        }
    }

    /// True if a trained unit is cached or can be loaded from storage
    pub fn is_trained(&self, domain: Domain) -> bool {
        self.unit(domain).is_some()
    }

    /// Classify a URL
    pub fn detect_url(&self, url: &str) -> DetectionResult {
        self.detect(Domain::Url, url)
    }

    /// Classify a message
    pub fn detect_message(&self, message: &str) -> DetectionResult {
        self.detect(Domain::Message, message)
    }

    /// Classify an input in the given domain
    pub fn detect(&self, domain: Domain, input: &str) -> DetectionResult {
        let start = Instant::now();

        let Some(unit) = self.unit(domain) else {
            debug!(domain = %domain, "No trained unit, returning untrained result");
            return DetectionResult::untrained(domain, input);
        };

        let verdict = match domain {
            Domain::Url => {
                let features = self.url_extractor.extract(input);
                unit.classify(&features.to_values())
                    .map(|(label, confidence)| {
                        (label, confidence, url_reasons(&features, label, confidence))
                    })
            }
            Domain::Message => {
                let features = self.message_extractor.extract(input);
                unit.classify(&features.to_values())
                    .map(|(label, confidence)| {
                        (label, confidence, message_reasons(&features, label, confidence))
                    })
            }
        };

        let (label, confidence, reasons) = match verdict {
            Ok(v) => v,
            Err(e) => {
                warn!(domain = %domain, error = %e, "Classification failed");
                return DetectionResult::untrained(domain, input);
            }
        };

        let latency_us = start.elapsed().as_micros() as u64;
        metrics::counter!(
            "lurescan_detections_total",
            "domain" => domain.as_str(),
            "label" => label.as_str()
        )
        .increment(1);
        metrics::histogram!("lurescan_detection_latency_us", "domain" => domain.as_str())
            .record(latency_us as f64);

        DetectionResult {
            domain,
            input: input.to_string(),
            label,
            confidence,
            reasons,
            latency_us,
        }
    }

    /// Train a domain on parallel example and label lists
    ///
    /// The resulting unit is persisted and replaces any cached one.
    pub fn train<S: AsRef<str>>(
        &self,
        domain: Domain,
        examples: &[S],
        labels: &[Label],
    ) -> Result<TrainingReport> {
        if examples.len() != labels.len() {
            return Err(Error::invalid_argument(format!(
                "{} examples but {} labels",
                examples.len(),
                labels.len()
            )));
        }

        info!(domain = %domain, examples = examples.len(), "Extracting features");
        let rows: Vec<Vec<f64>> = examples
            .iter()
            .map(|e| self.extract_features(domain, e.as_ref()).into_values())
            .collect();

        let (unit, report) = train_unit(
            domain,
            self.feature_names(domain),
            &rows,
            labels,
            self.config.domain(domain),
        )?;
        self.store.save(&unit)?;
        *self.slot(domain).write() = UnitCache {
            unit: Some(Arc::new(unit)),
            rejected: None,
        };

        info!(
            domain = %domain,
            accuracy = report.accuracy,
            unit_id = %report.unit_id,
            "Training complete"
        );
        Ok(report)
    }

    /// Train a domain on a labeled corpus
    pub fn train_corpus(&self, domain: Domain, corpus: &LabeledCorpus) -> Result<TrainingReport> {
        let (texts, labels) = corpus.split();
        self.train(domain, &texts, &labels)
    }

    /// Delete persisted artifacts and drop the cached unit
    pub fn reset(&self, domain: Domain) -> Result<bool> {
        let mut slot = self.slot(domain).write();
        *slot = UnitCache::default();
        self.store.remove(domain)
    }

    fn slot(&self, domain: Domain) -> &Slot {
        match domain {
            Domain::Url => &self.url_unit,
            Domain::Message => &self.message_unit,
        }
    }

    fn unit(&self, domain: Domain) -> Option<Arc<TrainedUnit>> {
        let slot = self.slot(domain);
        {
            let cache = slot.read();
            if let Some(unit) = &cache.unit {
                return Some(Arc::clone(unit));
            }
            if cache.rejected.is_some() && cache.rejected == self.store.stamp(domain) {
                return None;
            }
        }

        let mut cache = slot.write();
        if let Some(unit) = &cache.unit {
            return Some(Arc::clone(unit));
        }
        let stamp = self.store.stamp(domain);
        if stamp.is_some() && cache.rejected == stamp {
            return None;
        }
        match self.store.load(domain, self.feature_names(domain)) {
            Some(unit) => {
                let unit = Arc::new(unit);
                *cache = UnitCache {
                    unit: Some(Arc::clone(&unit)),
                    rejected: None,
                };
                Some(unit)
            }
            None => {
                cache.rejected = stamp;
                None
            }
        }
    }
}
