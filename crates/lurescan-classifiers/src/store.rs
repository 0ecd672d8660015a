//! Artifact persistence for trained units
//!
//! Each domain is stored as two JSON files in the models directory:
//! - `{domain}_model.json`: the fitted ensemble and the feature schema
//! - `{domain}_scaler.json`: the fitted scaler
//!
//! Both carry the `unit_id` minted at training time. A pair whose ids
//! disagree was not produced by the same training run and is never loaded.

use crate::ensemble::SoftVotingEnsemble;
use crate::model::ProbabilisticModel;
use crate::scaler::StandardScaler;
use lurescan_core::{Domain, Error, Label, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// A fitted scaler and ensemble that are only ever used together
#[derive(Debug, Clone)]
pub struct TrainedUnit {
    /// Id shared by both persisted artifacts
    pub unit_id: String,
    /// Domain the unit was trained for
    pub domain: Domain,
    /// Scaler fit on the training split
    pub scaler: StandardScaler,
    /// Fitted ensemble
    pub ensemble: SoftVotingEnsemble,
}

impl TrainedUnit {
    /// Bundle a fitted scaler and ensemble under a fresh id
    pub fn new(domain: Domain, scaler: StandardScaler, ensemble: SoftVotingEnsemble) -> Self {
        Self {
            unit_id: uuid::Uuid::new_v4().to_string(),
            domain,
            scaler,
            ensemble,
        }
    }

    /// Scale a raw feature row and classify it
    pub fn classify(&self, raw: &[f64]) -> Result<(Label, f64)> {
        let scaled = self.scaler.transform(raw)?;
        Ok(self.ensemble.classify(&scaled))
    }
}

#[derive(Serialize)]
struct ModelArtifactRef<'a> {
    unit_id: &'a str,
    domain: Domain,
    feature_names: &'a [String],
    ensemble: &'a SoftVotingEnsemble,
}

#[derive(Deserialize)]
struct ModelArtifact {
    unit_id: String,
    domain: Domain,
    feature_names: Vec<String>,
    ensemble: SoftVotingEnsemble,
}

#[derive(Serialize)]
struct ScalerArtifactRef<'a> {
    unit_id: &'a str,
    domain: Domain,
    scaler: &'a StandardScaler,
}

#[derive(Deserialize)]
struct ScalerArtifact {
    unit_id: String,
    domain: Domain,
    scaler: StandardScaler,
}

/// Modification time and length of both artifacts of a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactStamp {
    model: (SystemTime, u64),
    scaler: (SystemTime, u64),
}

fn file_stamp(path: &Path) -> Option<(SystemTime, u64)> {
    let meta = fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}

/// File-backed store for trained units
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Models directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the ensemble artifact
    pub fn model_path(&self, domain: Domain) -> PathBuf {
        self.dir.join(format!("{}_model.json", domain))
    }

    /// Path of the scaler artifact
    pub fn scaler_path(&self, domain: Domain) -> PathBuf {
        self.dir.join(format!("{}_scaler.json", domain))
    }

    /// True if both artifacts exist on disk
    pub fn exists(&self, domain: Domain) -> bool {
        self.model_path(domain).is_file() && self.scaler_path(domain).is_file()
    }

    /// Current stamp of both artifacts, or `None` if either is missing
    pub fn stamp(&self, domain: Domain) -> Option<ArtifactStamp> {
        Some(ArtifactStamp {
            model: file_stamp(&self.model_path(domain))?,
            scaler: file_stamp(&self.scaler_path(domain))?,
        })
    }

    /// Persist a unit; the scaler lands first and the model last
    pub fn save(&self, unit: &TrainedUnit) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let scaler = serde_json::to_vec(&ScalerArtifactRef {
            unit_id: &unit.unit_id,
            domain: unit.domain,
            scaler: &unit.scaler,
        })?;
        let model = serde_json::to_vec(&ModelArtifactRef {
            unit_id: &unit.unit_id,
            domain: unit.domain,
            feature_names: &unit.scaler.feature_names,
            ensemble: &unit.ensemble,
        })?;

        write_atomic(&self.scaler_path(unit.domain), &scaler)?;
        write_atomic(&self.model_path(unit.domain), &model)?;

        info!(
            domain = %unit.domain,
            unit_id = %unit.unit_id,
            dir = %self.dir.display(),
            "Saved trained unit"
        );
        Ok(())
    }

    /// Load a unit, or `None` if it is missing, unreadable or inconsistent
    ///
    /// Failures are logged and never propagated.
    pub fn load(&self, domain: Domain, schema: &[&str]) -> Option<TrainedUnit> {
        if !self.exists(domain) {
            debug!(domain = %domain, "No persisted artifacts");
            return None;
        }
        match self.try_load(domain, schema) {
            Ok(unit) => {
                info!(domain = %domain, unit_id = %unit.unit_id, "Loaded trained unit");
                Some(unit)
            }
            Err(e) => {
                warn!(domain = %domain, error = %e, "Failed to load trained unit");
                None
            }
        }
    }

    /// Load a unit and check it against the expected feature schema
    pub fn try_load(&self, domain: Domain, schema: &[&str]) -> Result<TrainedUnit> {
        let model: ModelArtifact = serde_json::from_slice(&fs::read(self.model_path(domain))?)?;
        let scaler: ScalerArtifact = serde_json::from_slice(&fs::read(self.scaler_path(domain))?)?;

        if model.unit_id != scaler.unit_id {
            return Err(Error::model(format!(
                "model unit {} does not match scaler unit {}",
                model.unit_id, scaler.unit_id
            )));
        }
        if model.domain != domain || scaler.domain != domain {
            return Err(Error::model(format!(
                "artifacts were trained for {}/{}, not {}",
                model.domain, scaler.domain, domain
            )));
        }
        let names_match = model.feature_names.len() == schema.len()
            && model.feature_names.iter().zip(schema).all(|(a, b)| a == b);
        if !names_match || !scaler.scaler.matches_schema(schema) {
            return Err(Error::model(format!(
                "feature schema mismatch: expected {} features, artifacts have {}",
                schema.len(),
                model.feature_names.len()
            )));
        }
        if !model.ensemble.is_fitted() {
            return Err(Error::model("ensemble is not fitted"));
        }
        model
            .ensemble
            .validate()
            .map_err(|e| Error::model(format!("invalid ensemble: {}", e)))?;

        Ok(TrainedUnit {
            unit_id: model.unit_id,
            domain,
            scaler: scaler.scaler,
            ensemble: model.ensemble,
        })
    }

    /// Delete both artifacts; returns true if anything was removed
    pub fn remove(&self, domain: Domain) -> Result<bool> {
        let mut removed = false;
        for path in [self.model_path(domain), self.scaler_path(domain)] {
            match fs::remove_file(&path) {
                Ok(()) => removed = true,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if removed {
            info!(domain = %domain, "Removed persisted artifacts");
        }
        Ok(removed)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boosting::{BoostingParams, GradientBoosting};
    use crate::ensemble::{EnsembleMember, WeightedMember};
    use crate::forest::{ForestParams, RandomForest};

    const SCHEMA: &[&str] = &["a", "b"];

    fn unit(domain: Domain) -> TrainedUnit {
        let x: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![i as f64, (i * i) as f64])
            .collect();
        let y: Vec<Label> = (0..10).map(|i| Label::from_index(usize::from(i >= 5))).collect();
        let scaler = StandardScaler::fit(SCHEMA, &x).unwrap();
        let scaled = scaler.transform_all(&x).unwrap();
        let mut ensemble = SoftVotingEnsemble::new(vec![
            WeightedMember {
                weight: 2.0,
                member: EnsembleMember::Bagging(RandomForest::new(ForestParams {
                    n_estimators: 5,
                    ..Default::default()
                })),
            },
            WeightedMember {
                weight: 1.0,
                member: EnsembleMember::Boosting(GradientBoosting::new(BoostingParams {
                    n_estimators: 5,
                    ..Default::default()
                })),
            },
        ])
        .unwrap();
        ensemble.fit(&scaled, &y).unwrap();
        TrainedUnit::new(domain, scaler, ensemble)
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("models"));
        let saved = unit(Domain::Url);
        store.save(&saved).unwrap();

        assert!(store.exists(Domain::Url));
        assert!(!store.model_path(Domain::Url).with_extension("json.tmp").exists());

        let loaded = store.load(Domain::Url, SCHEMA).unwrap();
        assert_eq!(loaded.unit_id, saved.unit_id);
        assert_eq!(
            loaded.classify(&[9.0, 81.0]).unwrap().0,
            saved.classify(&[9.0, 81.0]).unwrap().0
        );
    }

    #[test]
    fn test_missing_artifacts_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(store.load(Domain::Message, SCHEMA).is_none());
    }

    #[test]
    fn test_mismatched_unit_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&unit(Domain::Url)).unwrap();
        let scaler = fs::read(store.scaler_path(Domain::Url)).unwrap();

        store.save(&unit(Domain::Url)).unwrap();
        fs::write(store.scaler_path(Domain::Url), scaler).unwrap();

        assert!(matches!(
            store.try_load(Domain::Url, SCHEMA),
            Err(Error::Model(_))
        ));
        assert!(store.load(Domain::Url, SCHEMA).is_none());
    }

    #[test]
    fn test_schema_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&unit(Domain::Url)).unwrap();
        assert!(store.load(Domain::Url, &["a", "b", "c"]).is_none());
        assert!(store.load(Domain::Url, &["b", "a"]).is_none());
    }

    #[test]
    fn test_domain_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&unit(Domain::Url)).unwrap();
        fs::rename(store.model_path(Domain::Url), store.model_path(Domain::Message)).unwrap();
        fs::rename(store.scaler_path(Domain::Url), store.scaler_path(Domain::Message)).unwrap();
        assert!(store.load(Domain::Message, SCHEMA).is_none());
    }

    #[test]
    fn test_corrupt_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&unit(Domain::Message)).unwrap();
        fs::write(store.model_path(Domain::Message), b"{not json").unwrap();
        assert!(matches!(
            store.try_load(Domain::Message, SCHEMA),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_invalid_weights_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&unit(Domain::Url)).unwrap();

        let path = store.model_path(Domain::Url);
        let mut artifact: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        artifact["ensemble"]["members"][0]["weight"] = serde_json::json!(0.0);
        artifact["ensemble"]["members"][1]["weight"] = serde_json::json!(-1.0);
        fs::write(&path, serde_json::to_vec(&artifact).unwrap()).unwrap();

        assert!(matches!(
            store.try_load(Domain::Url, SCHEMA),
            Err(Error::Model(_))
        ));
        assert!(store.load(Domain::Url, SCHEMA).is_none());
    }

    #[test]
    fn test_stamp_tracks_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(store.stamp(Domain::Url).is_none());

        store.save(&unit(Domain::Url)).unwrap();
        let saved = store.stamp(Domain::Url).unwrap();
        assert_eq!(store.stamp(Domain::Url), Some(saved));

        fs::write(store.scaler_path(Domain::Url), b"{}").unwrap();
        assert_ne!(store.stamp(Domain::Url), Some(saved));

        fs::remove_file(store.model_path(Domain::Url)).unwrap();
        assert!(store.stamp(Domain::Url).is_none());
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&unit(Domain::Url)).unwrap();
        assert!(store.remove(Domain::Url).unwrap());
        assert!(!store.exists(Domain::Url));
        assert!(!store.remove(Domain::Url).unwrap());
    }
}
