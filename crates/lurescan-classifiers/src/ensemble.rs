//! Soft-voting ensemble over heterogeneous members

use crate::boosting::GradientBoosting;
use crate::forest::RandomForest;
use crate::model::{argmax, check_training_set, ProbabilisticModel};
use lurescan_core::{Error, Label, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A concrete ensemble member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnsembleMember {
    /// Bagged trees
    Bagging(RandomForest),
    /// Boosted trees
    Boosting(GradientBoosting),
}

impl EnsembleMember {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bagging(_) => "random_forest",
            Self::Boosting(_) => "gradient_boosting",
        }
    }

    fn model(&self) -> &dyn ProbabilisticModel {
        match self {
            Self::Bagging(m) => m,
            Self::Boosting(m) => m,
        }
    }

    fn model_mut(&mut self) -> &mut dyn ProbabilisticModel {
        match self {
            Self::Bagging(m) => m,
            Self::Boosting(m) => m,
        }
    }
}

/// Member plus its voting weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedMember {
    /// Relative voting weight (must be positive)
    pub weight: f64,
    /// The member model
    pub member: EnsembleMember,
}

/// Weighted average of member probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftVotingEnsemble {
    members: Vec<WeightedMember>,
}

impl SoftVotingEnsemble {
    /// Create an ensemble; weights must be positive and finite
    pub fn new(members: Vec<WeightedMember>) -> Result<Self> {
        let ensemble = Self { members };
        ensemble.validate()?;
        Ok(ensemble)
    }

    /// Check member weights; deserialized ensembles bypass [`Self::new`]
    pub fn validate(&self) -> Result<()> {
        if self.members.is_empty() {
            return Err(Error::invalid_argument("ensemble needs at least one member"));
        }
        if let Some(bad) = self
            .members
            .iter()
            .find(|m| !(m.weight.is_finite() && m.weight > 0.0))
        {
            return Err(Error::invalid_argument(format!(
                "ensemble weight for {} must be positive, got {}",
                bad.member.kind(),
                bad.weight
            )));
        }
        Ok(())
    }

    /// Members in voting order
    pub fn members(&self) -> &[WeightedMember] {
        &self.members
    }

    /// Predicted label and the probability of that label
    pub fn classify(&self, row: &[f64]) -> (Label, f64) {
        let proba = self.predict_proba(row);
        let label = argmax(proba);
        (label, proba[label.index()])
    }
}

impl ProbabilisticModel for SoftVotingEnsemble {
    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<()> {
        check_training_set(x, y)?;
        for m in &mut self.members {
            debug!(member = m.member.kind(), weight = m.weight, "Fitting ensemble member");
            m.member.model_mut().fit(x, y)?;
        }
        Ok(())
    }

    fn predict_proba(&self, row: &[f64]) -> [f64; 2] {
        let total: f64 = self.members.iter().map(|m| m.weight).sum();
        if total <= 0.0 {
            return [0.5, 0.5];
        }
        let fake = self
            .members
            .iter()
            .map(|m| m.weight * m.member.model().predict_proba(row)[1])
            .sum::<f64>()
            / total;
        let fake = fake.clamp(0.0, 1.0);
        [1.0 - fake, fake]
    }

    fn is_fitted(&self) -> bool {
        !self.members.is_empty() && self.members.iter().all(|m| m.member.model().is_fitted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boosting::BoostingParams;
    use crate::forest::ForestParams;

    fn members(rf_weight: f64, gb_weight: f64) -> Vec<WeightedMember> {
        vec![
            WeightedMember {
                weight: rf_weight,
                member: EnsembleMember::Bagging(RandomForest::new(ForestParams {
                    n_estimators: 10,
                    max_depth: 4,
                    min_samples_split: 2,
                    min_samples_leaf: 1,
                    ..Default::default()
                })),
            },
            WeightedMember {
                weight: gb_weight,
                member: EnsembleMember::Boosting(GradientBoosting::new(BoostingParams {
                    n_estimators: 10,
                    max_depth: 2,
                    ..Default::default()
                })),
            },
        ]
    }

    fn toy() -> (Vec<Vec<f64>>, Vec<Label>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..12 {
            x.push(vec![i as f64]);
            y.push(Label::Legitimate);
            x.push(vec![40.0 + i as f64]);
            y.push(Label::Fake);
        }
        (x, y)
    }

    #[test]
    fn test_weights_must_be_positive() {
        assert!(SoftVotingEnsemble::new(members(0.0, 1.0)).is_err());
        assert!(SoftVotingEnsemble::new(members(1.0, f64::NAN)).is_err());
        assert!(SoftVotingEnsemble::new(Vec::new()).is_err());
        assert!(SoftVotingEnsemble::new(members(2.0, 1.0)).is_ok());
    }

    #[test]
    fn test_weighted_average_of_members() {
        let (x, y) = toy();
        let mut ensemble = SoftVotingEnsemble::new(members(2.0, 1.0)).unwrap();
        assert!(!ensemble.is_fitted());
        ensemble.fit(&x, &y).unwrap();
        assert!(ensemble.is_fitted());

        let row = [45.0];
        let rf = ensemble.members()[0].member.model().predict_proba(&row)[1];
        let gb = ensemble.members()[1].member.model().predict_proba(&row)[1];
        let expected = (2.0 * rf + gb) / 3.0;
        assert!((ensemble.predict_proba(&row)[1] - expected).abs() < 1e-12);

        let (label, confidence) = ensemble.classify(&row);
        assert_eq!(label, Label::Fake);
        assert!((0.5..=1.0).contains(&confidence));
    }

    #[test]
    fn test_serde_round_trip_preserves_predictions() {
        let (x, y) = toy();
        let mut ensemble = SoftVotingEnsemble::new(members(3.0, 2.0)).unwrap();
        ensemble.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&ensemble).unwrap();
        assert!(json.contains("\"kind\":\"bagging\""));
        let restored: SoftVotingEnsemble = serde_json::from_str(&json).unwrap();
        for v in [3.0, 45.0] {
            let (a, pa) = restored.classify(&[v]);
            let (b, pb) = ensemble.classify(&[v]);
            assert_eq!(a, b);
            assert!((pa - pb).abs() < 1e-9);
        }
    }
}
