//! Training protocol: stratified split, fitting and held-out evaluation

use crate::boosting::GradientBoosting;
use crate::config::DomainTrainingConfig;
use crate::ensemble::{EnsembleMember, SoftVotingEnsemble, WeightedMember};
use crate::forest::RandomForest;
use crate::model::ProbabilisticModel;
use crate::scaler::StandardScaler;
use crate::store::TrainedUnit;
use lurescan_core::{Domain, Error, Label, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Split row indices into `(train, test)`, holding out the same fraction of
/// each class
///
/// Every class needs at least two rows so that both sides see it.
pub fn stratified_split(
    labels: &[Label],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(Error::invalid_argument(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [Label::Legitimate, Label::Fake] {
        let mut rows: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == class).collect();
        if rows.len() < 2 {
            return Err(Error::invalid_argument(format!(
                "need at least 2 {} examples to split, got {}",
                class,
                rows.len()
            )));
        }
        rows.shuffle(&mut rng);
        let held_out = ((rows.len() as f64 * test_fraction).round() as usize).clamp(1, rows.len() - 1);
        test.extend_from_slice(&rows[..held_out]);
        train.extend_from_slice(&rows[held_out..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Held-out evaluation summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    /// Metrics for legitimate (index 0) and fake (index 1)
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

impl ClassificationReport {
    /// Score predictions against ground truth
    pub fn from_predictions(truth: &[Label], predicted: &[Label]) -> Self {
        let total = truth.len();
        let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();

        let mut classes = [ClassMetrics::default(); 2];
        for class in [Label::Legitimate, Label::Fake] {
            let pairs = || truth.iter().zip(predicted);
            let tp = pairs().filter(|(t, p)| **t == class && **p == class).count() as f64;
            let predicted_pos = predicted.iter().filter(|p| **p == class).count() as f64;
            let support = truth.iter().filter(|t| **t == class).count();

            let precision = safe_div(tp, predicted_pos);
            let recall = safe_div(tp, support as f64);
            classes[class.index()] = ClassMetrics {
                precision,
                recall,
                f1: safe_div(2.0 * precision * recall, precision + recall),
                support,
            };
        }

        let average = |weight: &dyn Fn(&ClassMetrics) -> f64| {
            let w: Vec<f64> = classes.iter().map(weight).collect();
            let sum: f64 = w.iter().sum();
            let avg = |f: fn(&ClassMetrics) -> f64| {
                safe_div(classes.iter().zip(&w).map(|(c, w)| f(c) * w).sum(), sum)
            };
            ClassMetrics {
                precision: avg(|c| c.precision),
                recall: avg(|c| c.recall),
                f1: avg(|c| c.f1),
                support: total,
            }
        };

        Self {
            classes,
            accuracy: safe_div(correct as f64, total as f64),
            macro_avg: average(&|_| 1.0),
            weighted_avg: average(&|c| c.support as f64),
        }
    }

    /// Metrics for one class
    pub fn class(&self, label: Label) -> &ClassMetrics {
        &self.classes[label.index()]
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = 12;
        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>width$} {:>10.2}{:>10.2}{:>10.2}{:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )
        };

        writeln!(
            f,
            "{:>width$} {:>10}{:>10}{:>10}{:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        row(f, "Legitimate", &self.classes[0])?;
        row(f, "Fake", &self.classes[1])?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>10}{:>10}{:>10.2}{:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}

/// Outcome of one training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub domain: Domain,
    /// Held-out accuracy
    pub accuracy: f64,
    pub report: ClassificationReport,
    pub train_size: usize,
    pub test_size: usize,
    /// Id of the unit produced by the run
    pub unit_id: String,
}

/// Unfitted ensemble with the configured members and weights
pub fn build_ensemble(config: &DomainTrainingConfig) -> Result<SoftVotingEnsemble> {
    SoftVotingEnsemble::new(vec![
        WeightedMember {
            weight: config.weights.forest,
            member: EnsembleMember::Bagging(RandomForest::new(config.forest.clone())),
        },
        WeightedMember {
            weight: config.weights.boosting,
            member: EnsembleMember::Boosting(GradientBoosting::new(config.boosting.clone())),
        },
    ])
}

/// Fit a scaler and ensemble on the training split and score the held-out split
pub fn train_unit(
    domain: Domain,
    feature_names: &[&str],
    rows: &[Vec<f64>],
    labels: &[Label],
    config: &DomainTrainingConfig,
) -> Result<(TrainedUnit, TrainingReport)> {
    if rows.len() != labels.len() {
        return Err(Error::invalid_argument(format!(
            "{} examples but {} labels",
            rows.len(),
            labels.len()
        )));
    }
    if rows.is_empty() {
        return Err(Error::invalid_argument("no training examples"));
    }
    config.validate(domain)?;

    let (train_idx, test_idx) = stratified_split(labels, config.test_fraction, config.seed)?;
    let pick_rows = |idx: &[usize]| idx.iter().map(|&i| rows[i].clone()).collect::<Vec<_>>();
    let pick_labels = |idx: &[usize]| idx.iter().map(|&i| labels[i]).collect::<Vec<_>>();

    let (x_train, y_train) = (pick_rows(&train_idx), pick_labels(&train_idx));
    let (x_test, y_test) = (pick_rows(&test_idx), pick_labels(&test_idx));
    debug!(
        domain = %domain,
        train = x_train.len(),
        test = x_test.len(),
        "Split training data"
    );

    let scaler = StandardScaler::fit(feature_names, &x_train)?;
    let x_train = scaler.transform_all(&x_train)?;

    info!(domain = %domain, rows = x_train.len(), "Training ensemble");
    let mut ensemble = build_ensemble(config)?;
    ensemble.fit(&x_train, &y_train)?;

    let predicted: Vec<Label> = scaler
        .transform_all(&x_test)?
        .iter()
        .map(|row| ensemble.predict(row))
        .collect();
    let report = ClassificationReport::from_predictions(&y_test, &predicted);
    info!(domain = %domain, accuracy = report.accuracy, "Model accuracy: {:.4}", report.accuracy);
    debug!("Classification report:\n{}", report);

    let unit = TrainedUnit::new(domain, scaler, ensemble);
    let summary = TrainingReport {
        domain,
        accuracy: report.accuracy,
        report,
        train_size: train_idx.len(),
        test_size: test_idx.len(),
        unit_id: unit.unit_id.clone(),
    };
    Ok((unit, summary))
}
