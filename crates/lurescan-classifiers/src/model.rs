//! Probabilistic model trait shared by the ensemble members

use lurescan_core::{Error, Label, Result};

/// A binary classifier that can be trained and yields class probabilities
pub trait ProbabilisticModel {
    /// Fit the model on dense rows and their labels
    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<()>;

    /// Probabilities for `[legitimate, fake]`; the pair sums to 1
    fn predict_proba(&self, row: &[f64]) -> [f64; 2];

    /// True once `fit` has completed
    fn is_fitted(&self) -> bool;

    /// Most probable class; ties go to legitimate
    fn predict(&self, row: &[f64]) -> Label {
        argmax(self.predict_proba(row))
    }
}

/// Index of the larger probability; the first class wins ties
pub fn argmax(proba: [f64; 2]) -> Label {
    if proba[1] > proba[0] {
        Label::Fake
    } else {
        Label::Legitimate
    }
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Reject training sets the models cannot learn from
pub fn check_training_set(x: &[Vec<f64>], y: &[Label]) -> Result<()> {
    if x.len() != y.len() {
        return Err(Error::invalid_argument(format!(
            "{} rows but {} labels",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(Error::invalid_argument("training set is empty"));
    }
    let width = x[0].len();
    if width == 0 || x.iter().any(|r| r.len() != width) {
        return Err(Error::invalid_argument("rows must share a non-zero width"));
    }
    if !y.contains(&Label::Fake) || !y.contains(&Label::Legitimate) {
        return Err(Error::invalid_argument(
            "training set must contain both fake and legitimate examples",
        ));
    }
    Ok(())
}

/// Labels as 0.0 / 1.0 regression targets
pub fn label_targets(y: &[Label]) -> Vec<f64> {
    y.iter().map(|l| l.index() as f64).collect()
}
