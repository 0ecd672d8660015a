//! Gradient-boosted trees with binomial deviance loss

use crate::model::{check_training_set, label_targets, sigmoid, ProbabilisticModel};
use crate::tree::{DecisionTree, TrainingView, TreeParams};
use lurescan_core::{Label, Result};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

const PRIOR_CLAMP: f64 = 1e-15;
const MIN_HESSIAN: f64 = 1e-150;

/// Gradient boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    /// Number of boosting rounds
    pub n_estimators: usize,
    /// Maximum depth of each regression tree
    pub max_depth: usize,
    /// Shrinkage applied to every tree
    pub learning_rate: f64,
    /// Fraction of rows drawn (without replacement) per round
    pub subsample: f64,
    /// Seed for row subsampling
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 150,
            max_depth: 10,
            learning_rate: 0.1,
            subsample: 1.0,
            seed: 42,
        }
    }
}

/// Additive log-odds model built from shallow regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    params: BoostingParams,
    #[serde(default)]
    init: f64,
    #[serde(default)]
    trees: Vec<DecisionTree>,
}

impl GradientBoosting {
    /// Create an unfitted model
    pub fn new(params: BoostingParams) -> Self {
        Self {
            params,
            init: 0.0,
            trees: Vec::new(),
        }
    }

    /// Hyperparameters
    pub fn params(&self) -> &BoostingParams {
        &self.params
    }

    /// Number of fitted rounds
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Raw log-odds for the fake class
    pub fn decision_function(&self, row: &[f64]) -> f64 {
        self.init
            + self.params.learning_rate * self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }
}

impl ProbabilisticModel for GradientBoosting {
    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<()> {
        check_training_set(x, y)?;

        let n = x.len();
        let target = label_targets(y);
        let ones = vec![1.0; n];

        let prior = (target.iter().sum::<f64>() / n as f64).clamp(PRIOR_CLAMP, 1.0 - PRIOR_CLAMP);
        let init = (prior / (1.0 - prior)).ln();

        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        };
        let subsample = self.params.subsample.clamp(0.0, 1.0);
        let draw = ((subsample * n as f64).round() as usize).clamp(1, n);

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut raw = vec![init; n];
        let mut trees = Vec::with_capacity(self.params.n_estimators);

        for _ in 0..self.params.n_estimators {
            let proba: Vec<f64> = raw.iter().map(|f| sigmoid(*f)).collect();
            let residual: Vec<f64> = target.iter().zip(&proba).map(|(y, p)| y - p).collect();

            let rows = if draw < n {
                sample(&mut rng, n, draw).into_vec()
            } else {
                (0..n).collect()
            };

            let data = TrainingView {
                x,
                target: &residual,
                weight: &ones,
            };
            let tree = DecisionTree::fit(&data, rows, &tree_params, &mut rng, |leaf| {
                let numerator: f64 = leaf.iter().map(|&r| residual[r]).sum();
                let denominator: f64 = leaf.iter().map(|&r| proba[r] * (1.0 - proba[r])).sum();
                if denominator.abs() < MIN_HESSIAN {
                    0.0
                } else {
                    numerator / denominator
                }
            });

            for (f, row) in raw.iter_mut().zip(x) {
                *f += self.params.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        self.init = init;
        self.trees = trees;
        Ok(())
    }

    fn predict_proba(&self, row: &[f64]) -> [f64; 2] {
        if !self.is_fitted() {
            return [0.5, 0.5];
        }
        let fake = sigmoid(self.decision_function(row));
        [1.0 - fake, fake]
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
