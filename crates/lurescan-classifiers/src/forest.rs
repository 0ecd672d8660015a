//! Bagged decision trees (random forest)

use crate::model::{check_training_set, label_targets, ProbabilisticModel};
use crate::tree::{DecisionTree, TrainingView, TreeParams};
use lurescan_core::{Label, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum rows required to split a node
    pub min_samples_split: usize,
    /// Minimum rows in each leaf
    pub min_samples_leaf: usize,
    /// Reweight classes inversely to their frequency
    pub balanced_class_weight: bool,
    /// Seed for bootstrap sampling and feature subsampling
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: 20,
            min_samples_split: 5,
            min_samples_leaf: 2,
            balanced_class_weight: false,
            seed: 42,
        }
    }
}

/// An ensemble of trees grown on bootstrap samples with per-split feature
/// subsampling; the fake probability is the mean leaf fake fraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    #[serde(default)]
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Create an unfitted forest
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
        }
    }

    /// Hyperparameters
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Number of fitted trees
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

/// `n / (2 * n_class)` per row when balancing, 1.0 otherwise
fn class_weights(y: &[Label], balanced: bool) -> Vec<f64> {
    if !balanced {
        return vec![1.0; y.len()];
    }
    let n = y.len() as f64;
    let fakes = y.iter().filter(|l| **l == Label::Fake).count() as f64;
    let legit = n - fakes;
    y.iter()
        .map(|l| match l {
            Label::Fake => n / (2.0 * fakes),
            Label::Legitimate => n / (2.0 * legit),
        })
        .collect()
}

impl ProbabilisticModel for RandomForest {
    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<()> {
        check_training_set(x, y)?;

        let n = x.len();
        let n_features = x[0].len();
        let target = label_targets(y);
        let weight = class_weights(y, self.params.balanced_class_weight);
        let data = TrainingView {
            x,
            target: &target,
            weight: &weight,
        };
        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
            min_samples_leaf: self.params.min_samples_leaf,
            max_features: Some(((n_features as f64).sqrt().floor() as usize).max(1)),
        };

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut trees = Vec::with_capacity(self.params.n_estimators);
        for _ in 0..self.params.n_estimators.max(1) {
            let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let tree = DecisionTree::fit(&data, rows, &tree_params, &mut rng, |leaf| {
                let (mut w, mut wy) = (0.0, 0.0);
                for &r in leaf {
                    w += weight[r];
                    wy += weight[r] * target[r];
                }
                if w > 0.0 {
                    wy / w
                } else {
                    0.5
                }
            });
            trees.push(tree);
        }

        self.trees = trees;
        Ok(())
    }

    fn predict_proba(&self, row: &[f64]) -> [f64; 2] {
        if self.trees.is_empty() {
            return [0.5, 0.5];
        }
        let fake = self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64;
        let fake = fake.clamp(0.0, 1.0);
        [1.0 - fake, fake]
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
