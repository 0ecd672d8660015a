//! CART regression tree used by both ensemble members
//!
//! Splits minimize weighted squared error, which for 0/1 targets is half the
//! Gini impurity, so the same tree serves as a classification tree inside the
//! random forest and as a residual regressor inside gradient boosting. Leaf
//! values are supplied by the caller.

use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

const MIN_GAIN: f64 = 1e-12;

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth; the root is depth 0
    pub max_depth: usize,
    /// Minimum rows required to consider splitting a node
    pub min_samples_split: usize,
    /// Minimum rows on each side of a split
    pub min_samples_leaf: usize,
    /// Features examined per split; `None` examines all of them
    pub max_features: Option<usize>,
}

/// Borrowed training data for one tree
pub struct TrainingView<'a> {
    /// Dense feature rows
    pub x: &'a [Vec<f64>],
    /// Regression target per row
    pub target: &'a [f64],
    /// Weight per row
    pub weight: &'a [f64],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted binary tree stored as a flat node arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

#[derive(Clone, Copy, Default)]
struct Moments {
    w: f64,
    wy: f64,
    wy2: f64,
}

impl Moments {
    fn add(&mut self, w: f64, y: f64) {
        self.w += w;
        self.wy += w * y;
        self.wy2 += w * y * y;
    }

    fn minus(&self, other: &Moments) -> Moments {
        Moments {
            w: self.w - other.w,
            wy: self.wy - other.wy,
            wy2: self.wy2 - other.wy2,
        }
    }

    /// Weighted sum of squared deviations from the weighted mean
    fn sse(&self) -> f64 {
        if self.w <= 0.0 {
            0.0
        } else {
            (self.wy2 - self.wy * self.wy / self.w).max(0.0)
        }
    }
}

struct Builder<'a, 'r, R: Rng + ?Sized, F> {
    data: &'a TrainingView<'a>,
    params: &'a TreeParams,
    rng: &'r mut R,
    leaf_value: F,
    n_features: usize,
    nodes: Vec<Node>,
}

impl<'a, 'r, R, F> Builder<'a, 'r, R, F>
where
    R: Rng + ?Sized,
    F: FnMut(&[usize]) -> f64,
{
    fn moments(&self, rows: &[usize]) -> Moments {
        let mut m = Moments::default();
        for &r in rows {
            m.add(self.data.weight[r], self.data.target[r]);
        }
        m
    }

    fn leaf(&mut self, rows: &[usize]) -> usize {
        let value = (self.leaf_value)(rows);
        self.nodes.push(Node::Leaf { value });
        self.nodes.len() - 1
    }

    fn build(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let parent = self.moments(&rows);
        if depth >= self.params.max_depth
            || rows.len() < self.params.min_samples_split.max(2)
            || rows.len() < 2 * self.params.min_samples_leaf.max(1)
            || parent.sse() <= MIN_GAIN
        {
            return self.leaf(&rows);
        }

        let Some(split) = self.best_split(&rows, parent) else {
            return self.leaf(&rows);
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&r| self.data.x[r][split.feature] <= split.threshold);

        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { value: 0.0 });
        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);
        self.nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        match self.params.max_features {
            Some(k) if k > 0 && k < self.n_features => {
                sample(&mut *self.rng, self.n_features, k).into_vec()
            }
            _ => (0..self.n_features).collect(),
        }
    }

    fn best_split(&mut self, rows: &[usize], parent: Moments) -> Option<Split> {
        let min_leaf = self.params.min_samples_leaf.max(1);
        let parent_sse = parent.sse();
        let mut best: Option<Split> = None;
        let mut sorted = rows.to_vec();

        for feature in self.candidate_features() {
            let x = self.data.x;
            sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

            let mut left = Moments::default();
            for i in 0..sorted.len() - 1 {
                let r = sorted[i];
                left.add(self.data.weight[r], self.data.target[r]);

                let here = x[r][feature];
                let next = x[sorted[i + 1]][feature];
                if here == next {
                    continue;
                }
                let n_left = i + 1;
                if n_left < min_leaf || sorted.len() - n_left < min_leaf {
                    continue;
                }

                let right = parent.minus(&left);
                let gain = parent_sse - left.sse() - right.sse();
                if gain > MIN_GAIN && best.as_ref().map_or(true, |b| gain > b.gain) {
                    let mut threshold = here / 2.0 + next / 2.0;
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(Split {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }
        best
    }
}

impl DecisionTree {
    /// Grow a tree on the given row indices
    ///
    /// `leaf_value` receives the rows that reach each leaf and returns the
    /// value stored there.
    pub fn fit<R, F>(
        data: &TrainingView<'_>,
        rows: Vec<usize>,
        params: &TreeParams,
        rng: &mut R,
        leaf_value: F,
    ) -> Self
    where
        R: Rng + ?Sized,
        F: FnMut(&[usize]) -> f64,
    {
        let n_features = data.x.first().map_or(0, Vec::len);
        let mut builder = Builder {
            data,
            params,
            rng,
            leaf_value,
            n_features,
            nodes: Vec::new(),
        };
        if rows.is_empty() || n_features == 0 {
            builder.leaf(&rows);
        } else {
            builder.build(rows, 0);
        }
        Self {
            nodes: builder.nodes,
        }
    }

    /// Value of the leaf this row falls into
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).copied().unwrap_or(0.0);
                    index = if x <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    /// Number of nodes, leaves included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match nodes.get(index) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}
