//! Per-domain feature standardization

use lurescan_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Zero-mean, unit-variance scaler learned from training rows
///
/// Fit once on the training split and reused unchanged for every later
/// inference. A zero-variance column always maps to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Feature names the scaler was fit with, in column order
    pub feature_names: Vec<String>,
    /// Per-column mean
    pub mean: Vec<f64>,
    /// Per-column population standard deviation
    pub std_dev: Vec<f64>,
}

impl StandardScaler {
    /// Learn column means and standard deviations
    pub fn fit(feature_names: &[&str], rows: &[Vec<f64>]) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::invalid_argument("cannot fit scaler on zero rows"));
        }
        let width = feature_names.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(Error::invalid_argument(format!(
                "scaler expects {} features, got a row with {}",
                width,
                bad.len()
            )));
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut std_dev = vec![0.0; width];
        for row in rows {
            for ((s, x), m) in std_dev.iter_mut().zip(row).zip(&mean) {
                *s += (x - m).powi(2);
            }
        }
        std_dev.iter_mut().for_each(|s| *s = (*s / n).sqrt());

        // Constant columns can still pick up rounding noise in their std
        for (col, (s, m)) in std_dev.iter_mut().zip(&mean).enumerate() {
            let first = rows[0][col];
            let all_equal = rows.iter().all(|r| r[col] == first);
            if all_equal || *s <= n * f64::EPSILON * m.abs() {
                *s = 0.0;
            }
        }

        Ok(Self {
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            mean,
            std_dev,
        })
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one row
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.width() {
            return Err(Error::invalid_argument(format!(
                "scaler expects {} features, got {}",
                self.width(),
                row.len()
            )));
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.std_dev))
            .map(|(x, (m, s))| if *s > 0.0 { (x - m) / s } else { 0.0 })
            .collect())
    }

    /// Standardize many rows
    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }

    /// True if the scaler was fit with exactly this feature schema
    pub fn matches_schema(&self, names: &[&str]) -> bool {
        self.feature_names.len() == names.len()
            && self.feature_names.iter().zip(names).all(|(a, b)| a == b)
            && self.mean.len() == names.len()
            && self.std_dev.len() == names.len()
    }
}
