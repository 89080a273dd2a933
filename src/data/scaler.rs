// ============================================================
// Layer 4 — Standard Scaler
// ============================================================
// z = (x - mean) / scale, per feature.
//
// `scale` is the population standard deviation of the fitted
// data; a constant feature (zero variance) gets scale 1.0 so
// it maps to zero instead of dividing by zero.
//
// The scaler remembers the feature names it was fitted on.
// That list is the single source of truth for feature order
// at inference time.

use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;

/// Scales below this are treated as zero variance.
const MIN_SCALE: f64 = 10.0 * f64::EPSILON;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Feature names, in the order of `mean` and `scale`
    pub feature_names: Vec<String>,
    pub mean:          Vec<f64>,
    pub scale:         Vec<f64>,
}

impl StandardScaler {
    /// Fit mean and scale on `rows`, each `feature_names.len()` wide.
    pub fn fit(feature_names: Vec<String>, rows: &[Vec<f64>]) -> Result<Self, EstimatorError> {
        let width = feature_names.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(EstimatorError::FeatureMismatch { expected: width, actual: bad.len() });
        }

        let n = rows.len();
        let mut mean  = vec![0.0; width];
        let mut scale = vec![1.0; width];

        if n > 0 {
            for row in rows {
                for (m, x) in mean.iter_mut().zip(row) {
                    *m += x;
                }
            }
            mean.iter_mut().for_each(|m| *m /= n as f64);

            for (j, s) in scale.iter_mut().enumerate() {
                let var = rows.iter().map(|r| (r[j] - mean[j]).powi(2)).sum::<f64>() / n as f64;
                let std = var.sqrt();
                *s = if std < MIN_SCALE { 1.0 } else { std };
            }
        }

        Ok(Self { feature_names, mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Scale one feature vector.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        if row.len() != self.n_features() {
            return Err(EstimatorError::FeatureMismatch {
                expected: self.n_features(),
                actual:   row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}
