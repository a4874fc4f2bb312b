// Standard scaling: per-feature mean removal and unit-variance scaling.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A fitted standardization transform: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    /// Population standard deviation per feature. Constant features get
    /// 1.0 so they map to zero instead of dividing by zero.
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit the scaler to a set of equally sized samples.
    pub fn fit(samples: &[Vec<f64>]) -> Result<Self> {
        let Some(first) = samples.first() else {
            anyhow::bail!("Cannot fit a scaler on zero samples");
        };
        let n_features = first.len();
        if samples.iter().any(|s| s.len() != n_features) {
            anyhow::bail!("All samples must have {n_features} features");
        }

        let n = samples.len() as f64;
        let mut mean = vec![0.0; n_features];
        for sample in samples {
            for (m, x) in mean.iter_mut().zip(sample) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut variance = vec![0.0; n_features];
        for sample in samples {
            for ((v, x), m) in variance.iter_mut().zip(sample).zip(&mean) {
                *v += (x - m).powi(2);
            }
        }

        let scale = variance
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std < f64::EPSILON {
                    1.0
                } else {
                    std
                }
            })
            .collect();

        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Reject parameters that would make `transform` produce non-finite
    /// values: mismatched lengths, non-finite means, or scales that are not
    /// finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        if self.mean.len() != self.scale.len() {
            anyhow::bail!(
                "Scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            );
        }
        if let Some(i) = self.mean.iter().position(|m| !m.is_finite()) {
            anyhow::bail!("Scaler mean for feature {i} is not finite");
        }
        if let Some(i) = self.scale.iter().position(|s| !(s.is_finite() && *s > 0.0)) {
            anyhow::bail!(
                "Scaler scale for feature {i} must be finite and positive, got {}",
                self.scale[i]
            );
        }
        Ok(())
    }

    /// Standardize a single sample.
    pub fn transform(&self, sample: &[f64]) -> Result<Vec<f64>> {
        if sample.len() != self.n_features() {
            anyhow::bail!(
                "Scaler expects {} features, got {}",
                self.n_features(),
                sample.len()
            );
        }
        Ok(sample
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    /// Standardize every sample in a batch.
    pub fn transform_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        samples.iter().map(|s| self.transform(s)).collect()
    }
}
