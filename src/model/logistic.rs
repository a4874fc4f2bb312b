// Binary logistic regression with L2 regularization.
//
// Fit by full-batch gradient descent on the regularized mean log-loss.
// The inputs are already standardized, so a fixed learning rate converges
// without line search.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Hyperparameters for `LogisticRegression::fit`.
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    /// Inverse regularization strength (smaller = stronger penalty).
    pub c: f64,
    pub learning_rate: f64,
    pub max_iter: usize,
    /// Stop when the gradient's L2 norm drops below this.
    pub tolerance: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            c: 1.0,
            learning_rate: 0.5,
            max_iter: 1000,
            tolerance: 1e-6,
        }
    }
}

/// Fitted weights of a binary logistic classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl LogisticRegression {
    /// Fit on samples `x` with 0/1 labels `y`.
    ///
    /// Minimizes `mean(log_loss) + ||w||² / (2 · C · n)`; the intercept is
    /// not penalized.
    pub fn fit(x: &[Vec<f64>], y: &[u8], options: &TrainingOptions) -> Result<Self> {
        if x.is_empty() {
            anyhow::bail!("Cannot fit a classifier on zero samples");
        }
        if x.len() != y.len() {
            anyhow::bail!("Got {} samples but {} labels", x.len(), y.len());
        }
        if y.iter().any(|&label| label > 1) {
            anyhow::bail!("Labels must be 0 or 1");
        }
        let n_features = x[0].len();
        if x.iter().any(|s| s.len() != n_features) {
            anyhow::bail!("All samples must have {n_features} features");
        }

        let n = x.len() as f64;
        let mut model = Self {
            weights: vec![0.0; n_features],
            intercept: 0.0,
        };

        for _ in 0..options.max_iter {
            let mut grad_w = vec![0.0; n_features];
            let mut grad_b = 0.0;

            for (sample, &label) in x.iter().zip(y) {
                let error = model.predict_proba(sample) - f64::from(label);
                for (g, xi) in grad_w.iter_mut().zip(sample) {
                    *g += error * xi;
                }
                grad_b += error;
            }

            for (g, w) in grad_w.iter_mut().zip(&model.weights) {
                *g = (*g + w / options.c) / n;
            }
            grad_b /= n;

            let norm = (grad_w.iter().map(|g| g * g).sum::<f64>() + grad_b * grad_b).sqrt();
            if norm < options.tolerance {
                break;
            }

            for (w, g) in model.weights.iter_mut().zip(&grad_w) {
                *w -= options.learning_rate * g;
            }
            model.intercept -= options.learning_rate * grad_b;
        }

        Ok(model)
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// Reject non-finite weights or intercept.
    pub fn validate(&self) -> Result<()> {
        if let Some(i) = self.weights.iter().position(|w| !w.is_finite()) {
            anyhow::bail!("Classifier weight {i} is not finite");
        }
        if !self.intercept.is_finite() {
            anyhow::bail!("Classifier intercept is not finite");
        }
        Ok(())
    }

    /// Raw linear score `w·x + b`.
    pub fn decision_function(&self, sample: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(sample)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }

    /// Probability of the positive class.
    pub fn predict_proba(&self, sample: &[f64]) -> f64 {
        sigmoid(self.decision_function(sample))
    }

    /// Class label: 1 when the positive-class probability exceeds 0.5.
    pub fn predict(&self, sample: &[f64]) -> u8 {
        u8::from(self.decision_function(sample) > 0.0)
    }

    /// Fraction of samples whose predicted label matches `y`.
    pub fn accuracy(&self, x: &[Vec<f64>], y: &[u8]) -> f64 {
        if x.is_empty() {
            return 0.0;
        }
        let correct = x
            .iter()
            .zip(y)
            .filter(|(sample, &label)| self.predict(sample) == label)
            .count();
        correct as f64 / x.len() as f64
    }
}
