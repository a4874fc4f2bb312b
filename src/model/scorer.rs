// Risk scorer: the service object handed to request handlers.
//
// Lifecycle has two states. `load_or_train` is the only way in: it either
// loads persisted artifacts or fits fresh ones on synthetic data and writes
// them out. After that the scorer is immutable; nothing retrains it while
// the process runs.

use anyhow::Result;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use super::artifacts::{self, ArtifactPaths};
use super::logistic::{LogisticRegression, TrainingOptions};
use super::scaler::StandardScaler;
use super::synthetic::{self, SYNTHETIC_SAMPLES, TEST_FRACTION};
use crate::activity::aggregate::MetricsRecord;
use crate::output::round2;

/// Feature names in the order the model consumes them.
pub const FEATURE_NAMES: [&str; 7] = [
    "average_score",
    "average_comments",
    "post_engagement",
    "subreddit_diversity",
    "comment_activity",
    "interactions_with_others",
    "post_count_analyzed",
];

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// The fixed-order numeric input to the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn from_metrics(m: &MetricsRecord) -> Self {
        Self([
            m.average_score,
            m.average_comments,
            m.post_engagement as f64,
            m.subreddit_diversity as f64,
            m.comment_activity as f64,
            m.interactions_with_others as f64,
            m.post_count_analyzed as f64,
        ])
    }

    /// Build from a loosely typed JSON object. Missing or non-numeric
    /// fields read as 0.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut features = [0.0; FEATURE_COUNT];
        for (slot, name) in features.iter_mut().zip(FEATURE_NAMES) {
            *slot = value.get(name).and_then(|v| v.as_f64()).unwrap_or(0.0);
        }
        Self(features)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// How the scorer's parameters came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelOrigin {
    /// Read from persisted artifacts.
    Loaded,
    /// Fit on synthetic data during this process's startup.
    Trained,
}

impl ModelOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelOrigin::Loaded => "loaded",
            ModelOrigin::Trained => "trained",
        }
    }
}

/// Coarse band over the 0-100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Band a risk score: above 70 is High, above 40 is Medium.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s > 70.0 => RiskLevel::High,
            s if s > 40.0 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifier output for one user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// 0 = active, 1 = churn risk.
    pub prediction: u8,
    /// Probability of churn risk as a percentage, two decimals.
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

/// Summary of a synthetic training run.
#[derive(Debug, Clone, Copy)]
pub struct TrainingReport {
    pub train_samples: usize,
    pub test_samples: usize,
    /// Held-out accuracy. Expect roughly 0.5 on random labels.
    pub test_accuracy: f64,
}

/// Immutable scaler + classifier pair.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    scaler: StandardScaler,
    model: LogisticRegression,
    origin: ModelOrigin,
}

impl RiskScorer {
    /// Wrap already fitted parameters, checking their widths and values.
    pub fn from_parts(
        scaler: StandardScaler,
        model: LogisticRegression,
        origin: ModelOrigin,
    ) -> Result<Self> {
        if scaler.n_features() != FEATURE_COUNT || model.n_features() != FEATURE_COUNT {
            anyhow::bail!(
                "Model parameters must have {FEATURE_COUNT} features (scaler {}, classifier {})",
                scaler.n_features(),
                model.n_features()
            );
        }
        scaler.validate()?;
        model.validate()?;
        Ok(Self {
            scaler,
            model,
            origin,
        })
    }

    /// Load persisted artifacts, or fit on synthetic data and persist them.
    ///
    /// Any load failure (missing file, bad JSON, wrong width) falls through
    /// to training. A failure to write the new artifacts is logged and
    /// otherwise ignored; the fitted scorer is still returned.
    pub fn load_or_train(paths: &ArtifactPaths) -> Result<Self> {
        match artifacts::load(paths) {
            Ok((scaler, model)) => {
                info!(
                    scaler = %paths.scaler.display(),
                    model = %paths.model.display(),
                    "Loaded churn model artifacts"
                );
                Self::from_parts(scaler, model, ModelOrigin::Loaded)
            }
            Err(e) => {
                info!(reason = %e, "No usable churn model artifacts, training on synthetic data");
                let (scorer, _) = Self::train_and_persist(paths, &mut rand::rng())?;
                Ok(scorer)
            }
        }
    }

    /// Fit on fresh synthetic data and write the artifacts.
    pub fn train_and_persist<R: Rng + ?Sized>(
        paths: &ArtifactPaths,
        rng: &mut R,
    ) -> Result<(Self, TrainingReport)> {
        let (scorer, report) = Self::fit_synthetic(rng)?;

        if let Err(e) = artifacts::persist(paths, &scorer.scaler, &scorer.model) {
            warn!(error = %e, "Failed to persist churn model artifacts");
        }

        Ok((scorer, report))
    }

    /// Fit scaler and classifier on random data. Nothing is written.
    pub fn fit_synthetic<R: Rng + ?Sized>(rng: &mut R) -> Result<(Self, TrainingReport)> {
        let data = synthetic::generate(rng, SYNTHETIC_SAMPLES, FEATURE_COUNT);
        let (train, test) = synthetic::train_test_split(data, TEST_FRACTION, rng);

        let scaler = StandardScaler::fit(&train.features)?;
        let train_scaled = scaler.transform_batch(&train.features)?;
        let model =
            LogisticRegression::fit(&train_scaled, &train.labels, &TrainingOptions::default())?;

        let test_scaled = scaler.transform_batch(&test.features)?;
        let report = TrainingReport {
            train_samples: train.len(),
            test_samples: test.len(),
            test_accuracy: model.accuracy(&test_scaled, &test.labels),
        };

        info!(
            train = report.train_samples,
            test = report.test_samples,
            accuracy = format!("{:.2}", report.test_accuracy),
            "Fit churn model on synthetic data"
        );

        let scorer = Self::from_parts(scaler, model, ModelOrigin::Trained)?;
        Ok((scorer, report))
    }

    pub fn origin(&self) -> ModelOrigin {
        self.origin
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.model
    }

    /// Score an aggregated metrics record.
    pub fn predict(&self, metrics: &MetricsRecord) -> Result<Prediction> {
        self.predict_features(&FeatureVector::from_metrics(metrics))
    }

    /// Score a raw feature vector.
    pub fn predict_features(&self, features: &FeatureVector) -> Result<Prediction> {
        let scaled = self.scaler.transform(features.as_slice())?;
        let probability = self.model.predict_proba(&scaled);
        if !probability.is_finite() {
            anyhow::bail!("Churn model produced a non-finite probability");
        }

        let risk_score = round2(probability * 100.0).clamp(0.0, 100.0);
        Ok(Prediction {
            prediction: self.model.predict(&scaled),
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_scorer(weights: [f64; FEATURE_COUNT], intercept: f64) -> RiskScorer {
        RiskScorer::from_parts(
            StandardScaler {
                mean: vec![0.0; FEATURE_COUNT],
                scale: vec![1.0; FEATURE_COUNT],
            },
            LogisticRegression {
                weights: weights.to_vec(),
                intercept,
            },
            ModelOrigin::Loaded,
        )
        .unwrap()
    }

    #[test]
    fn test_feature_order() {
        let m = MetricsRecord {
            average_score: 1.0,
            average_comments: 2.0,
            post_engagement: 3,
            subreddit_diversity: 4,
            comment_activity: 5,
            interactions_with_others: 6,
            post_count_analyzed: 7,
            ..Default::default()
        };
        assert_eq!(
            FeatureVector::from_metrics(&m).0,
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
        );
    }

    #[test]
    fn test_from_json_defaults_missing_to_zero() {
        let value = serde_json::json!({
            "average_score": 12.5,
            "post_count_analyzed": 3,
            "comment_activity": "not a number"
        });
        let fv = FeatureVector::from_json(&value);
        assert_eq!(fv.0, [12.5, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_zero_logit_is_fifty_percent_active() {
        let scorer = identity_scorer([0.0; FEATURE_COUNT], 0.0);
        let p = scorer.predict(&MetricsRecord::default()).unwrap();
        assert_eq!(p.prediction, 0);
        assert_eq!(p.risk_score, 50.0);
        assert_eq!(p.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_positive_logit_flags_churn() {
        let scorer = identity_scorer([0.0; FEATURE_COUNT], 2.0);
        let p = scorer.predict(&MetricsRecord::default()).unwrap();
        assert_eq!(p.prediction, 1);
        // sigmoid(2) = 0.880797...
        assert_eq!(p.risk_score, 88.08);
        assert_eq!(p.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_risk_level_boundaries() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(40.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(40.01), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(70.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(70.01), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100.0), RiskLevel::High);
    }

    #[test]
    fn test_risk_level_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(RiskLevel::Medium).unwrap(),
            serde_json::json!("medium")
        );
    }

    #[test]
    fn test_from_parts_rejects_zero_scale() {
        let result = RiskScorer::from_parts(
            StandardScaler {
                mean: vec![0.0; FEATURE_COUNT],
                scale: vec![0.0; FEATURE_COUNT],
            },
            LogisticRegression {
                weights: vec![1.0; FEATURE_COUNT],
                intercept: 0.0,
            },
            ModelOrigin::Loaded,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_parts_rejects_wrong_width() {
        let result = RiskScorer::from_parts(
            StandardScaler {
                mean: vec![0.0; 3],
                scale: vec![1.0; 3],
            },
            LogisticRegression {
                weights: vec![0.0; 3],
                intercept: 0.0,
            },
            ModelOrigin::Loaded,
        );
        assert!(result.is_err());
    }
}
