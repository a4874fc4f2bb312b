// Churn-risk model: a standard scaler feeding a logistic regression.
//
// There are no real churn labels anywhere. When no persisted artifacts are
// found, both are fit on synthetic random data, so the scores carry no
// real-world signal. The RiskScorer wraps the fitted pair as an immutable
// service object.

pub mod artifacts;
pub mod logistic;
pub mod scaler;
pub mod scorer;
pub mod synthetic;
