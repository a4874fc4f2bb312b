// churnlens: Reddit engagement metrics and churn-risk scoring
//
// This is the library root. The activity aggregator and the risk scorer
// are independent; the scorer only reads the aggregator's MetricsRecord.

pub mod activity;
pub mod config;
pub mod model;
pub mod output;
pub mod reddit;
pub mod web;
