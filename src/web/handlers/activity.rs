// Profile activity handlers.
//
// GET /user_data/?profile_url=: account info + engagement metrics
// GET /churn_risk/?profile_url=: the same, plus the churn prediction
//
// Failures come back as {"error", "kind"} with a status per error class
// (400 bad profile, 404 unknown user, 429 rate limited, 502 upstream).
// A missing profile_url is rejected by the Query extractor with 400.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::activity::collect::{collect_activity, ActivityReport};
use crate::model::scorer::Prediction;
use crate::web::{api_error, AppState};

#[derive(Deserialize)]
pub struct ProfileQuery {
    /// Reddit profile URL or bare username.
    pub profile_url: String,
}

/// Body of GET /churn_risk/.
#[derive(Serialize)]
pub struct ChurnReport {
    #[serde(flatten)]
    pub report: ActivityReport,
    pub churn: Prediction,
}

/// GET /user_data/: fetch and aggregate a profile's recent activity.
pub async fn get_user_data(
    State(state): State<AppState>,
    Query(params): Query<ProfileQuery>,
) -> Response {
    match collect_activity(state.source.as_ref(), &params.profile_url).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, profile = %params.profile_url, "Activity fetch failed");
            e.into_response()
        }
    }
}

/// GET /churn_risk/: activity report with the model's churn prediction.
pub async fn get_churn_risk(
    State(state): State<AppState>,
    Query(params): Query<ProfileQuery>,
) -> Response {
    let report = match collect_activity(state.source.as_ref(), &params.profile_url).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(error = %e, profile = %params.profile_url, "Activity fetch failed");
            return e.into_response();
        }
    };

    match state.scorer.predict(&report.metrics) {
        Ok(churn) => Json(ChurnReport { report, churn }).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Churn model failed to score metrics");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "model", &e.to_string())
        }
    }
}
