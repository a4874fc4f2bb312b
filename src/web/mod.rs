// Web server: Axum-based JSON API over the aggregator and the scorer.
//
// The risk scorer is fully loaded (or trained) before the listener binds,
// so no request ever sees a half-initialized model. Both services are
// injected through AppState; there are no globals.
//
// CORS is wide open: any origin, method and header.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::activity::error::ActivityError;
use crate::activity::traits::ActivitySource;
use crate::model::scorer::RiskScorer;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ActivitySource>,
    pub scorer: Arc<RiskScorer>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(state: AppState, port: u16, bind: &str) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("churnlens listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/user_data", get(handlers::activity::get_user_data))
        .route("/user_data/", get(handlers::activity::get_user_data))
        .route("/churn_risk", get(handlers::activity::get_churn_risk))
        .route("/churn_risk/", get(handlers::activity::get_churn_risk))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check that also reports where the model came from.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({
            "status": "ok",
            "model": state.scorer.origin().as_str(),
        })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, kind: &str, message: &str) -> Response {
    (
        status,
        axum::Json(serde_json::json!({ "error": message, "kind": kind })),
    )
        .into_response()
}

/// HTTP status for each activity failure class.
pub fn status_for(error: &ActivityError) -> StatusCode {
    match error {
        ActivityError::InvalidProfile { .. } => StatusCode::BAD_REQUEST,
        ActivityError::NotFound { .. } => StatusCode::NOT_FOUND,
        ActivityError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        ActivityError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ActivityError {
    fn into_response(self) -> Response {
        api_error(status_for(&self), self.kind(), &format!("{self:#}"))
    }
}
