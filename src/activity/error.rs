// Typed failures surfaced by the activity aggregator.
//
// Every failure during a fetch ends up as one of these. The web layer maps
// the variant to an HTTP status so callers can tell a bad username from a
// Reddit outage.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActivityError {
    /// The profile reference did not contain a usable username.
    #[error("Invalid profile reference: {input:?}")]
    InvalidProfile { input: String },

    /// Reddit answered 404 for the user or one of their posts.
    #[error("Reddit resource not found: {resource}")]
    NotFound { resource: String },

    /// Reddit answered 429. No retry is attempted.
    #[error("Reddit API rate limit exceeded, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    /// Network failures, auth failures, unexpected statuses, bad payloads.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl ActivityError {
    /// Stable machine-readable name for the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            ActivityError::InvalidProfile { .. } => "invalid_profile",
            ActivityError::NotFound { .. } => "not_found",
            ActivityError::RateLimited { .. } => "rate_limited",
            ActivityError::Upstream(_) => "upstream",
        }
    }
}
