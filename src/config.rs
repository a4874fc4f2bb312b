use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::model::artifacts::ArtifactPaths;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    /// OAuth client id of the Reddit "script" or "web" app.
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    /// Reddit rejects requests with generic user agents, so this is required.
    pub reddit_user_agent: String,
    /// OAuth API endpoint (defaults to https://oauth.reddit.com).
    pub reddit_api_url: String,
    /// Host serving /api/v1/access_token (defaults to https://www.reddit.com).
    pub reddit_auth_url: String,
    /// Where the fitted scaler is read from and written to.
    pub scaler_path: PathBuf,
    /// Where the fitted classifier is read from and written to.
    pub model_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Only the artifact paths and API endpoints have defaults. The Reddit
    /// credentials are checked lazily by `require_reddit`, so `train`
    /// works without them.
    pub fn load() -> Result<Self> {
        Ok(Self {
            reddit_client_id: env::var("REDDIT_CLIENT_ID").unwrap_or_default(),
            reddit_client_secret: env::var("REDDIT_CLIENT_SECRET").unwrap_or_default(),
            reddit_user_agent: env::var("REDDIT_USER_AGENT").unwrap_or_default(),
            reddit_api_url: env::var("REDDIT_API_URL")
                .unwrap_or_else(|_| crate::reddit::client::DEFAULT_API_URL.to_string()),
            reddit_auth_url: env::var("REDDIT_AUTH_URL")
                .unwrap_or_else(|_| crate::reddit::client::DEFAULT_AUTH_URL.to_string()),
            scaler_path: env::var("CHURNLENS_SCALER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./scaler.json")),
            model_path: env::var("CHURNLENS_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./churn_model.json")),
        })
    }

    /// Check that all three Reddit credentials are configured.
    /// Call this before any operation that talks to the Reddit API.
    pub fn require_reddit(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("REDDIT_CLIENT_ID", &self.reddit_client_id),
            ("REDDIT_CLIENT_SECRET", &self.reddit_client_secret),
            ("REDDIT_USER_AGENT", &self.reddit_user_agent),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            anyhow::bail!(
                "{} not set. Add the Reddit app credentials to your .env file.",
                missing.join(", ")
            );
        }
        Ok(())
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            scaler: self.scaler_path.clone(),
            model: self.model_path.clone(),
        }
    }
}
