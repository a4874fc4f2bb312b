// Reddit OAuth client: application-only auth and read-only listing calls.
//
// Uses the client-credentials grant: the app's id/secret are exchanged for
// a bearer token, which is cached until shortly before it expires. All
// reads go through `api_get`, a thin reqwest wrapper that maps HTTP
// statuses onto ActivityError variants.

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{debug, info};

use super::models::{comment_forest, AccountData, CommentsResponse, Listing, SubmissionData, Thing};
use crate::activity::error::ActivityError;
use crate::activity::traits::{ActivitySource, CommentNode, Post, UserInfo};
use crate::config::Config;

/// Default OAuth API endpoint.
pub const DEFAULT_API_URL: &str = "https://oauth.reddit.com";

/// Default host for the token endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://www.reddit.com";

/// Refresh the token this long before Reddit says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Fallback when a 429 carries no usable Retry-After header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Application credentials registered at reddit.com/prefs/apps.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Read-only Reddit API client.
pub struct RedditClient {
    client: reqwest::Client,
    api_url: String,
    auth_url: String,
    credentials: Credentials,
    token: Mutex<Option<CachedToken>>,
}

impl RedditClient {
    /// Create a client against the given API and auth hosts.
    pub fn new(credentials: Credentials, api_url: &str, auth_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(credentials.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            Credentials {
                client_id: config.reddit_client_id.clone(),
                client_secret: config.reddit_client_secret.clone(),
                user_agent: config.reddit_user_agent.clone(),
            },
            &config.reddit_api_url,
            &config.reddit_auth_url,
        )
    }

    /// Return a valid bearer token, fetching a new one if needed.
    async fn access_token(&self) -> Result<String, ActivityError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let url = format!("{}/api/v1/access_token", self.auth_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Reddit token request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Reddit token endpoint returned {status}: {body}").into());
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse Reddit token response")?;

        let value = match (token.access_token, token.error) {
            (Some(value), _) => value,
            (None, Some(error)) => {
                return Err(anyhow::anyhow!("Reddit rejected credentials: {error}").into())
            }
            (None, None) => {
                return Err(anyhow::anyhow!("Reddit token response had no access_token").into())
            }
        };

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        info!(expires_in = lifetime.as_secs(), "Obtained Reddit access token");

        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        });

        Ok(value)
    }

    /// Make an authenticated GET request and deserialize the response.
    ///
    /// `path` is relative to the API host (e.g. "/user/alice/about").
    pub async fn api_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ActivityError> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.api_url, path);

        debug!(path = path, "Reddit GET request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("raw_json", "1")])
            .query(params)
            .send()
            .await
            .with_context(|| format!("Reddit request failed: {path}"))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ActivityError::NotFound {
                resource: path.to_string(),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(|secs| secs.ceil() as u64)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ActivityError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Reddit {path} returned {status}: {body}").into());
        }

        let parsed = response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize Reddit {path} response"))?;
        Ok(parsed)
    }
}

#[async_trait]
impl ActivitySource for RedditClient {
    async fn fetch_user(&self, username: &str) -> Result<UserInfo, ActivityError> {
        let about: Thing<AccountData> = self
            .api_get(&format!("/user/{username}/about"), &[])
            .await?;
        Ok(UserInfo::from(about.data))
    }

    async fn fetch_recent_posts(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<Post>, ActivityError> {
        let limit = limit.to_string();
        let listing: Listing<Thing<SubmissionData>> = self
            .api_get(
                &format!("/user/{username}/submitted"),
                &[("sort", "new"), ("limit", &limit)],
            )
            .await?;

        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .map(|thing| Post::from(thing.data))
            .collect();

        debug!(count = posts.len(), username = username, "Fetched recent posts");
        Ok(posts)
    }

    async fn fetch_comment_forest(&self, post_id: &str) -> Result<Vec<CommentNode>, ActivityError> {
        let (_, comments): CommentsResponse = self
            .api_get(&format!("/comments/{post_id}"), &[("sort", "top")])
            .await?;
        Ok(comment_forest(comments))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}
