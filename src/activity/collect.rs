// Activity collection: orchestrates the fetches for a single profile.
//
// Given a profile reference, this module:
// 1. Resolves it to a username
// 2. Fetches the account metadata
// 3. Fetches the most recent posts and each post's comment forest
// 4. Reduces everything into a MetricsRecord
//
// Calls are sequential. Any failure aborts the whole collection; there is
// no retry and no partial result.

use serde::Serialize;
use tracing::{debug, info};

use super::aggregate::{aggregate, MetricsRecord};
use super::error::ActivityError;
use super::profile::extract_username;
use super::traits::{ActivitySource, UserInfo};

/// How many of the newest posts are analyzed per profile.
pub const RECENT_POST_LIMIT: usize = 3;

/// Account metadata plus the derived metrics, as returned by `/user_data/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityReport {
    pub user_info: UserInfo,
    #[serde(flatten)]
    pub metrics: MetricsRecord,
}

/// Fetch and aggregate the recent activity behind `profile_ref`.
pub async fn collect_activity(
    source: &dyn ActivitySource,
    profile_ref: &str,
) -> Result<ActivityReport, ActivityError> {
    let username = extract_username(profile_ref)?;

    let user_info = source.fetch_user(&username).await?;

    let mut posts = source
        .fetch_recent_posts(&user_info.username, RECENT_POST_LIMIT)
        .await?;
    posts.truncate(RECENT_POST_LIMIT);

    for post in &mut posts {
        post.comments = source.fetch_comment_forest(&post.id).await?;
        debug!(
            post_id = %post.id,
            subreddit = %post.subreddit,
            top_level = post.comments.len(),
            "Fetched comment forest"
        );
    }

    let metrics = aggregate(&user_info.username, &posts);

    info!(
        username = %user_info.username,
        posts = metrics.post_count_analyzed,
        comment_activity = metrics.comment_activity,
        interactions = metrics.interactions_with_others,
        "Aggregated activity"
    );

    Ok(ActivityReport { user_info, metrics })
}
