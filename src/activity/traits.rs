// Activity source trait and the transient types it yields.
//
// These types live for one request. Nothing is cached or persisted.

use async_trait::async_trait;
use serde::Serialize;

use super::error::ActivityError;

/// Account metadata shown alongside the metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInfo {
    pub username: String,
    /// Account creation time as `YYYY-MM-DD HH:MM:SS` (UTC).
    pub created_utc: String,
    pub link_karma: i64,
    pub comment_karma: i64,
    pub is_employee: bool,
    pub verified: bool,
    pub has_verified_email: bool,
}

/// A submission and the comment forest hanging off it.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub score: i64,
    pub num_comments: i64,
    pub subreddit: String,
    /// Link flair text, if the post has one.
    pub flair: Option<String>,
    /// Top-level comment nodes. Empty until the forest is fetched.
    pub comments: Vec<CommentNode>,
}

/// A node in a comment tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentNode {
    Comment(Comment),
    /// A collapsed "load more comments" stub. Has no author and is never
    /// counted as a comment.
    More,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// None for deleted or suspended accounts.
    pub author: Option<String>,
    pub replies: Vec<CommentNode>,
}

impl Comment {
    /// True when this comment was written by `username`.
    pub fn is_by(&self, username: &str) -> bool {
        self.author.as_deref() == Some(username)
    }
}

/// Read-only access to a user's public activity.
///
/// Implementations must be async because the production source is the
/// Reddit HTTP API.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Fetch account metadata for `username`.
    async fn fetch_user(&self, username: &str) -> Result<UserInfo, ActivityError>;

    /// Fetch up to `limit` of the user's submissions, newest first.
    /// The returned posts have an empty `comments` list.
    async fn fetch_recent_posts(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<Post>, ActivityError>;

    /// Fetch the top-sorted comment forest of a post. Collapsed threads
    /// stay as `CommentNode::More` and are not expanded.
    async fn fetch_comment_forest(&self, post_id: &str) -> Result<Vec<CommentNode>, ActivityError>;
}
