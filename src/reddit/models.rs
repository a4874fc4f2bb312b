// Serde types for the Reddit OAuth API responses.
//
// Reddit wraps everything in "things": `{"kind": "t3", "data": {...}}`.
// Listings hold a `children` array of things. Only the fields the
// aggregator reads are declared; everything else is ignored.

use chrono::DateTime;
use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::activity::traits::{Comment, CommentNode, Post, UserInfo};

/// Author placeholder Reddit uses for deleted accounts.
const DELETED_AUTHOR: &str = "[deleted]";

#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    pub children: Vec<T>,
}

/// `GET /user/{name}/about` → `Thing<AccountData>` (kind `t2`).
#[derive(Debug, Deserialize)]
pub struct AccountData {
    pub name: String,
    /// Missing for suspended accounts.
    #[serde(default)]
    pub created_utc: Option<f64>,
    #[serde(default)]
    pub link_karma: i64,
    #[serde(default)]
    pub comment_karma: i64,
    #[serde(default)]
    pub is_employee: Option<bool>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub has_verified_email: Option<bool>,
}

/// A submission from `GET /user/{name}/submitted` (kind `t3`).
#[derive(Debug, Deserialize)]
pub struct SubmissionData {
    pub id: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: i64,
    pub subreddit: String,
    #[serde(default)]
    pub link_flair_text: Option<String>,
}

/// A child of a comment listing: either a real comment or a "more" stub.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum CommentThing {
    #[serde(rename = "t1")]
    Comment(CommentData),
    #[serde(rename = "more")]
    More(IgnoredAny),
}

#[derive(Debug, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub replies: Replies,
}

/// Reddit sends `""` when a comment has no replies and a listing otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Replies {
    Listing(Box<Listing<CommentThing>>),
    Empty(IgnoredAny),
}

impl Default for Replies {
    fn default() -> Self {
        Replies::Empty(IgnoredAny)
    }
}

/// `GET /comments/{id}` returns `[post listing, comment listing]`.
pub type CommentsResponse = (IgnoredAny, Listing<CommentThing>);

impl From<AccountData> for UserInfo {
    fn from(account: AccountData) -> Self {
        let created_utc = account
            .created_utc
            .and_then(|ts| DateTime::from_timestamp(ts as i64, 0))
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();

        UserInfo {
            username: account.name,
            created_utc,
            link_karma: account.link_karma,
            comment_karma: account.comment_karma,
            is_employee: account.is_employee.unwrap_or(false),
            verified: account.verified.unwrap_or(false),
            has_verified_email: account.has_verified_email.unwrap_or(false),
        }
    }
}

impl From<SubmissionData> for Post {
    fn from(submission: SubmissionData) -> Self {
        Post {
            id: submission.id,
            score: submission.score,
            num_comments: submission.num_comments,
            subreddit: submission.subreddit,
            flair: submission.link_flair_text.filter(|f| !f.is_empty()),
            comments: Vec::new(),
        }
    }
}

impl From<CommentThing> for CommentNode {
    fn from(thing: CommentThing) -> Self {
        match thing {
            CommentThing::More(_) => CommentNode::More,
            CommentThing::Comment(data) => {
                let author = data.author.filter(|a| a != DELETED_AUTHOR);
                let replies = match data.replies {
                    Replies::Listing(listing) => comment_forest(*listing),
                    Replies::Empty(_) => Vec::new(),
                };
                CommentNode::Comment(Comment { author, replies })
            }
        }
    }
}

/// Convert a comment listing into the aggregator's comment forest.
pub fn comment_forest(listing: Listing<CommentThing>) -> Vec<CommentNode> {
    listing
        .data
        .children
        .into_iter()
        .map(CommentNode::from)
        .collect()
}
