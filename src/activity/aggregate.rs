// Metric aggregation: reduce a user's recent posts to engagement metrics.
//
// Pure functions only. The fetch side lives in collect.rs so this can be
// tested without any network access.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::traits::{CommentNode, Post};
use crate::output::round2;

/// Engagement metrics derived from a user's recent posts.
///
/// Every numeric field is zero when no posts were collected. The two
/// `common_*` maps are informational and are not fed to the scorer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub average_score: f64,
    pub average_comments: f64,
    pub post_engagement: i64,
    pub subreddit_diversity: usize,
    pub comment_activity: u64,
    pub interactions_with_others: u64,
    pub post_count_analyzed: usize,
    /// Subreddits that appear more than once, with their counts.
    pub common_subreddits: BTreeMap<String, usize>,
    /// Flairs that appear more than once, with their counts.
    pub common_flairs: BTreeMap<String, usize>,
}

/// Comment counters accumulated over a post's comment forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentCounts {
    /// Top-level comments written by the owner.
    pub own_comments: u64,
    /// Owner replies directly under someone else's top-level comment.
    pub replies_to_others: u64,
}

/// Count the owner's activity in one post's top-level comments.
///
/// Collapsed `More` stubs are skipped at both levels. Comments without an
/// author are neither the owner's nor someone else's, so their replies are
/// not inspected. Each qualifying reply counts once.
pub fn count_comment_activity(owner: &str, top_level: &[CommentNode]) -> CommentCounts {
    let mut counts = CommentCounts::default();

    for node in top_level {
        let CommentNode::Comment(comment) = node else {
            continue;
        };

        if comment.is_by(owner) {
            counts.own_comments += 1;
        } else if comment.author.is_some() {
            counts.replies_to_others += comment
                .replies
                .iter()
                .filter(|reply| matches!(reply, CommentNode::Comment(r) if r.is_by(owner)))
                .count() as u64;
        }
    }

    counts
}

/// Arithmetic mean rounded to two decimals. Returns 0.0 for an empty slice.
pub fn rounded_mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let total: f64 = values.iter().map(|&v| v as f64).sum();
    round2(total / values.len() as f64)
}

/// Occurrence counts for entries that appear more than once.
pub fn repeated_counts<'a, I>(items: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(item.to_string()).or_default() += 1;
    }
    counts.retain(|_, count| *count > 1);
    counts
}

/// Reduce a user's posts into a MetricsRecord.
///
/// `owner` is the canonical username returned by the API, not the raw
/// profile reference, so author comparisons match Reddit's casing.
pub fn aggregate(owner: &str, posts: &[Post]) -> MetricsRecord {
    let scores: Vec<i64> = posts.iter().map(|p| p.score).collect();
    let comment_counts: Vec<i64> = posts.iter().map(|p| p.num_comments).collect();

    let mut comment_activity = 0;
    let mut interactions_with_others = 0;
    for post in posts {
        let counts = count_comment_activity(owner, &post.comments);
        comment_activity += counts.own_comments;
        interactions_with_others += counts.replies_to_others;
    }

    let subreddit_diversity = posts
        .iter()
        .map(|p| p.subreddit.as_str())
        .collect::<HashSet<_>>()
        .len();

    let post_engagement = scores
        .iter()
        .zip(&comment_counts)
        .map(|(score, comments)| score + comments)
        .sum();

    let common_subreddits = repeated_counts(posts.iter().map(|p| p.subreddit.as_str()));
    let common_flairs = repeated_counts(
        posts
            .iter()
            .filter_map(|p| p.flair.as_deref())
            .filter(|f| !f.is_empty()),
    );

    MetricsRecord {
        average_score: rounded_mean(&scores),
        average_comments: rounded_mean(&comment_counts),
        post_engagement,
        subreddit_diversity,
        comment_activity,
        interactions_with_others,
        post_count_analyzed: posts.len(),
        common_subreddits,
        common_flairs,
    }
}
