// Shared fixtures: an in-memory ActivitySource and builders for its data.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use churnlens::activity::error::ActivityError;
use churnlens::activity::traits::{ActivitySource, Comment, CommentNode, Post, UserInfo};

/// Serves canned users, posts and comment forests.
#[derive(Default)]
pub struct FakeSource {
    pub users: HashMap<String, UserInfo>,
    pub posts: HashMap<String, Vec<Post>>,
    pub forests: HashMap<String, Vec<CommentNode>>,
    pub rate_limited: bool,
    pub forest_fetches: AtomicUsize,
}

impl FakeSource {
    pub fn with_user(mut self, name: &str, posts: Vec<Post>) -> Self {
        for post in &posts {
            self.forests
                .entry(post.id.clone())
                .or_insert_with(|| post.comments.clone());
        }
        let stripped = posts
            .into_iter()
            .map(|mut p| {
                p.comments.clear();
                p
            })
            .collect();
        self.users.insert(name.to_string(), user(name));
        self.posts.insert(name.to_string(), stripped);
        self
    }

    pub fn forest_fetch_count(&self) -> usize {
        self.forest_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActivitySource for FakeSource {
    async fn fetch_user(&self, username: &str) -> Result<UserInfo, ActivityError> {
        if self.rate_limited {
            return Err(ActivityError::RateLimited { retry_after: 30 });
        }
        self.users
            .get(username)
            .cloned()
            .ok_or_else(|| ActivityError::NotFound {
                resource: format!("/user/{username}/about"),
            })
    }

    async fn fetch_recent_posts(
        &self,
        username: &str,
        _limit: usize,
    ) -> Result<Vec<Post>, ActivityError> {
        // Ignores the limit on purpose so callers' own truncation is exercised.
        Ok(self.posts.get(username).cloned().unwrap_or_default())
    }

    async fn fetch_comment_forest(&self, post_id: &str) -> Result<Vec<CommentNode>, ActivityError> {
        self.forest_fetches.fetch_add(1, Ordering::SeqCst);
        match self.forests.get(post_id) {
            Some(forest) => Ok(forest.clone()),
            None => Err(anyhow::anyhow!("no forest for {post_id}").into()),
        }
    }
}

pub fn user(name: &str) -> UserInfo {
    UserInfo {
        username: name.to_string(),
        created_utc: "2020-01-01 00:00:00".to_string(),
        link_karma: 100,
        comment_karma: 250,
        is_employee: false,
        verified: true,
        has_verified_email: true,
    }
}

pub fn post(id: &str, score: i64, num_comments: i64, subreddit: &str) -> Post {
    Post {
        id: id.to_string(),
        score,
        num_comments,
        subreddit: subreddit.to_string(),
        flair: None,
        comments: Vec::new(),
    }
}

pub fn with_flair(mut post: Post, flair: &str) -> Post {
    post.flair = Some(flair.to_string());
    post
}

pub fn with_comments(mut post: Post, comments: Vec<CommentNode>) -> Post {
    post.comments = comments;
    post
}

pub fn comment(author: &str, replies: Vec<CommentNode>) -> CommentNode {
    CommentNode::Comment(Comment {
        author: Some(author.to_string()),
        replies,
    })
}

pub fn deleted(replies: Vec<CommentNode>) -> CommentNode {
    CommentNode::Comment(Comment {
        author: None,
        replies,
    })
}
