//! Content source abstractions and their concrete adapters.
//!
//! Each source has exactly one adapter function that maps its native record
//! shape onto [`RawPost`]; defaults for missing fields live there and nowhere
//! else.

mod reddit;
mod reddit_helpers;
mod twitter;

use async_trait::async_trait;
use trendscope_core::RawPost;

use crate::error::PipelineError;

pub use reddit::RedditClient;
pub use reddit_helpers::{clean_forum_text, forum_thread_to_raw, MAX_FOLDED_COMMENTS};
pub use twitter::{parse_bird_output, BirdClient};

/// Microblog keyword search.
#[async_trait]
pub trait MicroblogSource: Send + Sync {
    /// Up to `limit` posts matching `keyword`, newest first as the source
    /// reports them.
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<RawPost>, PipelineError>;
}

/// Discussion-forum search returning whole threads.
#[async_trait]
pub trait ForumSource: Send + Sync {
    async fn search(
        &self,
        query: &str,
        post_limit: usize,
        comment_limit: usize,
    ) -> Result<Vec<ForumThread>, PipelineError>;
}

/// A forum submission together with the comments fetched for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForumThread {
    pub id: String,
    pub subreddit: String,
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    pub score: i64,
    /// Seconds since the Unix epoch.
    pub created_utc: Option<f64>,
    pub permalink: Option<String>,
    pub comments: Vec<ForumComment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForumComment {
    pub id: String,
    pub body: String,
    pub author: Option<String>,
    pub score: i64,
    pub created_utc: Option<f64>,
    /// Fullname of the parent: `t3_*` for a top-level comment, `t1_*` for a reply.
    pub parent_id: Option<String>,
}

impl ForumComment {
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent_id.as_deref().map_or(true, |p| p.starts_with("t3_"))
    }
}
