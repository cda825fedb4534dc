//! Twitter/X search via the `bird` CLI.
//!
//! Invokes `bird search "{keyword}" --json -n {limit} [--auth-token ... --ct0 ...]`
//! as a subprocess and maps each tweet onto a [`RawPost`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use trendscope_core::{Engagement, RawPost, Source, SourceExtras};

use super::MicroblogSource;
use crate::error::PipelineError;
use crate::normalize::{extract_hashtags, extract_urls};

/// Legacy Twitter timestamp layout, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const LEGACY_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BirdTweet {
    id: String,
    text: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    like_count: Option<u64>,
    #[serde(default)]
    retweet_count: Option<u64>,
    #[serde(default)]
    reply_count: Option<u64>,
    #[serde(default)]
    view_count: Option<u64>,
    #[serde(default)]
    bookmark_count: Option<u64>,
    #[serde(default)]
    author: Option<BirdAuthor>,
}

#[derive(Debug, Deserialize)]
struct BirdAuthor {
    username: String,
    #[serde(default)]
    name: Option<String>,
}

/// Microblog source backed by the `bird` command-line client.
#[derive(Debug, Clone)]
pub struct BirdClient {
    binary: String,
    credentials: Option<(String, String)>,
}

impl BirdClient {
    /// `credentials` is the `(auth_token, ct0)` cookie pair; without it `bird`
    /// falls back to whatever session it has stored locally.
    #[must_use]
    pub fn new(binary: &str, credentials: Option<(String, String)>) -> Self {
        Self {
            binary: binary.to_string(),
            credentials,
        }
    }

    fn args(&self, keyword: &str, limit: usize) -> Vec<String> {
        let mut args = vec![
            "search".to_string(),
            keyword.to_string(),
            "--json".to_string(),
            "-n".to_string(),
            limit.to_string(),
        ];
        if let Some((auth_token, ct0)) = &self.credentials {
            args.extend([
                "--auth-token".to_string(),
                auth_token.clone(),
                "--ct0".to_string(),
                ct0.clone(),
            ]);
        }
        args
    }
}

#[async_trait]
impl MicroblogSource for BirdClient {
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<RawPost>, PipelineError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let output = tokio::process::Command::new(&self.binary)
            .args(self.args(keyword, limit))
            .output()
            .await
            .map_err(|e| PipelineError::Twitter(format!("bird subprocess error: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::Twitter(format!(
                "bird search exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let mut posts = parse_bird_output(&output.stdout)?;
        posts.truncate(limit);
        tracing::debug!(keyword, count = posts.len(), "bird search complete");
        Ok(posts)
    }
}

/// Parse `bird --json` output into raw posts.
///
/// # Errors
///
/// Returns [`PipelineError::Deserialize`] when stdout is not a JSON array of
/// tweets.
pub fn parse_bird_output(stdout: &[u8]) -> Result<Vec<RawPost>, PipelineError> {
    let tweets: Vec<BirdTweet> =
        serde_json::from_slice(stdout).map_err(|source| PipelineError::Deserialize {
            context: "bird search output".to_string(),
            source,
        })?;
    Ok(tweets.into_iter().map(tweet_to_raw).collect())
}

fn tweet_to_raw(tweet: BirdTweet) -> RawPost {
    let (handle, name) = match tweet.author {
        Some(author) => (Some(author.username), author.name),
        None => (None, None),
    };
    let url = handle
        .as_deref()
        .map(|user| format!("https://x.com/{user}/status/{}", tweet.id));

    RawPost {
        created_at: tweet.created_at.as_deref().and_then(parse_tweet_time),
        engagement: Engagement {
            likes: tweet.like_count.unwrap_or(0),
            shares: tweet.retweet_count.unwrap_or(0),
            replies: tweet.reply_count.unwrap_or(0),
            views: tweet.view_count.unwrap_or(0),
            bookmarks: tweet.bookmark_count.unwrap_or(0),
        },
        extras: SourceExtras::Microblog {
            hashtags: extract_hashtags(&tweet.text),
            content_urls: extract_urls(&tweet.text),
        },
        id: tweet.id,
        source: Source::Microblog,
        raw_text: tweet.text,
        author_handle: handle,
        author_name: name,
        url,
    }
}

fn parse_tweet_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, LEGACY_TIME_FORMAT))
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
}
