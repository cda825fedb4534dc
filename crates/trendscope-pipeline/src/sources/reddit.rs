//! Reddit API forum source (client-credentials OAuth).

use async_trait::async_trait;
use serde::Deserialize;

use super::reddit_helpers::{clean_forum_text, is_removed};
use super::{ForumComment, ForumSource, ForumThread};
use crate::error::PipelineError;
use crate::http::{ensure_success, retry_with_backoff, RetryPolicy};

const AUTH_BASE_URL: &str = "https://www.reddit.com";
const API_BASE_URL: &str = "https://oauth.reddit.com";
/// Reddit caps a listing page at 100 items.
const MAX_PAGE_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    children: Vec<Thing<T>>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thing<T> {
    kind: String,
    data: T,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    created_utc: Option<f64>,
    #[serde(default)]
    permalink: Option<String>,
}

/// Comment listings mix `t1` comments with `more` stubs, so every field is
/// optional here and non-`t1` children are discarded after parsing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommentData {
    id: String,
    body: Option<String>,
    author: Option<String>,
    score: i64,
    created_utc: Option<f64>,
    parent_id: Option<String>,
}

/// Reddit API client holding a valid application access token.
pub struct RedditClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
    user_agent: String,
    retry: RetryPolicy,
}

impl RedditClient {
    /// Exchange client credentials for a token against the production hosts.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Reddit`] if the token exchange is rejected.
    pub async fn connect(
        client: reqwest::Client,
        client_id: &str,
        client_secret: &str,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, PipelineError> {
        Self::connect_with_base_urls(
            client,
            client_id,
            client_secret,
            user_agent,
            retry,
            AUTH_BASE_URL,
            API_BASE_URL,
        )
        .await
    }

    /// Like [`RedditClient::connect`] with explicit hosts (used by tests).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Reddit`] if the token exchange is rejected.
    pub async fn connect_with_base_urls(
        client: reqwest::Client,
        client_id: &str,
        client_secret: &str,
        user_agent: &str,
        retry: RetryPolicy,
        auth_base: &str,
        api_base: &str,
    ) -> Result<Self, PipelineError> {
        let token_url = &format!("{}/api/v1/access_token", auth_base.trim_end_matches('/'));
        let http = &client;
        let token: TokenResponse = retry_with_backoff(retry, "reddit.token", || async move {
            let response = http
                .post(token_url)
                .header("User-Agent", user_agent)
                .basic_auth(client_id, Some(client_secret))
                .form(&[("grant_type", "client_credentials")])
                .send()
                .await?;
            Ok::<_, PipelineError>(ensure_success(response)?.json::<TokenResponse>().await?)
        })
        .await
        .map_err(|e| PipelineError::Reddit(format!("token exchange failed: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.access_token,
            user_agent: user_agent.to_string(),
            retry,
        })
    }

    async fn get_json<T>(&self, path: &str, params: &[(&str, String)], what: &str) -> Result<T, PipelineError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = &format!("{}{path}", self.api_base);
        retry_with_backoff(self.retry, what, || async move {
            let response = self
                .client
                .get(url)
                .bearer_auth(&self.token)
                .header("User-Agent", &self.user_agent)
                .query(params)
                .send()
                .await?;
            Ok::<_, PipelineError>(ensure_success(response)?.json::<T>().await?)
        })
        .await
    }

    async fn search_posts(&self, query: &str, post_limit: usize) -> Result<Vec<PostData>, PipelineError> {
        let mut posts = Vec::new();
        let mut after: Option<String> = None;

        while posts.len() < post_limit {
            let page_limit = (post_limit - posts.len()).min(MAX_PAGE_LIMIT);
            let mut params: Vec<(&str, String)> = vec![
                ("q", query.to_string()),
                ("limit", page_limit.to_string()),
                ("sort", "relevance".to_string()),
                ("type", "link".to_string()),
                ("raw_json", "1".to_string()),
            ];
            if let Some(cursor) = &after {
                params.push(("after", cursor.clone()));
            }

            let listing: Listing<PostData> = self
                .get_json("/r/all/search", &params, "reddit.search")
                .await
                .map_err(|e| PipelineError::Reddit(format!("search for {query:?} failed: {e}")))?;

            let page_len = listing.data.children.len();
            posts.extend(
                listing
                    .data
                    .children
                    .into_iter()
                    .filter(|thing| thing.kind == "t3")
                    .map(|thing| thing.data),
            );

            after = listing.data.after;
            if after.is_none() || page_len == 0 {
                break;
            }
        }

        posts.truncate(post_limit);
        Ok(posts)
    }

    async fn fetch_comments(&self, post_id: &str, comment_limit: usize) -> Result<Vec<ForumComment>, PipelineError> {
        let params = [
            ("limit", comment_limit.to_string()),
            ("depth", "1".to_string()),
            ("sort", "top".to_string()),
            ("raw_json", "1".to_string()),
        ];
        let listings: Vec<Listing<CommentData>> = self
            .get_json(&format!("/comments/{post_id}"), &params, "reddit.comments")
            .await?;

        Ok(listings
            .into_iter()
            .nth(1)
            .map(|listing| listing.data.children)
            .unwrap_or_default()
            .into_iter()
            .filter(|thing| thing.kind == "t1")
            .map(|thing| thing.data)
            .filter(|c| c.body.as_deref().is_some_and(|b| !is_removed(b)))
            .take(comment_limit)
            .map(|c| ForumComment {
                id: c.id,
                body: clean_forum_text(c.body.as_deref().unwrap_or_default()),
                author: c.author,
                score: c.score,
                created_utc: c.created_utc,
                parent_id: c.parent_id,
            })
            .collect())
    }
}

#[async_trait]
impl ForumSource for RedditClient {
    async fn search(
        &self,
        query: &str,
        post_limit: usize,
        comment_limit: usize,
    ) -> Result<Vec<ForumThread>, PipelineError> {
        let posts = self.search_posts(query, post_limit).await?;
        let mut threads = Vec::with_capacity(posts.len());

        for post in posts {
            // Comment failures never drop the post itself.
            let comments = if comment_limit == 0 {
                Vec::new()
            } else {
                match self.fetch_comments(&post.id, comment_limit).await {
                    Ok(comments) => comments,
                    Err(e) => {
                        tracing::debug!(post_id = %post.id, error = %e, "failed to fetch Reddit comments");
                        Vec::new()
                    }
                }
            };

            threads.push(ForumThread {
                title: clean_forum_text(&post.title),
                body: if is_removed(&post.selftext) {
                    String::new()
                } else {
                    clean_forum_text(&post.selftext)
                },
                id: post.id,
                subreddit: post.subreddit,
                author: post.author,
                score: post.score,
                created_utc: post.created_utc,
                permalink: post.permalink,
                comments,
            });
        }

        tracing::debug!(query, threads = threads.len(), "collected Reddit threads");
        Ok(threads)
    }
}
