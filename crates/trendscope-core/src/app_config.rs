use std::path::PathBuf;

/// Thresholds for the spam/quality filter.
///
/// The defaults were tuned empirically against microblog search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityThresholds {
    /// Posts whose cleaned text is shorter than this are rejected.
    pub min_clean_chars: usize,
    /// Posts with more `#` characters than this are rejected.
    pub max_hashtags: usize,
    /// Posts containing a link need at least this many tokens.
    pub link_min_tokens: usize,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_clean_chars: 15,
            max_hashtags: 6,
            link_min_tokens: 5,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub output_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub sentiment_batch_size: usize,
    pub sentiment_concurrency: usize,
    pub quality: QualityThresholds,
    pub max_keywords: usize,
    pub forum_query_limit: usize,
    pub forum_post_limit: usize,
    pub forum_comment_limit: usize,
    pub bird_bin: String,
    pub twitter_auth_token: Option<String>,
    pub twitter_ct0: Option<String>,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_user_agent: String,
    pub translate_url: Option<String>,
    pub translate_api_key: Option<String>,
    pub classifier_url: Option<String>,
    pub ollama_url: Option<String>,
    pub ollama_model: String,
}

impl AppConfig {
    /// Reddit credentials, when both halves are configured.
    #[must_use]
    pub fn reddit_credentials(&self) -> Option<(&str, &str)> {
        match (&self.reddit_client_id, &self.reddit_client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("output_dir", &self.output_dir)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("sentiment_batch_size", &self.sentiment_batch_size)
            .field("sentiment_concurrency", &self.sentiment_concurrency)
            .field("quality", &self.quality)
            .field("max_keywords", &self.max_keywords)
            .field("forum_query_limit", &self.forum_query_limit)
            .field("forum_post_limit", &self.forum_post_limit)
            .field("forum_comment_limit", &self.forum_comment_limit)
            .field("bird_bin", &self.bird_bin)
            .field(
                "twitter_auth_token",
                &self.twitter_auth_token.as_ref().map(|_| "[redacted]"),
            )
            .field("twitter_ct0", &self.twitter_ct0.as_ref().map(|_| "[redacted]"))
            .field("reddit_client_id", &self.reddit_client_id)
            .field(
                "reddit_client_secret",
                &self.reddit_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field("translate_url", &self.translate_url)
            .field(
                "translate_api_key",
                &self.translate_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("classifier_url", &self.classifier_url)
            .field("ollama_url", &self.ollama_url)
            .field("ollama_model", &self.ollama_model)
            .finish()
    }
}
