use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, QualityThresholds};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is malformed or a credential pair is
/// only half configured.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// # Errors
///
/// Returns `ConfigError` if a value is malformed or a credential pair is
/// only half configured.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value::<u64>(var, &or_default(var, default))
    };

    let parse_count = |var: &str, default: &str| -> Result<usize, ConfigError> {
        parse_value::<usize>(var, &or_default(var, default))
    };

    let parse_positive = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = parse_count(var, default)?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(value)
    };

    // Credentials come in pairs; one without the other is a config mistake.
    let paired = |first: &str, second: &str| -> Result<(Option<String>, Option<String>), ConfigError> {
        match (optional(first), optional(second)) {
            (Some(_), None) => Err(ConfigError::MissingEnvVar(second.to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar(first.to_string())),
            pair => Ok(pair),
        }
    };

    let log_level = or_default("TRENDSCOPE_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("TRENDSCOPE_OUTPUT_DIR", "./data"));

    let request_timeout_secs = parse_num("TRENDSCOPE_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_value::<u32>(
        "TRENDSCOPE_MAX_RETRIES",
        &or_default("TRENDSCOPE_MAX_RETRIES", "3"),
    )?;
    let retry_backoff_base_ms = parse_num("TRENDSCOPE_RETRY_BACKOFF_BASE_MS", "1000")?;

    let sentiment_batch_size = parse_positive("TRENDSCOPE_SENTIMENT_BATCH_SIZE", "64")?;
    let sentiment_concurrency = parse_positive("TRENDSCOPE_SENTIMENT_CONCURRENCY", "4")?;

    let defaults = QualityThresholds::default();
    let quality = QualityThresholds {
        min_clean_chars: parse_count(
            "TRENDSCOPE_MIN_CLEAN_CHARS",
            &defaults.min_clean_chars.to_string(),
        )?,
        max_hashtags: parse_count(
            "TRENDSCOPE_MAX_HASHTAGS",
            &defaults.max_hashtags.to_string(),
        )?,
        link_min_tokens: parse_count(
            "TRENDSCOPE_LINK_MIN_TOKENS",
            &defaults.link_min_tokens.to_string(),
        )?,
    };

    let max_keywords = parse_positive("TRENDSCOPE_MAX_KEYWORDS", "6")?;
    let forum_query_limit = parse_count("TRENDSCOPE_FORUM_QUERY_LIMIT", "3")?;
    let forum_post_limit = parse_count("TRENDSCOPE_FORUM_POST_LIMIT", "25")?;
    let forum_comment_limit = parse_count("TRENDSCOPE_FORUM_COMMENT_LIMIT", "30")?;

    let bird_bin = or_default("TRENDSCOPE_BIRD_BIN", "bird");
    let (twitter_auth_token, twitter_ct0) = paired("TWITTER_AUTH_TOKEN", "TWITTER_CT0")?;
    let (reddit_client_id, reddit_client_secret) =
        paired("REDDIT_CLIENT_ID", "REDDIT_CLIENT_SECRET")?;
    let reddit_user_agent = or_default("REDDIT_USER_AGENT", "trendscope/0.1 (keyword-monitor)");

    Ok(AppConfig {
        log_level,
        output_dir,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        sentiment_batch_size,
        sentiment_concurrency,
        quality,
        max_keywords,
        forum_query_limit,
        forum_post_limit,
        forum_comment_limit,
        bird_bin,
        twitter_auth_token,
        twitter_ct0,
        reddit_client_id,
        reddit_client_secret,
        reddit_user_agent,
        translate_url: optional("TRENDSCOPE_TRANSLATE_URL"),
        translate_api_key: optional("TRENDSCOPE_TRANSLATE_API_KEY"),
        classifier_url: optional("TRENDSCOPE_CLASSIFIER_URL"),
        ollama_url: optional("TRENDSCOPE_OLLAMA_URL"),
        ollama_model: or_default("TRENDSCOPE_OLLAMA_MODEL", "gemma3:1b"),
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
