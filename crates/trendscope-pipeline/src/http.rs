//! Shared HTTP plumbing: client construction, status checks, and retry with
//! exponential back-off and jitter.
//!
//! [`retry_with_backoff`] retries transient failures only (network errors,
//! 429, 5xx). Everything else is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::PipelineError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 60_000;

/// How many times and how patiently to retry transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    #[must_use]
    pub fn from_config(config: &trendscope_core::AppConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1_000,
        }
    }
}

/// Build the shared `reqwest` client.
///
/// # Errors
///
/// Returns [`PipelineError::Http`] if the TLS backend cannot be initialised.
pub fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<reqwest::Client, PipelineError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Turn a non-2xx response into [`PipelineError::UnexpectedStatus`].
pub(crate) fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, PipelineError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(PipelineError::UnexpectedStatus {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &PipelineError) -> bool {
    match err {
        PipelineError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        PipelineError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        PipelineError::Deserialize { .. }
        | PipelineError::Twitter(_)
        | PipelineError::Reddit(_)
        | PipelineError::Classifier(_)
        | PipelineError::Translate(_)
        | PipelineError::KeywordGen(_) => false,
    }
}

/// Runs `operation`, retrying transient errors up to `policy.max_retries` times.
///
/// Sleeps `backoff_base_ms × 2^(attempt-1)` ± 25 % jitter between attempts,
/// capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    what: &str,
    mut operation: F,
) -> Result<T, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = policy
                    .backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    call = what,
                    error = %err,
                    "transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn status(code: u16) -> PipelineError {
        PipelineError::UnexpectedStatus {
            status: code,
            url: "http://localhost/test".to_owned(),
        }
    }

    fn instant_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff_base_ms: 0,
        }
    }

    #[test]
    fn server_errors_and_rate_limits_are_retriable() {
        assert!(is_retriable(&status(503)));
        assert!(is_retriable(&status(429)));
        assert!(!is_retriable(&status(404)));
        assert!(!is_retriable(&PipelineError::Classifier("bad".to_owned())));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(instant_policy(3), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(status(502))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(instant_policy(2), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(status(500)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retriable_error_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(instant_policy(5), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(status(401)) }
        })
        .await;
        assert!(matches!(
            result,
            Err(PipelineError::UnexpectedStatus { status: 401, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
