//! Language detection and machine translation collaborators.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::http::{ensure_success, retry_with_backoff, RetryPolicy};
use crate::normalize::WORKING_LANGUAGE;

/// Detects the language of a text and translates between languages.
///
/// Both calls are fallible; callers treat failure as "keep the original".
#[async_trait]
pub trait Translator: Send + Sync {
    /// ISO 639-1 code of the text's language.
    async fn detect(&self, text: &str) -> Result<String, PipelineError>;

    async fn translate(&self, text: &str, target: &str) -> Result<String, PipelineError>;
}

/// Reports everything as already in the working language.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn detect(&self, _text: &str) -> Result<String, PipelineError> {
        Ok(WORKING_LANGUAGE.to_string())
    }

    async fn translate(&self, text: &str, _target: &str) -> Result<String, PipelineError> {
        Ok(text.to_string())
    }
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct Detection {
    language: String,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Client for a LibreTranslate-compatible HTTP API (`/detect`, `/translate`).
pub struct LibreTranslateClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl LibreTranslateClient {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: Option<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            retry,
        }
    }
}

#[async_trait]
impl Translator for LibreTranslateClient {
    async fn detect(&self, text: &str) -> Result<String, PipelineError> {
        let url = &format!("{}/detect", self.base_url);
        let request = &DetectRequest {
            q: text,
            api_key: self.api_key.as_deref(),
        };

        let detections: Vec<Detection> = retry_with_backoff(self.retry, "translate.detect", || async move {
            let response = self.client.post(url).json(request).send().await?;
            Ok::<_, PipelineError>(ensure_success(response)?.json::<Vec<Detection>>().await?)
        })
        .await?;

        detections
            .into_iter()
            .next()
            .map(|d| d.language)
            .ok_or_else(|| PipelineError::Translate("no language detected".to_string()))
    }

    async fn translate(&self, text: &str, target: &str) -> Result<String, PipelineError> {
        let url = &format!("{}/translate", self.base_url);
        let request = &TranslateRequest {
            q: text,
            source: "auto",
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response: TranslateResponse = retry_with_backoff(self.retry, "translate.translate", || async move {
            let response = self.client.post(url).json(request).send().await?;
            Ok::<_, PipelineError>(ensure_success(response)?.json::<TranslateResponse>().await?)
        })
        .await?;

        Ok(response.translated_text)
    }
}
