//! Search keyword planning.
//!
//! A query is expanded into a short list of search phrases, either by an LLM
//! ([`OllamaKeywordGenerator`]) or by the deterministic tokenizer in
//! [`heuristic_keywords`]. Generator failures always fall back to the heuristic.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::http::{ensure_success, retry_with_backoff, RetryPolicy};

/// Turns a user query into search phrases.
#[async_trait]
pub trait KeywordGenerator: Send + Sync {
    async fn generate(&self, query: &str, max_keywords: usize) -> Result<Vec<String>, PipelineError>;
}

/// Deterministic keyword plan: the whole query, then each token longer than
/// two characters and its hashtag form, deduplicated in order and capped at
/// `max_keywords`.
///
/// Tokens split on whitespace, `,`, `.` and `/` only; hyphens and
/// apostrophes stay inside a token.
#[must_use]
pub fn heuristic_keywords(query: &str, max_keywords: usize) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() || max_keywords == 0 {
        return Vec::new();
    }

    let mut candidates = vec![query.to_string()];
    for token in query
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '/'))
        .filter(|t| t.chars().count() > 2)
    {
        candidates.push(token.to_string());
        candidates.push(format!("#{token}"));
    }

    let mut seen = HashSet::new();
    candidates.retain(|k| seen.insert(k.clone()));
    candidates.truncate(max_keywords);
    candidates
}

/// Resolve the keyword plan for a query.
///
/// Uses `generator` when one is configured and it returns a non-empty list;
/// otherwise logs the reason and uses [`heuristic_keywords`].
pub async fn plan_keywords(
    generator: Option<&dyn KeywordGenerator>,
    query: &str,
    max_keywords: usize,
) -> Vec<String> {
    if let Some(generator) = generator {
        match generator.generate(query, max_keywords).await {
            Ok(keywords) if !keywords.is_empty() => {
                tracing::info!(query, ?keywords, "generated search keywords");
                return keywords;
            }
            Ok(_) => {
                tracing::warn!(query, "keyword generator returned nothing, using heuristic");
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "keyword generation failed, using heuristic");
            }
        }
    }
    heuristic_keywords(query, max_keywords)
}

/// Parse an LLM reply into keyword phrases.
///
/// Accepts a JSON array of strings, one phrase per line (list markers and
/// quotes are stripped), or a single comma-separated line.
#[must_use]
pub fn parse_keyword_reply(raw: &str, max_keywords: usize) -> Vec<String> {
    let raw = raw.trim();

    if raw.starts_with('[') {
        if let Ok(parsed) = serde_json::from_str::<Vec<String>>(raw) {
            return finish(parsed, max_keywords);
        }
    }

    let lines: Vec<String> = raw
        .lines()
        .map(clean_phrase)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() == 1 && lines[0].contains(',') {
        let parts = lines[0].split(',').map(clean_phrase).collect();
        return finish(parts, max_keywords);
    }
    finish(lines, max_keywords)
}

fn clean_phrase(line: &str) -> String {
    let line = line.trim();
    let line = line.trim_start_matches(['-', '*', '•']);
    let line = match line.split_once(['.', ')']) {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => line,
    };
    line.trim().trim_matches(['"', '\'', '`']).trim().to_string()
}

fn finish(phrases: Vec<String>, max_keywords: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    phrases
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty() && seen.insert(p.to_lowercase()))
        .take(max_keywords)
        .collect()
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Keyword generator backed by a local Ollama model (`/api/generate`).
pub struct OllamaKeywordGenerator {
    client: reqwest::Client,
    url: String,
    model: String,
    retry: RetryPolicy,
}

impl OllamaKeywordGenerator {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, model: &str, retry: RetryPolicy) -> Self {
        Self {
            client,
            url: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.to_string(),
            retry,
        }
    }
}

#[async_trait]
impl KeywordGenerator for OllamaKeywordGenerator {
    async fn generate(&self, query: &str, max_keywords: usize) -> Result<Vec<String>, PipelineError> {
        let request = &GenerateRequest {
            model: &self.model,
            prompt: format!(
                "Convert this search intent into at most {max_keywords} concise search phrases \
                 for Twitter and Reddit. Return only the phrases, one per line.\n\nIntent: {query}"
            ),
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
        };

        let reply: GenerateResponse = retry_with_backoff(self.retry, "ollama.generate", || async move {
            let response = self.client.post(&self.url).json(request).send().await?;
            Ok::<_, PipelineError>(ensure_success(response)?.json::<GenerateResponse>().await?)
        })
        .await?;

        let keywords = parse_keyword_reply(&reply.response, max_keywords);
        if keywords.is_empty() {
            return Err(PipelineError::KeywordGen(format!(
                "model {} returned no usable phrases",
                self.model
            )));
        }
        Ok(keywords)
    }
}
