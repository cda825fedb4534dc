//! NLP enrichment: keyword phrases, named entities, and batched sentiment.
//!
//! Sentiment batches run concurrently on spawned tasks but results are
//! joined in input order. A failed batch degrades to `NEUTRAL`/0.0 for each
//! of its posts, so the output always has one entry per input post.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use trendscope_core::{EnrichedPost, Entity, NormalizedPost, SentimentLabel};

use crate::nlp::{EntityRecognizer, PhraseChunker, RawSentiment, SentimentClassifier};

/// Phrases must be longer than this many characters to count as keywords.
const MIN_KEYWORD_CHARS: usize = 2;

/// Verdict used for posts whose batch produced no result.
fn fallback() -> (SentimentLabel, f64) {
    (SentimentLabel::Neutral, 0.0)
}

/// Clamp to `[0, 1]` and round to 3 decimals. NaN becomes 0.
#[must_use]
pub fn round_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    (score.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}

fn normalize_verdict(verdict: RawSentiment) -> (SentimentLabel, f64) {
    (
        SentimentLabel::from_model_label(&verdict.label),
        round_score(verdict.score),
    )
}

/// Pad with the fallback verdict or truncate so `verdicts` has `len` entries.
fn fit(mut verdicts: Vec<(SentimentLabel, f64)>, len: usize) -> Vec<(SentimentLabel, f64)> {
    verdicts.truncate(len);
    verdicts.resize_with(len, fallback);
    verdicts
}

/// Enrichment engine holding the injected NLP services.
#[derive(Clone)]
pub struct Enricher {
    chunker: Arc<dyn PhraseChunker>,
    recognizer: Arc<dyn EntityRecognizer>,
    classifier: Arc<dyn SentimentClassifier>,
}

impl Enricher {
    #[must_use]
    pub fn new(
        chunker: Arc<dyn PhraseChunker>,
        recognizer: Arc<dyn EntityRecognizer>,
        classifier: Arc<dyn SentimentClassifier>,
    ) -> Self {
        Self {
            chunker,
            recognizer,
            classifier,
        }
    }

    /// Enrich every post. Output length and order always match the input.
    pub async fn enrich(
        &self,
        posts: Vec<NormalizedPost>,
        batch_size: usize,
        concurrency: usize,
    ) -> Vec<EnrichedPost> {
        let texts: Vec<String> = posts.iter().map(|p| p.analysis_text().to_string()).collect();
        let verdicts = self.classify_all(&texts, batch_size, concurrency).await;

        let enriched: Vec<EnrichedPost> = posts
            .into_iter()
            .zip(verdicts)
            .map(|(post, (sentiment, sentiment_score))| {
                let text = post.analysis_text();
                EnrichedPost {
                    keywords: self.keywords(text),
                    entities: self.entities(text),
                    sentiment,
                    sentiment_score,
                    post,
                }
            })
            .collect();

        tracing::info!(posts = enriched.len(), "enrichment complete");
        enriched
    }

    /// Lower-cased noun phrases longer than two characters, first-seen order,
    /// no duplicates.
    #[must_use]
    pub fn keywords(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.chunker
            .noun_phrases(text)
            .into_iter()
            .map(|phrase| phrase.trim().to_lowercase())
            .filter(|phrase| phrase.chars().count() > MIN_KEYWORD_CHARS)
            .filter(|phrase| seen.insert(phrase.clone()))
            .collect()
    }

    /// Named entities with trimmed text, in recognizer order.
    #[must_use]
    pub fn entities(&self, text: &str) -> Vec<Entity> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.recognizer
            .entities(text)
            .into_iter()
            .filter_map(|entity| {
                let trimmed = entity.text.trim();
                (!trimmed.is_empty()).then(|| Entity {
                    text: trimmed.to_string(),
                    label: entity.label,
                })
            })
            .collect()
    }

    /// Classify `texts` in batches of `batch_size`, running at most
    /// `concurrency` batches at once.
    ///
    /// Returns exactly one verdict per text, in input order.
    pub async fn classify_all(
        &self,
        texts: &[String],
        batch_size: usize,
        concurrency: usize,
    ) -> Vec<(SentimentLabel, f64)> {
        let batch_size = batch_size.max(1);
        let concurrency = concurrency.max(1);

        let jobs = texts.chunks(batch_size).map(<[String]>::to_vec).enumerate().map(|(idx, batch)| {
            let classifier = Arc::clone(&self.classifier);
            async move {
                let len = batch.len();
                let handle = tokio::spawn(async move { classifier.classify(&batch).await });
                let verdicts = match handle.await {
                    Ok(Ok(verdicts)) => verdicts.into_iter().map(normalize_verdict).collect(),
                    Ok(Err(e)) => {
                        tracing::warn!(batch = idx, size = len, error = %e, "sentiment batch failed, defaulting to NEUTRAL");
                        Vec::new()
                    }
                    Err(e) => {
                        tracing::warn!(batch = idx, size = len, error = %e, "sentiment worker aborted, defaulting to NEUTRAL");
                        Vec::new()
                    }
                };
                fit(verdicts, len)
            }
        });

        // `buffered` yields in submission order regardless of completion order.
        let per_batch: Vec<Vec<(SentimentLabel, f64)>> =
            stream::iter(jobs).buffered(concurrency).collect().await;

        let mut verdicts: Vec<(SentimentLabel, f64)> = per_batch.into_iter().flatten().collect();
        if verdicts.len() < texts.len() {
            tracing::warn!(
                missing = texts.len() - verdicts.len(),
                "padding missing sentiment results with NEUTRAL"
            );
        }
        verdicts.resize_with(texts.len(), fallback);
        verdicts
    }
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;
