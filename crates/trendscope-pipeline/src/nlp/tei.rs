//! TEI (Text Embeddings Inference) sequence-classification client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{RawSentiment, SentimentClassifier};
use crate::error::PipelineError;
use crate::http::{ensure_success, retry_with_backoff, RetryPolicy};

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a [String],
    truncate: bool,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    label: String,
    score: f64,
}

/// Sentiment classifier served by a TEI `/predict` endpoint.
pub struct TeiClassifier {
    client: reqwest::Client,
    url: String,
    retry: RetryPolicy,
}

impl TeiClassifier {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, retry: RetryPolicy) -> Self {
        Self {
            client,
            url: format!("{}/predict", base_url.trim_end_matches('/')),
            retry,
        }
    }
}

#[async_trait]
impl SentimentClassifier for TeiClassifier {
    /// One request per batch; the highest-scoring label wins for each input.
    async fn classify(&self, batch: &[String]) -> Result<Vec<RawSentiment>, PipelineError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let request = &PredictRequest {
            inputs: batch,
            truncate: true,
        };
        let predictions: Vec<Vec<Prediction>> = retry_with_backoff(self.retry, "tei.predict", || async move {
            let response = self.client.post(&self.url).json(request).send().await?;
            Ok::<_, PipelineError>(ensure_success(response)?.json::<Vec<Vec<Prediction>>>().await?)
        })
        .await?;

        if predictions.len() != batch.len() {
            return Err(PipelineError::Classifier(format!(
                "TEI returned {} predictions for {} inputs",
                predictions.len(),
                batch.len()
            )));
        }

        predictions
            .into_iter()
            .enumerate()
            .map(|(idx, labels)| {
                labels
                    .into_iter()
                    .max_by(|a, b| a.score.total_cmp(&b.score))
                    .map(|top| RawSentiment {
                        label: top.label,
                        score: top.score,
                    })
                    .ok_or_else(|| PipelineError::Classifier(format!("no labels returned for input {idx}")))
            })
            .collect()
    }
}
