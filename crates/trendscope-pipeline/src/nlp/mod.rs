//! NLP collaborators used by the enrichment engine.
//!
//! Phrase chunking and entity recognition are synchronous and infallible once
//! constructed. Sentiment classification is a fallible batch call.

mod lexicon;
mod rules;
mod tei;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trendscope_core::Entity;

use crate::error::PipelineError;

pub use lexicon::{lexicon_polarity, LexiconClassifier};
pub use rules::RuleBasedNlp;
pub use tei::TeiClassifier;

/// Extracts noun phrases from English text.
pub trait PhraseChunker: Send + Sync {
    fn noun_phrases(&self, text: &str) -> Vec<String>;
}

/// Tags named entities in English text.
pub trait EntityRecognizer: Send + Sync {
    /// Entities in the order they occur in `text`.
    fn entities(&self, text: &str) -> Vec<Entity>;
}

/// One classifier verdict, in the model's own label vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSentiment {
    pub label: String,
    pub score: f64,
}

/// Batch sentiment classifier.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify every text in `batch`, returning one verdict per input in
    /// input order.
    async fn classify(&self, batch: &[String]) -> Result<Vec<RawSentiment>, PipelineError>;
}
