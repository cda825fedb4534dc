//! Social-media trend pipeline: collection, normalization, NLP enrichment,
//! and aggregation.
//!
//! Collaborators (content sources, translator, NLP models) are traits
//! constructed once by the caller and injected into [`Collector`] and
//! [`Enricher`].

pub mod aggregate;
pub mod collector;
pub mod enrich;
pub mod error;
pub mod http;
pub mod keywords;
pub mod nlp;
pub mod normalize;
pub mod quality;
pub mod sources;
pub mod translate;

pub use aggregate::{
    bucket_by_sentiment, sentiment_counts, to_readable, top_entities, top_keywords, EntityCount,
    KeywordCount, Report, SentimentBuckets, SentimentCounts,
};
pub use collector::{Collector, CollectorSettings};
pub use enrich::Enricher;
pub use error::PipelineError;
pub use http::{build_http_client, RetryPolicy};
pub use keywords::{heuristic_keywords, plan_keywords, KeywordGenerator, OllamaKeywordGenerator};
pub use nlp::{
    EntityRecognizer, LexiconClassifier, PhraseChunker, RawSentiment, RuleBasedNlp,
    SentimentClassifier, TeiClassifier,
};
pub use normalize::{normalize_text, to_working_language};
pub use quality::is_low_quality;
pub use sources::{BirdClient, ForumComment, ForumSource, ForumThread, MicroblogSource, RedditClient};
pub use translate::{LibreTranslateClient, PassthroughTranslator, Translator};
