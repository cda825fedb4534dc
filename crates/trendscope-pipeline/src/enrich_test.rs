use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use trendscope_core::{Engagement, RawPost, Source, SourceExtras};

use super::*;
use crate::error::PipelineError;
use crate::nlp::{LexiconClassifier, RuleBasedNlp};

fn post(id: usize, text: &str) -> NormalizedPost {
    NormalizedPost {
        raw: RawPost {
            id: id.to_string(),
            source: Source::Microblog,
            raw_text: text.to_string(),
            author_handle: None,
            author_name: None,
            created_at: None,
            engagement: Engagement::default(),
            url: None,
            extras: SourceExtras::Microblog {
                hashtags: vec![],
                content_urls: vec![],
            },
        },
        cleaned_text: text.to_string(),
        translated_text: text.to_string(),
        query: "q".to_string(),
        ordinal_index: id,
    }
}

fn enricher(classifier: Arc<dyn SentimentClassifier>) -> Enricher {
    Enricher::new(Arc::new(RuleBasedNlp), Arc::new(RuleBasedNlp), classifier)
}

struct FailingClassifier;

#[async_trait]
impl SentimentClassifier for FailingClassifier {
    async fn classify(&self, _batch: &[String]) -> Result<Vec<RawSentiment>, PipelineError> {
        Err(PipelineError::Classifier("model unavailable".to_string()))
    }
}

/// Echoes each text back as its label. The batch containing `slow_marker`
/// sleeps first so later batches finish before it.
struct EchoClassifier {
    slow_marker: &'static str,
    completed: Mutex<Vec<String>>,
}

#[async_trait]
impl SentimentClassifier for EchoClassifier {
    async fn classify(&self, batch: &[String]) -> Result<Vec<RawSentiment>, PipelineError> {
        if batch.iter().any(|t| t == self.slow_marker) {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        self.completed.lock().unwrap().push(batch[0].clone());
        Ok(batch
            .iter()
            .map(|t| RawSentiment {
                label: t.clone(),
                score: 0.987_654,
            })
            .collect())
    }
}

/// Returns one verdict fewer than asked for.
struct ShortClassifier;

#[async_trait]
impl SentimentClassifier for ShortClassifier {
    async fn classify(&self, batch: &[String]) -> Result<Vec<RawSentiment>, PipelineError> {
        Ok(batch
            .iter()
            .skip(1)
            .map(|_| RawSentiment {
                label: "LABEL_2".to_string(),
                score: 0.9,
            })
            .collect())
    }
}

/// Fails only the batch containing `bad`.
struct PartialClassifier;

#[async_trait]
impl SentimentClassifier for PartialClassifier {
    async fn classify(&self, batch: &[String]) -> Result<Vec<RawSentiment>, PipelineError> {
        if batch.iter().any(|t| t == "bad") {
            return Err(PipelineError::Classifier("batch rejected".to_string()));
        }
        Ok(batch
            .iter()
            .map(|_| RawSentiment {
                label: "LABEL_0".to_string(),
                score: 0.75,
            })
            .collect())
    }
}

#[tokio::test]
async fn every_batch_failing_still_yields_one_result_per_post() {
    let posts: Vec<NormalizedPost> = (0..7).map(|i| post(i, "Some text about the city")).collect();

    let enriched = enricher(Arc::new(FailingClassifier)).enrich(posts, 3, 2).await;

    assert_eq!(enriched.len(), 7);
    assert!(enriched
        .iter()
        .all(|e| e.sentiment == SentimentLabel::Neutral && e.sentiment_score == 0.0));
    let ids: Vec<&str> = enriched.iter().map(|e| e.post.raw.id.as_str()).collect();
    assert_eq!(ids, vec!["0", "1", "2", "3", "4", "5", "6"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn batches_join_in_input_order_not_completion_order() {
    let classifier = Arc::new(EchoClassifier {
        slow_marker: "LABEL_0",
        completed: Mutex::new(Vec::new()),
    });
    let texts: Vec<String> = ["LABEL_0", "LABEL_0", "LABEL_1", "LABEL_1", "LABEL_2", "LABEL_2"]
        .iter()
        .map(|t| (*t).to_string())
        .collect();

    let verdicts = enricher(classifier.clone()).classify_all(&texts, 2, 3).await;

    let labels: Vec<SentimentLabel> = verdicts.into_iter().map(|(label, _)| label).collect();
    assert_eq!(
        labels,
        vec![
            SentimentLabel::Negative,
            SentimentLabel::Negative,
            SentimentLabel::Neutral,
            SentimentLabel::Neutral,
            SentimentLabel::Positive,
            SentimentLabel::Positive,
        ]
    );
    let completed = classifier.completed.lock().unwrap().clone();
    assert_eq!(completed.last().map(String::as_str), Some("LABEL_0"));
}

/// Tracks how many `classify` calls are in flight at once.
#[derive(Default)]
struct CountingClassifier {
    live: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl SentimentClassifier for CountingClassifier {
    async fn classify(&self, batch: &[String]) -> Result<Vec<RawSentiment>, PipelineError> {
        let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.live.fetch_sub(1, Ordering::SeqCst);
        Ok(batch
            .iter()
            .map(|_| RawSentiment {
                label: "LABEL_1".to_string(),
                score: 0.5,
            })
            .collect())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn running_batches_never_exceed_concurrency() {
    let classifier = Arc::new(CountingClassifier::default());
    let texts: Vec<String> = (0..40).map(|i| format!("text {i}")).collect();

    let verdicts = enricher(classifier.clone()).classify_all(&texts, 2, 3).await;

    assert_eq!(verdicts.len(), 40);
    let peak = classifier.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency {peak} exceeded the limit of 3");
    assert!(peak > 1, "batches never overlapped");
}

#[tokio::test]
async fn short_batch_results_are_padded_with_neutral() {
    let texts: Vec<String> = (0..4).map(|i| format!("text {i}")).collect();

    let verdicts = enricher(Arc::new(ShortClassifier)).classify_all(&texts, 2, 1).await;

    assert_eq!(
        verdicts,
        vec![
            (SentimentLabel::Positive, 0.9),
            (SentimentLabel::Neutral, 0.0),
            (SentimentLabel::Positive, 0.9),
            (SentimentLabel::Neutral, 0.0),
        ]
    );
}

#[tokio::test]
async fn one_failed_batch_does_not_affect_others() {
    let texts: Vec<String> = ["ok", "ok", "bad", "ok"].iter().map(|t| (*t).to_string()).collect();

    let verdicts = enricher(Arc::new(PartialClassifier)).classify_all(&texts, 2, 2).await;

    assert_eq!(
        verdicts,
        vec![
            (SentimentLabel::Negative, 0.75),
            (SentimentLabel::Negative, 0.75),
            (SentimentLabel::Neutral, 0.0),
            (SentimentLabel::Neutral, 0.0),
        ]
    );
}

#[tokio::test]
async fn scores_are_rounded_to_three_decimals() {
    let classifier = Arc::new(EchoClassifier {
        slow_marker: "never",
        completed: Mutex::new(Vec::new()),
    });
    let verdicts = enricher(classifier)
        .classify_all(&["POSITIVE".to_string()], 64, 4)
        .await;
    assert_eq!(verdicts, vec![(SentimentLabel::Positive, 0.988)]);
}

#[tokio::test]
async fn unknown_labels_pass_through() {
    let classifier = Arc::new(EchoClassifier {
        slow_marker: "never",
        completed: Mutex::new(Vec::new()),
    });
    let verdicts = enricher(classifier).classify_all(&["joy".to_string()], 64, 4).await;
    assert_eq!(verdicts[0].0, SentimentLabel::Unknown("joy".to_string()));
}

#[tokio::test]
async fn empty_input_yields_empty_output() {
    let enriched = enricher(Arc::new(FailingClassifier)).enrich(Vec::new(), 64, 4).await;
    assert!(enriched.is_empty());
}

#[test]
fn keywords_are_lowercased_deduped_and_filtered() {
    let enricher = enricher(Arc::new(LexiconClassifier));
    let keywords = enricher.keywords("Main Roads, main roads. Lahore rain, UK");
    assert_eq!(keywords, vec!["main roads", "lahore rain"]);
}

#[test]
fn entities_of_blank_text_are_empty() {
    let enricher = enricher(Arc::new(LexiconClassifier));
    assert!(enricher.entities("   ").is_empty());
}

#[tokio::test]
async fn enrich_populates_all_fields() {
    let posts = vec![post(0, "Heavy rain flooded the main roads in Lahore, a terrible day")];

    let enriched = enricher(Arc::new(LexiconClassifier)).enrich(posts, 64, 4).await;

    let first = &enriched[0];
    assert_eq!(first.keywords, vec!["heavy rain", "main roads", "lahore", "terrible day"]);
    assert_eq!(
        first.entities,
        vec![Entity {
            text: "Lahore".to_string(),
            label: "LOC".to_string(),
        }]
    );
    assert_eq!(first.sentiment, SentimentLabel::Negative);
    assert!(first.sentiment_score > 0.5);
}

#[test]
fn round_score_clamps_and_handles_nan() {
    assert!((round_score(0.123_56) - 0.124).abs() < f64::EPSILON);
    assert!((round_score(1.7) - 1.0).abs() < f64::EPSILON);
    assert!(round_score(-0.2).abs() < f64::EPSILON);
    assert!(round_score(f64::NAN).abs() < f64::EPSILON);
}
