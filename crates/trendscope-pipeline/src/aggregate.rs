//! Aggregated views over enriched posts: sentiment buckets, readable records,
//! and the run report.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trendscope_core::{EnrichedPost, ReadableRecord, SentimentLabel, Source};

/// Post texts grouped by canonical sentiment. Unknown labels land in
/// `NEUTRAL`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBuckets {
    #[serde(rename = "POSITIVE")]
    pub positive: Vec<String>,
    #[serde(rename = "NEGATIVE")]
    pub negative: Vec<String>,
    #[serde(rename = "NEUTRAL")]
    pub neutral: Vec<String>,
}

impl SentimentBuckets {
    #[must_use]
    pub fn get(&self, label: &SentimentLabel) -> &[String] {
        match label.bucket() {
            SentimentLabel::Positive => &self.positive,
            SentimentLabel::Negative => &self.negative,
            _ => &self.neutral,
        }
    }

    fn push(&mut self, label: &SentimentLabel, text: String) {
        match label.bucket() {
            SentimentLabel::Positive => self.positive.push(text),
            SentimentLabel::Negative => self.negative.push(text),
            _ => self.neutral.push(text),
        }
    }
}

#[must_use]
pub fn bucket_by_sentiment(posts: &[EnrichedPost]) -> SentimentBuckets {
    let mut buckets = SentimentBuckets::default();
    for post in posts {
        buckets.push(&post.sentiment, post.post.analysis_text().to_string());
    }
    buckets
}

#[must_use]
pub fn to_readable(post: &EnrichedPost) -> ReadableRecord {
    post.to_readable()
}

/// Posts per canonical sentiment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    #[serde(rename = "POSITIVE")]
    pub positive: usize,
    #[serde(rename = "NEGATIVE")]
    pub negative: usize,
    #[serde(rename = "NEUTRAL")]
    pub neutral: usize,
}

impl SentimentCounts {
    /// Count for the bucket `label` aggregates into.
    #[must_use]
    pub fn get(&self, label: &SentimentLabel) -> usize {
        match label.bucket() {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            _ => self.neutral,
        }
    }
}

#[must_use]
pub fn sentiment_counts(posts: &[EnrichedPost]) -> SentimentCounts {
    let mut counts = SentimentCounts::default();
    for post in posts {
        match post.sentiment.bucket() {
            SentimentLabel::Positive => counts.positive += 1,
            SentimentLabel::Negative => counts.negative += 1,
            _ => counts.neutral += 1,
        }
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCount {
    pub text: String,
    pub label: String,
    pub count: usize,
}

/// Count occurrences and rank by frequency; ties keep first-seen order.
fn rank<K, I>(items: I, n: usize) -> Vec<(K, usize)>
where
    K: Eq + std::hash::Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut order: Vec<K> = Vec::new();
    let mut counts: HashMap<K, usize> = HashMap::new();
    for item in items {
        let count = counts.entry(item.clone()).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }

    let mut ranked: Vec<(K, usize)> = order
        .into_iter()
        .map(|k| {
            let count = counts[&k];
            (k, count)
        })
        .collect();
    // Stable sort preserves first-seen order among equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// The `n` most frequent keywords across all posts.
#[must_use]
pub fn top_keywords(posts: &[EnrichedPost], n: usize) -> Vec<KeywordCount> {
    rank(posts.iter().flat_map(|p| p.keywords.iter().cloned()), n)
        .into_iter()
        .map(|(keyword, count)| KeywordCount { keyword, count })
        .collect()
}

/// The `n` most frequent `(text, label)` entities across all posts.
#[must_use]
pub fn top_entities(posts: &[EnrichedPost], n: usize) -> Vec<EntityCount> {
    rank(
        posts
            .iter()
            .flat_map(|p| p.entities.iter().map(|e| (e.text.clone(), e.label.clone()))),
        n,
    )
    .into_iter()
    .map(|((text, label), count)| EntityCount { text, label, count })
    .collect()
}

/// Summary written alongside the processed posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub query: String,
    pub generated_at: DateTime<Utc>,
    pub total_posts: usize,
    pub microblog_posts: usize,
    pub forum_posts: usize,
    pub sentiment: SentimentCounts,
    /// Mean classifier confidence, rounded to 3 decimals.
    pub mean_score: f64,
    pub top_keywords: Vec<KeywordCount>,
    pub top_entities: Vec<EntityCount>,
}

impl Report {
    #[must_use]
    pub fn build(query: &str, posts: &[EnrichedPost], top_n: usize) -> Self {
        let forum_posts = posts
            .iter()
            .filter(|p| p.post.raw.source == Source::Forum)
            .count();
        #[allow(clippy::cast_precision_loss)]
        let mean_score = if posts.is_empty() {
            0.0
        } else {
            let sum: f64 = posts.iter().map(|p| p.sentiment_score).sum();
            ((sum / posts.len() as f64) * 1000.0).round() / 1000.0
        };

        Self {
            query: query.to_string(),
            generated_at: Utc::now(),
            total_posts: posts.len(),
            microblog_posts: posts.len() - forum_posts,
            forum_posts,
            sentiment: sentiment_counts(posts),
            mean_score,
            top_keywords: top_keywords(posts, top_n),
            top_entities: top_entities(posts, top_n),
        }
    }
}
