use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sentiment::SentimentLabel;

/// Timestamp layout used in readable records and saved files.
pub const READABLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where a post was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Short-form microblog updates (Twitter/X).
    #[serde(rename = "twitter")]
    Microblog,
    /// Discussion-forum submissions (Reddit).
    #[serde(rename = "reddit")]
    Forum,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Microblog => write!(f, "twitter"),
            Source::Forum => write!(f, "reddit"),
        }
    }
}

/// Engagement counters reported by the source. Absent counters are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Engagement {
    pub likes: u64,
    pub shares: u64,
    pub replies: u64,
    pub views: u64,
    pub bookmarks: u64,
}

/// Source-specific metadata that has no equivalent on the other source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceExtras {
    Microblog {
        hashtags: Vec<String>,
        content_urls: Vec<String>,
    },
    Forum {
        subreddit: String,
        /// Net vote score of the submission.
        score: i64,
        /// Number of comments folded into the post text.
        comment_count: usize,
    },
}

/// A post exactly as a source adapter produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    /// Opaque identifier, unique within its source.
    pub id: String,
    pub source: Source,
    pub raw_text: String,
    pub author_handle: Option<String>,
    pub author_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub engagement: Engagement,
    pub url: Option<String>,
    pub extras: SourceExtras,
}

impl RawPost {
    /// Hashtags carried as structured metadata (microblog posts only).
    #[must_use]
    pub fn hashtags(&self) -> &[String] {
        match &self.extras {
            SourceExtras::Microblog { hashtags, .. } => hashtags,
            SourceExtras::Forum { .. } => &[],
        }
    }
}

/// A post that passed the quality filter, with cleaned and translated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPost {
    pub raw: RawPost,
    pub cleaned_text: String,
    /// Best-effort English rendition of `cleaned_text`.
    pub translated_text: String,
    /// Search keyword that produced this post.
    pub query: String,
    /// Zero-based position within its fetch batch.
    pub ordinal_index: usize,
}

impl NormalizedPost {
    /// Text handed to the NLP stages.
    #[must_use]
    pub fn analysis_text(&self) -> &str {
        if self.translated_text.trim().is_empty() {
            &self.cleaned_text
        } else {
            &self.translated_text
        }
    }
}

/// A named entity as reported by the recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    /// Taxonomy label such as `PERSON`, `ORG`, `DATE` or `LOC`.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPost {
    pub post: NormalizedPost,
    /// Lower-cased noun phrases, first-seen order, no duplicates.
    pub keywords: Vec<String>,
    pub entities: Vec<Entity>,
    pub sentiment: SentimentLabel,
    /// Classifier confidence in `[0, 1]`, rounded to 3 decimals.
    pub sentiment_score: f64,
}

impl EnrichedPost {
    /// Project the stable, defaulted subset of fields for external consumers.
    #[must_use]
    pub fn to_readable(&self) -> ReadableRecord {
        let raw = &self.post.raw;
        ReadableRecord {
            username: raw.author_handle.clone().unwrap_or_default(),
            text: self.post.analysis_text().to_string(),
            sentiment: self.sentiment.as_str().to_string(),
            score: self.sentiment_score,
            keywords: self.keywords.clone(),
            entities: self.entities.clone(),
            created_at: raw
                .created_at
                .map(|ts| ts.format(READABLE_TIME_FORMAT).to_string())
                .unwrap_or_default(),
            url: raw.url.clone().unwrap_or_default(),
        }
    }
}

/// Flat per-post record for summarization and charting.
///
/// Every field has a default so partially-populated input never fails
/// to deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadableRecord {
    pub username: String,
    pub text: String,
    pub sentiment: String,
    pub score: f64,
    pub keywords: Vec<String>,
    pub entities: Vec<Entity>,
    pub created_at: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn enriched(author: Option<&str>) -> EnrichedPost {
        EnrichedPost {
            post: NormalizedPost {
                raw: RawPost {
                    id: "42".to_string(),
                    source: Source::Microblog,
                    raw_text: "Solar farms are expanding fast in Spain".to_string(),
                    author_handle: author.map(str::to_string),
                    author_name: None,
                    created_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()),
                    engagement: Engagement::default(),
                    url: None,
                    extras: SourceExtras::Microblog {
                        hashtags: vec![],
                        content_urls: vec![],
                    },
                },
                cleaned_text: "Solar farms are expanding fast in Spain".to_string(),
                translated_text: "Solar farms are expanding fast in Spain".to_string(),
                query: "solar".to_string(),
                ordinal_index: 0,
            },
            keywords: vec!["solar farms".to_string()],
            entities: vec![Entity {
                text: "Spain".to_string(),
                label: "LOC".to_string(),
            }],
            sentiment: SentimentLabel::Positive,
            sentiment_score: 0.912,
        }
    }

    #[test]
    fn readable_defaults_missing_username_to_empty() {
        let record = enriched(None).to_readable();
        assert_eq!(record.username, "");
        assert_eq!(record.url, "");
    }

    #[test]
    fn readable_formats_timestamp_and_label() {
        let record = enriched(Some("sunny")).to_readable();
        assert_eq!(record.username, "sunny");
        assert_eq!(record.created_at, "2025-03-01 09:30:00");
        assert_eq!(record.sentiment, "POSITIVE");
        assert!((record.score - 0.912).abs() < f64::EPSILON);
    }

    #[test]
    fn readable_deserializes_from_sparse_json() {
        let record: ReadableRecord = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(record.text, "hello");
        assert_eq!(record.username, "");
        assert!(record.keywords.is_empty());
        assert!(record.score.abs() < f64::EPSILON);
    }

    #[test]
    fn analysis_text_falls_back_to_cleaned() {
        let mut post = enriched(None).post;
        post.translated_text = "  ".to_string();
        assert_eq!(post.analysis_text(), "Solar farms are expanding fast in Spain");
    }

    #[test]
    fn source_serializes_with_platform_names() {
        assert_eq!(
            serde_json::to_string(&Source::Microblog).unwrap(),
            "\"twitter\""
        );
        assert_eq!(Source::Forum.to_string(), "reddit");
    }
}
