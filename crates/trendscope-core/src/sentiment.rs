//! Canonical sentiment labels and model-label normalization.

use serde::{Deserialize, Serialize};

/// A sentiment label after normalizing the classifier's vocabulary.
///
/// `Unknown` keeps the model's original label so it can be inspected later;
/// aggregation treats it as [`SentimentLabel::Neutral`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Unknown(String),
}

impl SentimentLabel {
    /// The three canonical labels in display order.
    pub const CANONICAL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    /// Map any classifier label to a [`SentimentLabel`].
    ///
    /// The 3-class numeric scheme (`LABEL_0`/`LABEL_1`/`LABEL_2`, or bare
    /// `0`/`1`/`2`) maps to negative/neutral/positive. Named labels match
    /// case-insensitively. Everything else becomes `Unknown` with the input
    /// preserved verbatim.
    #[must_use]
    pub fn from_model_label(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "LABEL_0" | "0" | "NEGATIVE" => SentimentLabel::Negative,
            "LABEL_1" | "1" | "NEUTRAL" => SentimentLabel::Neutral,
            "LABEL_2" | "2" | "POSITIVE" => SentimentLabel::Positive,
            _ => SentimentLabel::Unknown(raw.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
            SentimentLabel::Unknown(raw) => raw,
        }
    }

    /// The canonical bucket this label aggregates into.
    #[must_use]
    pub fn bucket(&self) -> SentimentLabel {
        match self {
            SentimentLabel::Unknown(_) => SentimentLabel::Neutral,
            canonical => canonical.clone(),
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SentimentLabel {
    fn from(raw: String) -> Self {
        SentimentLabel::from_model_label(&raw)
    }
}

impl From<SentimentLabel> for String {
    fn from(label: SentimentLabel) -> Self {
        label.as_str().to_string()
    }
}
