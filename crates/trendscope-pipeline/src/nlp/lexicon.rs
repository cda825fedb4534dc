//! Offline word-weight sentiment classifier.
//!
//! Emits the same `LABEL_0` / `LABEL_1` / `LABEL_2` vocabulary as the
//! three-class transformer models, so downstream label normalization is
//! identical whichever classifier is configured.

use async_trait::async_trait;

use super::{RawSentiment, SentimentClassifier};
use crate::error::PipelineError;

/// General-purpose word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative.
const LEXICON: &[(&str, f64)] = &[
    // Positive
    ("amazing", 0.6),
    ("awesome", 0.6),
    ("beautiful", 0.5),
    ("best", 0.5),
    ("better", 0.3),
    ("brilliant", 0.6),
    ("calm", 0.2),
    ("celebrate", 0.5),
    ("congratulations", 0.6),
    ("excellent", 0.6),
    ("excited", 0.5),
    ("fantastic", 0.6),
    ("glad", 0.4),
    ("good", 0.3),
    ("great", 0.4),
    ("happy", 0.5),
    ("helpful", 0.4),
    ("hope", 0.3),
    ("impressive", 0.5),
    ("improve", 0.3),
    ("improved", 0.3),
    ("love", 0.5),
    ("loved", 0.5),
    ("nice", 0.3),
    ("peaceful", 0.4),
    ("perfect", 0.6),
    ("proud", 0.5),
    ("recover", 0.3),
    ("relief", 0.4),
    ("safe", 0.3),
    ("success", 0.5),
    ("support", 0.3),
    ("thank", 0.4),
    ("thanks", 0.4),
    ("win", 0.4),
    ("wonderful", 0.6),
    // Negative
    ("angry", -0.5),
    ("awful", -0.6),
    ("bad", -0.4),
    ("broken", -0.4),
    ("chaos", -0.5),
    ("crisis", -0.5),
    ("damage", -0.4),
    ("dead", -0.6),
    ("death", -0.6),
    ("destroyed", -0.6),
    ("disappointed", -0.5),
    ("disaster", -0.6),
    ("fail", -0.4),
    ("failed", -0.4),
    ("fear", -0.4),
    ("flood", -0.3),
    ("flooded", -0.4),
    ("hate", -0.6),
    ("horrible", -0.6),
    ("hurt", -0.4),
    ("killed", -0.7),
    ("loss", -0.4),
    ("poor", -0.3),
    ("problem", -0.3),
    ("sad", -0.5),
    ("scam", -0.6),
    ("terrible", -0.6),
    ("tragic", -0.6),
    ("ugly", -0.4),
    ("unsafe", -0.5),
    ("worse", -0.4),
    ("worst", -0.6),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "isnt", "wasnt", "dont", "doesnt", "didnt", "cant", "wont", "aint",
    "hardly", "without",
];

/// Tokens after a negator whose polarity is flipped.
const NEGATION_WINDOW: usize = 3;

/// Polarity band treated as neutral.
const NEUTRAL_BAND: f64 = 0.05;

/// Net polarity of `text` in `[-1.0, 1.0]`.
///
/// Sums lexicon weights over lowercase words, flipping the sign of any word
/// within three tokens after a negator. Returns `0.0` for empty or unknown
/// text.
#[must_use]
pub fn lexicon_polarity(text: &str) -> f64 {
    let mut score = 0.0_f64;
    let mut negated_for = 0usize;

    for word in text.split_whitespace() {
        let w: String = word
            .chars()
            .filter(|c| c.is_alphabetic())
            .collect::<String>()
            .to_lowercase();
        if w.is_empty() {
            continue;
        }
        if NEGATORS.contains(&w.as_str()) {
            negated_for = NEGATION_WINDOW;
            continue;
        }
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex, _)| *lex == w) {
            score += if negated_for > 0 { -weight } else { weight };
        }
        negated_for = negated_for.saturating_sub(1);
    }
    score.clamp(-1.0, 1.0)
}

/// Map a polarity onto the three-class label scheme with a confidence.
fn verdict(polarity: f64) -> RawSentiment {
    if polarity > NEUTRAL_BAND {
        RawSentiment {
            label: "LABEL_2".to_string(),
            score: 0.5 + polarity / 2.0,
        }
    } else if polarity < -NEUTRAL_BAND {
        RawSentiment {
            label: "LABEL_0".to_string(),
            score: 0.5 + polarity.abs() / 2.0,
        }
    } else {
        RawSentiment {
            label: "LABEL_1".to_string(),
            score: 1.0 - polarity.abs(),
        }
    }
}

/// Sentiment classifier that needs no model server.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, batch: &[String]) -> Result<Vec<RawSentiment>, PipelineError> {
        Ok(batch.iter().map(|text| verdict(lexicon_polarity(text))).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_unknown_text_is_zero() {
        assert!(lexicon_polarity("").abs() < f64::EPSILON);
        assert!(lexicon_polarity("the quick brown fox").abs() < f64::EPSILON);
    }

    #[test]
    fn positive_and_negative_words() {
        assert!(lexicon_polarity("what a great game") > 0.0);
        assert!(lexicon_polarity("roads flooded, total chaos") < 0.0);
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        assert!(lexicon_polarity("GREAT!!!") > 0.0);
    }

    #[test]
    fn negation_flips_following_words() {
        assert!(lexicon_polarity("this is not good") < 0.0);
        assert!(lexicon_polarity("don't hate it") > 0.0);
    }

    #[test]
    fn negation_window_expires() {
        // Third token after "not" is still flipped; the fourth is not.
        assert!(lexicon_polarity("not at all good") < 0.0);
        assert!(lexicon_polarity("not at all that good") > 0.0);
    }

    #[test]
    fn polarity_is_clamped() {
        let text = "amazing awesome brilliant excellent fantastic perfect wonderful";
        assert!((lexicon_polarity(text) - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn classifies_into_three_class_labels() {
        let batch = vec![
            "great news, so happy".to_string(),
            "the meeting is at noon".to_string(),
            "terrible awful day".to_string(),
        ];
        let verdicts = LexiconClassifier.classify(&batch).await.unwrap();
        let labels: Vec<&str> = verdicts.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["LABEL_2", "LABEL_1", "LABEL_0"]);
        assert!(verdicts.iter().all(|v| (0.0..=1.0).contains(&v.score)));
        assert!((verdicts[1].score - 1.0).abs() < f64::EPSILON);
    }
}
