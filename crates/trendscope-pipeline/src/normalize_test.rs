use async_trait::async_trait;

use super::*;
use crate::error::PipelineError;

// -----------------------------------------------------------------------
// normalize_text
// -----------------------------------------------------------------------

#[test]
fn strips_mentions_hashtags_and_urls() {
    let raw = "@newsdesk Flooding downtown again #weather https://t.co/abc123 stay safe";
    let cleaned = normalize_text(raw);
    assert!(!cleaned.contains("@newsdesk"));
    assert!(!cleaned.contains("#weather"));
    assert!(!cleaned.contains("https://"));
    assert_eq!(cleaned, "Flooding downtown again stay safe");
}

#[test]
fn removes_emoji_without_leaving_gaps() {
    assert_eq!(normalize_text("Great game 🔥🔥 tonight"), "Great game tonight");
    assert_eq!(normalize_text("go🚀team"), "goteam");
}

#[test]
fn non_ascii_runs_become_single_space() {
    assert_eq!(normalize_text("price→high"), "price high");
    assert_eq!(normalize_text("price→über high"), "price ber high");
    assert_eq!(normalize_text("Lluvia en Málaga"), "Lluvia en M laga");
}

#[test]
fn restricts_punctuation_to_safe_set() {
    assert_eq!(
        normalize_text("Wait... what?! It's *really* (finally) done; ok-ish"),
        "Wait... what?! It's really finally done ok-ish"
    );
}

#[test]
fn underscores_are_not_kept() {
    assert_eq!(normalize_text("snake_case words"), "snakecase words");
}

#[test]
fn collapses_whitespace_and_trims() {
    assert_eq!(normalize_text("  lots\n\n of \t space  "), "lots of space");
}

#[test]
fn empty_input_yields_empty_output() {
    assert_eq!(normalize_text(""), "");
    assert_eq!(normalize_text("#only #tags @and @mentions"), "");
}

#[test]
fn non_http_schemes_are_removed() {
    assert_eq!(normalize_text("mirror at ftp://files.example.org/x now"), "mirror at now");
}

// -----------------------------------------------------------------------
// extraction helpers
// -----------------------------------------------------------------------

#[test]
fn extract_hashtags_dedupes_in_order() {
    let tags = extract_hashtags("#Rain in #Lahore, more #Rain tomorrow");
    assert_eq!(tags, vec!["Rain".to_string(), "Lahore".to_string()]);
}

#[test]
fn extract_urls_returns_all_links() {
    let urls = extract_urls("see https://a.example/1 and http://b.example/2");
    assert_eq!(urls, vec!["https://a.example/1", "http://b.example/2"]);
}

// -----------------------------------------------------------------------
// to_working_language
// -----------------------------------------------------------------------

struct FixedTranslator {
    detected: Result<&'static str, ()>,
    translated: Result<&'static str, ()>,
}

#[async_trait]
impl Translator for FixedTranslator {
    async fn detect(&self, _text: &str) -> Result<String, PipelineError> {
        self.detected
            .map(str::to_string)
            .map_err(|()| PipelineError::Translate("detector offline".to_string()))
    }

    async fn translate(&self, _text: &str, _target: &str) -> Result<String, PipelineError> {
        self.translated
            .map(str::to_string)
            .map_err(|()| PipelineError::Translate("rate limited".to_string()))
    }
}

#[tokio::test]
async fn english_text_is_returned_unchanged() {
    let translator = FixedTranslator {
        detected: Ok("en"),
        translated: Ok("SHOULD NOT BE USED"),
    };
    assert_eq!(
        to_working_language(&translator, "already english").await,
        "already english"
    );
}

#[tokio::test]
async fn foreign_text_is_translated() {
    let translator = FixedTranslator {
        detected: Ok("es"),
        translated: Ok("heavy rain in the city"),
    };
    assert_eq!(
        to_working_language(&translator, "lluvia fuerte en la ciudad").await,
        "heavy rain in the city"
    );
}

#[tokio::test]
async fn short_text_skips_detection() {
    let translator = FixedTranslator {
        detected: Err(()),
        translated: Err(()),
    };
    assert_eq!(to_working_language(&translator, "ok").await, "ok");
    assert_eq!(to_working_language(&translator, "").await, "");
}

#[tokio::test]
async fn detection_failure_falls_back_to_input() {
    let translator = FixedTranslator {
        detected: Err(()),
        translated: Ok("unused"),
    };
    assert_eq!(
        to_working_language(&translator, "texte en francais").await,
        "texte en francais"
    );
}

#[tokio::test]
async fn translation_failure_falls_back_to_input() {
    let translator = FixedTranslator {
        detected: Ok("fr"),
        translated: Err(()),
    };
    assert_eq!(
        to_working_language(&translator, "texte en francais").await,
        "texte en francais"
    );
}
