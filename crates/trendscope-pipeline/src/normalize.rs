//! Post text cleanup and best-effort translation to English.
//!
//! Cleanup strips everything downstream NLP models should not see: emoji,
//! URLs, mentions, inline hashtags, and non-ASCII runs. Hashtags survive as
//! structured metadata on the raw post (see [`extract_hashtags`]).

use std::sync::LazyLock;

use regex::Regex;

use crate::translate::Translator;

/// Language every NLP stage expects.
pub const WORKING_LANGUAGE: &str = "en";

/// Texts shorter than this (trimmed, in chars) skip language detection.
const MIN_DETECTABLE_CHARS: usize = 3;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9+.\-]*://\S+").expect("valid regex"));
static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\w+").expect("valid regex"));
static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").expect("valid regex"));
static NON_ASCII_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\x00-\x7F]+").expect("valid regex"));
static UNSAFE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\s.,!?'\-]").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Clean raw post text for NLP.
///
/// Emoji are dropped outright, URLs / `@mentions` / `#hashtags` are removed,
/// remaining non-ASCII runs become a single space, punctuation outside
/// `.,!?'-` is removed, and whitespace is collapsed and trimmed.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    let text = strip_emoji(raw);
    let text = URL_RE.replace_all(&text, "");
    let text = MENTION_RE.replace_all(&text, "");
    let text = HASHTAG_RE.replace_all(&text, "");
    let text = NON_ASCII_RE.replace_all(&text, " ");
    let text = UNSAFE_CHARS_RE.replace_all(&text, "");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Hashtags in order of appearance, without the leading `#`, deduplicated.
#[must_use]
pub fn extract_hashtags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for m in HASHTAG_RE.find_iter(raw) {
        let tag = m.as_str().trim_start_matches('#').to_string();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// URLs embedded in the raw text, in order of appearance.
#[must_use]
pub fn extract_urls(raw: &str) -> Vec<String> {
    URL_RE.find_iter(raw).map(|m| m.as_str().to_string()).collect()
}

pub(crate) fn contains_url(raw: &str) -> bool {
    URL_RE.is_match(raw)
}

/// Translate `text` into [`WORKING_LANGUAGE`] when it is in another language.
///
/// Never fails: detection or translation errors are logged and the input is
/// returned unchanged.
pub async fn to_working_language(translator: &dyn Translator, text: &str) -> String {
    if text.trim().chars().count() < MIN_DETECTABLE_CHARS {
        return text.to_string();
    }

    let lang = match translator.detect(text).await {
        Ok(lang) => lang,
        Err(e) => {
            tracing::debug!(len = text.len(), error = %e, "language detection failed");
            return text.to_string();
        }
    };

    if lang.eq_ignore_ascii_case(WORKING_LANGUAGE) {
        return text.to_string();
    }

    match translator.translate(text, WORKING_LANGUAGE).await {
        Ok(translated) if !translated.trim().is_empty() => translated,
        Ok(_) => text.to_string(),
        Err(e) => {
            tracing::debug!(
                len = text.len(),
                detected = %lang,
                error = %e,
                "translation failed, keeping original text"
            );
            text.to_string()
        }
    }
}

fn strip_emoji(text: &str) -> String {
    text.chars().filter(|&c| !is_emoji(c)).collect()
}

/// Pictographic, dingbat, flag, and emoji-modifier code points.
fn is_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2B00..=0x2BFF
            | 0x2300..=0x23FF
            | 0xFE00..=0xFE0F
            | 0xE0020..=0xE007F
            | 0x200D
            | 0x20E3
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
            | 0x00A9
            | 0x00AE
            | 0x203C
            | 0x2049
            | 0x2122
            | 0x2139
    )
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
