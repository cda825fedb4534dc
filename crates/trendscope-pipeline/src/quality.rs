//! Spam and low-signal post filter.
//!
//! Checks run against the raw, uncleaned text: hashtag and link counts must
//! be measured before normalization strips them.

use std::sync::LazyLock;

use regex::Regex;
use trendscope_core::QualityThresholds;

use crate::normalize::{contains_url, normalize_text};

static PURE_HASHTAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:#\w+\s*)+$").expect("valid regex"));

/// Returns `true` when a post carries too little signal to keep.
///
/// A post is rejected if any of these hold:
/// - cleaned text is shorter than `min_clean_chars`
/// - more than `max_hashtags` `#` characters
/// - the trimmed text is nothing but hashtags
/// - it contains a link and has fewer than `link_min_tokens` tokens
/// - it starts with the `rt ` share marker
#[must_use]
pub fn is_low_quality(raw: &str, thresholds: &QualityThresholds) -> bool {
    if normalize_text(raw).chars().count() < thresholds.min_clean_chars {
        return true;
    }
    if raw.matches('#').count() > thresholds.max_hashtags {
        return true;
    }

    let trimmed = raw.trim();
    if PURE_HASHTAGS_RE.is_match(trimmed) {
        return true;
    }
    if contains_url(raw) && raw.split_whitespace().count() < thresholds.link_min_tokens {
        return true;
    }
    trimmed.to_lowercase().starts_with("rt ")
}
