//! Reddit text cleanup and thread-to-post conversion.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use trendscope_core::{Engagement, RawPost, Source, SourceExtras};

use super::ForumThread;

/// Top-level comments folded into a forum post's text.
pub const MAX_FOLDED_COMMENTS: usize = 5;

static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid regex"));
static BARE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|www\S+").expect("valid regex"));
static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+").expect("valid regex"));
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

/// Strip links and line breaks from a Reddit title, body, or comment.
///
/// Markdown links keep their anchor text.
#[must_use]
pub fn clean_forum_text(text: &str) -> String {
    let text = MARKDOWN_LINK_RE.replace_all(text, "$1");
    let text = BARE_LINK_RE.replace_all(&text, "");
    let text = NEWLINES_RE.replace_all(&text, " ");
    SPACES_RE.replace_all(&text, " ").trim().to_string()
}

pub(super) fn is_removed(body: &str) -> bool {
    matches!(body.trim(), "" | "[deleted]" | "[removed]")
}

/// Convert a fetched thread into a [`RawPost`].
///
/// The post text is the title, the body, and up to [`MAX_FOLDED_COMMENTS`]
/// top-level comment bodies joined by spaces.
#[must_use]
pub fn forum_thread_to_raw(thread: &ForumThread) -> RawPost {
    let top_comments: Vec<&str> = thread
        .comments
        .iter()
        .filter(|c| c.is_top_level() && !is_removed(&c.body))
        .take(MAX_FOLDED_COMMENTS)
        .map(|c| c.body.as_str())
        .collect();

    let raw_text = [thread.title.as_str(), thread.body.as_str()]
        .into_iter()
        .chain(top_comments.iter().copied())
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let url = match thread.permalink.as_deref() {
        Some(permalink) if !permalink.is_empty() => format!("https://reddit.com{permalink}"),
        _ => format!("https://reddit.com/comments/{}", thread.id),
    };

    RawPost {
        id: thread.id.clone(),
        source: Source::Forum,
        raw_text,
        author_handle: thread.author.clone(),
        author_name: None,
        created_at: thread.created_utc.and_then(epoch_to_utc),
        engagement: Engagement {
            likes: u64::try_from(thread.score).unwrap_or(0),
            replies: thread.comments.len() as u64,
            ..Engagement::default()
        },
        url: Some(url),
        extras: SourceExtras::Forum {
            subreddit: thread.subreddit.clone(),
            score: thread.score,
            comment_count: top_comments.len(),
        },
    }
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_to_utc(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
}
