//! JSON persistence for collected posts, processed records, and reports.
//!
//! Layout under the configured output directory:
//! `raw/<query>_raw.json`, `processed/<query>_processed.json` and
//! `processed/<query>_report.json`, where `<query>` is [`sanitize_filename`]
//! applied to the search query.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use trendscope_core::NormalizedPost;
use trendscope_pipeline::{Report, SentimentBuckets};

/// Used when a query contains nothing that survives sanitization.
const FALLBACK_STEM: &str = "query";

/// Pipeline stage a saved post file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Raw,
    Processed,
}

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Processed => "processed",
        }
    }
}

/// Report file contents: the summary plus post texts grouped by sentiment.
#[derive(Debug, Serialize)]
pub(crate) struct ReportFile {
    #[serde(flatten)]
    pub report: Report,
    pub buckets: SentimentBuckets,
}

/// Replace anything outside `[A-Za-z0-9_\- ]` with `_`, then trim.
pub(crate) fn sanitize_filename(query: &str) -> String {
    let cleaned: String = query
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn posts_path(output_dir: &Path, query: &str, stage: Stage) -> PathBuf {
    let name = stage.name();
    output_dir
        .join(name)
        .join(format!("{}_{name}.json", sanitize_filename(query)))
}

pub(crate) fn report_path(output_dir: &Path, query: &str) -> PathBuf {
    output_dir
        .join(Stage::Processed.name())
        .join(format!("{}_report.json", sanitize_filename(query)))
}

/// Write `posts` as pretty JSON to the stage file for `query`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written.
pub(crate) fn save_posts<T: Serialize>(
    output_dir: &Path,
    query: &str,
    stage: Stage,
    posts: &[T],
) -> anyhow::Result<PathBuf> {
    let path = posts_path(output_dir, query, stage);
    write_json(&path, &posts)?;
    tracing::info!(path = %path.display(), count = posts.len(), "saved posts");
    Ok(path)
}

/// # Errors
///
/// Returns an error if the report cannot be written.
pub(crate) fn save_report(
    output_dir: &Path,
    query: &str,
    report: &ReportFile,
) -> anyhow::Result<PathBuf> {
    let path = report_path(output_dir, query);
    write_json(&path, report)?;
    tracing::info!(path = %path.display(), "saved report");
    Ok(path)
}

/// Load a raw post file written by `save_posts`.
///
/// # Errors
///
/// Returns an error if the file is missing or is not a JSON array of posts.
pub(crate) fn load_raw_posts(path: &Path) -> anyhow::Result<Vec<NormalizedPost>> {
    read_json(path)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("failed to parse {}", path.display()))
}
