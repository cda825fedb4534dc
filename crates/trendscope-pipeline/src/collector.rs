//! Multi-source collection: microblog keyword search plus forum search,
//! merged into one id-deduplicated, microblog-first list.
//!
//! Every post is filtered and normalized as soon as it is fetched, so the
//! collector hands back [`NormalizedPost`]s directly. Source failures are
//! logged and count as zero results for that slice; `collect` never fails.

use std::collections::HashSet;

use trendscope_core::{AppConfig, NormalizedPost, QualityThresholds, RawPost};

use crate::normalize::{normalize_text, to_working_language};
use crate::quality::is_low_quality;
use crate::sources::{forum_thread_to_raw, ForumSource, MicroblogSource};
use crate::translate::Translator;

/// Over-fetch factor for a single-query search, to leave room for spam.
const SINGLE_PASS_FETCH_FACTOR: usize = 5;
/// Over-fetch factor for each keyword search.
const KEYWORD_FETCH_FACTOR: usize = 2;

/// Limits applied while collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorSettings {
    pub quality: QualityThresholds,
    /// Forum searches per run (first N keywords).
    pub forum_query_limit: usize,
    pub forum_post_limit: usize,
    pub forum_comment_limit: usize,
}

impl CollectorSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            quality: config.quality,
            forum_query_limit: config.forum_query_limit,
            forum_post_limit: config.forum_post_limit,
            forum_comment_limit: config.forum_comment_limit,
        }
    }
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            quality: QualityThresholds::default(),
            forum_query_limit: 3,
            forum_post_limit: 25,
            forum_comment_limit: 30,
        }
    }
}

pub struct Collector<'a> {
    microblog: &'a dyn MicroblogSource,
    forum: Option<&'a dyn ForumSource>,
    translator: &'a dyn Translator,
    settings: CollectorSettings,
}

impl<'a> Collector<'a> {
    #[must_use]
    pub fn new(
        microblog: &'a dyn MicroblogSource,
        forum: Option<&'a dyn ForumSource>,
        translator: &'a dyn Translator,
        settings: CollectorSettings,
    ) -> Self {
        Self {
            microblog,
            forum,
            translator,
            settings,
        }
    }

    /// Collect up to `max_results` microblog posts, then the forum results.
    ///
    /// Without keywords (`None` or an empty list) the microblog is searched
    /// once with `query`. With keywords, `max_results` is split evenly across
    /// them and each keyword is searched in turn. No two returned posts share
    /// an id.
    pub async fn collect(
        &self,
        query: &str,
        max_results: usize,
        keywords: Option<&[String]>,
    ) -> Vec<NormalizedPost> {
        let keywords = keywords.filter(|k| !k.is_empty());
        let mut seen: HashSet<String> = HashSet::new();
        let mut posts: Vec<NormalizedPost> = Vec::new();

        match keywords {
            None => {
                let raws = self
                    .search_microblog(query, max_results.saturating_mul(SINGLE_PASS_FETCH_FACTOR))
                    .await;
                self.accept_batch(raws, query, max_results, max_results, &mut seen, &mut posts)
                    .await;
            }
            Some(keywords) => {
                let per_keyword = (max_results / keywords.len()).max(1);
                tracing::info!(
                    query,
                    keywords = keywords.len(),
                    per_keyword,
                    "collecting across keywords"
                );
                for keyword in keywords {
                    if posts.len() >= max_results {
                        break;
                    }
                    let raws = self
                        .search_microblog(keyword, per_keyword.saturating_mul(KEYWORD_FETCH_FACTOR))
                        .await;
                    self.accept_batch(raws, keyword, per_keyword, max_results, &mut seen, &mut posts)
                        .await;
                }
            }
        }
        let microblog_count = posts.len();

        if let Some(forum) = self.forum {
            let forum_queries: Vec<&str> = match keywords {
                Some(keywords) => keywords.iter().map(String::as_str).collect(),
                None => vec![query],
            };
            for forum_query in forum_queries.into_iter().take(self.settings.forum_query_limit) {
                self.collect_forum(forum, forum_query, &mut seen, &mut posts).await;
            }
        }

        tracing::info!(
            query,
            microblog = microblog_count,
            forum = posts.len() - microblog_count,
            "collection complete"
        );
        posts
    }

    async fn search_microblog(&self, keyword: &str, limit: usize) -> Vec<RawPost> {
        match self.microblog.search(keyword, limit).await {
            Ok(raws) => {
                tracing::debug!(keyword, fetched = raws.len(), "microblog search returned");
                raws
            }
            Err(e) => {
                tracing::warn!(keyword, source = "twitter", error = %e, "microblog search failed");
                Vec::new()
            }
        }
    }

    /// Filter and normalize one fetch batch into `out`.
    ///
    /// Accepts at most `batch_limit` posts from this batch and stops as soon
    /// as `out` holds `total_limit` posts. Ordinals count accepted posts only.
    async fn accept_batch(
        &self,
        raws: Vec<RawPost>,
        query: &str,
        batch_limit: usize,
        total_limit: usize,
        seen: &mut HashSet<String>,
        out: &mut Vec<NormalizedPost>,
    ) {
        let mut accepted = 0usize;
        for raw in raws {
            if accepted >= batch_limit || out.len() >= total_limit {
                break;
            }
            if seen.contains(&raw.id) {
                continue;
            }
            if is_low_quality(&raw.raw_text, &self.settings.quality) {
                continue;
            }
            seen.insert(raw.id.clone());
            out.push(self.normalize(raw, query, accepted).await);
            accepted += 1;
        }
    }

    async fn collect_forum(
        &self,
        forum: &dyn ForumSource,
        query: &str,
        seen: &mut HashSet<String>,
        out: &mut Vec<NormalizedPost>,
    ) {
        let threads = match forum
            .search(
                query,
                self.settings.forum_post_limit,
                self.settings.forum_comment_limit,
            )
            .await
        {
            Ok(threads) => threads,
            Err(e) => {
                tracing::warn!(query, source = "reddit", error = %e, "forum search failed");
                return;
            }
        };

        let mut accepted = 0usize;
        for thread in &threads {
            if seen.contains(&thread.id) {
                continue;
            }
            let raw = forum_thread_to_raw(thread);
            let post = self.normalize(raw, query, accepted).await;
            if post.cleaned_text.is_empty() {
                continue;
            }
            seen.insert(post.raw.id.clone());
            out.push(post);
            accepted += 1;
        }
        tracing::debug!(query, fetched = threads.len(), accepted, "forum search returned");
    }

    async fn normalize(&self, raw: RawPost, query: &str, ordinal_index: usize) -> NormalizedPost {
        let cleaned_text = normalize_text(&raw.raw_text);
        let translated_text = if cleaned_text.is_empty() {
            String::new()
        } else {
            to_working_language(self.translator, &cleaned_text).await
        };
        NormalizedPost {
            raw,
            cleaned_text,
            translated_text,
            query: query.to_string(),
            ordinal_index,
        }
    }
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
