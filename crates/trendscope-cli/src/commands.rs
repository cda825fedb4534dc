//! Handlers for the `scrape`, `analyze`, and `run` subcommands.

use std::path::{Path, PathBuf};

use trendscope_core::{AppConfig, EnrichedPost, NormalizedPost, ReadableRecord, SentimentLabel};
use trendscope_pipeline::{bucket_by_sentiment, plan_keywords, Report};

use crate::output::{self, ReportFile, Stage};
use crate::services::{build_enricher, http_client, Sources};

/// Rows shown in the keyword and entity tables.
const TOP_N: usize = 10;

/// Options shared by `scrape` and `run`.
#[derive(Debug, Clone)]
pub(crate) struct ScrapeOptions {
    pub max_results: usize,
    pub use_keywords: bool,
}

/// Collect posts for `query` and save them to the raw file.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the raw file
/// cannot be written. Source failures only reduce the post count.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    query: &str,
    options: &ScrapeOptions,
) -> anyhow::Result<Vec<NormalizedPost>> {
    let client = http_client(config)?;
    let sources = Sources::build(config, &client).await;

    let keywords = if options.use_keywords {
        Some(plan_keywords(sources.keyword_generator(), query, config.max_keywords).await)
    } else {
        None
    };

    let posts = sources
        .collector()
        .collect(query, options.max_results, keywords.as_deref())
        .await;

    if posts.is_empty() {
        println!("no posts collected for '{query}'");
        return Ok(posts);
    }

    let path = output::save_posts(&config.output_dir, query, Stage::Raw, &posts)?;
    println!("collected {} posts -> {}", posts.len(), path.display());
    Ok(posts)
}

/// Enrich posts from a saved raw file and write the processed records and
/// report.
///
/// `input` defaults to the raw file `scrape` writes for `query`.
///
/// # Errors
///
/// Returns an error if the raw file cannot be read or the outputs cannot be
/// written.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    query: &str,
    input: Option<&Path>,
) -> anyhow::Result<()> {
    let path: PathBuf = input.map_or_else(
        || output::posts_path(&config.output_dir, query, Stage::Raw),
        Path::to_path_buf,
    );
    let posts = output::load_raw_posts(&path)?;
    tracing::info!(path = %path.display(), count = posts.len(), "loaded raw posts");

    analyze_posts(config, query, posts).await
}

/// `scrape` followed by `analyze` on the collected posts.
///
/// # Errors
///
/// Returns an error if either stage fails.
pub(crate) async fn run_all(
    config: &AppConfig,
    query: &str,
    options: &ScrapeOptions,
) -> anyhow::Result<()> {
    let posts = run_scrape(config, query, options).await?;
    if posts.is_empty() {
        return Ok(());
    }
    analyze_posts(config, query, posts).await
}

async fn analyze_posts(
    config: &AppConfig,
    query: &str,
    posts: Vec<NormalizedPost>,
) -> anyhow::Result<()> {
    if posts.is_empty() {
        println!("no posts to analyze for '{query}'");
        return Ok(());
    }

    let client = http_client(config)?;
    let enricher = build_enricher(config, &client);
    let enriched = enricher
        .enrich(
            posts,
            config.sentiment_batch_size,
            config.sentiment_concurrency,
        )
        .await;

    let records: Vec<ReadableRecord> = enriched.iter().map(EnrichedPost::to_readable).collect();
    let processed = output::save_posts(&config.output_dir, query, Stage::Processed, &records)?;

    let report = ReportFile {
        report: Report::build(query, &enriched, TOP_N),
        buckets: bucket_by_sentiment(&enriched),
    };
    let report_path = output::save_report(&config.output_dir, query, &report)?;

    print_report(&report.report);
    println!();
    println!("processed -> {}", processed.display());
    println!("report    -> {}", report_path.display());
    Ok(())
}

fn print_report(report: &Report) {
    println!(
        "query '{}' at {}: {} posts ({} microblog, {} forum), mean score {:.3}",
        report.query,
        report.generated_at.format("%Y-%m-%d %H:%M"),
        report.total_posts,
        report.microblog_posts,
        report.forum_posts,
        report.mean_score
    );
    println!();

    println!("{:<12}COUNT", "SENTIMENT");
    for label in &SentimentLabel::CANONICAL {
        println!("{:<12}{}", label.as_str(), report.sentiment.get(label));
    }

    if !report.top_keywords.is_empty() {
        println!();
        println!("{:<32}COUNT", "KEYWORD");
        for keyword in &report.top_keywords {
            println!("{:<32}{}", keyword.keyword, keyword.count);
        }
    }

    if !report.top_entities.is_empty() {
        println!();
        println!("{:<32}{:<10}COUNT", "ENTITY", "LABEL");
        for entity in &report.top_entities {
            println!("{:<32}{:<10}{}", entity.text, entity.label, entity.count);
        }
    }
}
