//! Construction of the injectable pipeline services from [`AppConfig`].
//!
//! Everything here is built once per process and handed to the collector
//! and enrichment engine by reference.

use std::sync::Arc;

use anyhow::Context;
use trendscope_core::AppConfig;
use trendscope_pipeline::{
    build_http_client, BirdClient, Collector, CollectorSettings, Enricher, ForumSource,
    KeywordGenerator, LexiconClassifier, LibreTranslateClient, OllamaKeywordGenerator,
    PassthroughTranslator, RedditClient, RetryPolicy, RuleBasedNlp, SentimentClassifier,
    TeiClassifier, Translator,
};

const USER_AGENT: &str = concat!("trendscope/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for every service.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub(crate) fn http_client(config: &AppConfig) -> anyhow::Result<reqwest::Client> {
    build_http_client(config.request_timeout_secs, USER_AGENT)
        .context("failed to build HTTP client")
}

/// Content sources, translator, and keyword generator used by `scrape`.
pub(crate) struct Sources {
    microblog: BirdClient,
    forum: Option<RedditClient>,
    translator: Box<dyn Translator>,
    keyword_generator: Option<OllamaKeywordGenerator>,
    settings: CollectorSettings,
}

impl Sources {
    /// Build every source. A forum whose token exchange fails is logged and
    /// skipped rather than failing the run.
    pub(crate) async fn build(config: &AppConfig, client: &reqwest::Client) -> Self {
        let retry = RetryPolicy::from_config(config);

        let credentials = config
            .twitter_auth_token
            .clone()
            .zip(config.twitter_ct0.clone());
        let microblog = BirdClient::new(&config.bird_bin, credentials);

        let forum = match config.reddit_credentials() {
            Some((id, secret)) => {
                match RedditClient::connect(
                    client.clone(),
                    id,
                    secret,
                    &config.reddit_user_agent,
                    retry,
                )
                .await
                {
                    Ok(reddit) => Some(reddit),
                    Err(e) => {
                        tracing::warn!(error = %e, "forum source unavailable, continuing without it");
                        None
                    }
                }
            }
            None => {
                tracing::info!("reddit credentials not configured, forum source disabled");
                None
            }
        };

        let translator: Box<dyn Translator> = match &config.translate_url {
            Some(url) => Box::new(LibreTranslateClient::new(
                client.clone(),
                url,
                config.translate_api_key.clone(),
                retry,
            )),
            None => Box::new(PassthroughTranslator),
        };

        let keyword_generator = config.ollama_url.as_deref().map(|url| {
            OllamaKeywordGenerator::new(client.clone(), url, &config.ollama_model, retry)
        });

        Self {
            microblog,
            forum,
            translator,
            keyword_generator,
            settings: CollectorSettings::from_config(config),
        }
    }

    pub(crate) fn collector(&self) -> Collector<'_> {
        Collector::new(
            &self.microblog,
            self.forum.as_ref().map(|f| f as &dyn ForumSource),
            self.translator.as_ref(),
            self.settings,
        )
    }

    pub(crate) fn keyword_generator(&self) -> Option<&dyn KeywordGenerator> {
        self.keyword_generator
            .as_ref()
            .map(|g| g as &dyn KeywordGenerator)
    }
}

/// Enrichment engine with the configured sentiment backend.
pub(crate) fn build_enricher(config: &AppConfig, client: &reqwest::Client) -> Enricher {
    let classifier: Arc<dyn SentimentClassifier> = match &config.classifier_url {
        Some(url) => Arc::new(TeiClassifier::new(
            client.clone(),
            url,
            RetryPolicy::from_config(config),
        )),
        None => {
            tracing::info!("no classifier endpoint configured, using lexicon sentiment");
            Arc::new(LexiconClassifier)
        }
    };
    let nlp = Arc::new(RuleBasedNlp);
    Enricher::new(nlp.clone(), nlp, classifier)
}
