//! Shared data model and configuration for the trendscope workspace.
//!
//! Post records flow one way through the pipeline:
//! [`RawPost`] → [`NormalizedPost`] → [`EnrichedPost`] → [`ReadableRecord`].
//! Every stage builds a new value; nothing is updated in place.

pub mod app_config;
pub mod config;
pub mod posts;
pub mod sentiment;

pub use app_config::{AppConfig, QualityThresholds};
pub use config::{load_app_config, load_app_config_from_env};
pub use posts::{
    Engagement, EnrichedPost, Entity, NormalizedPost, RawPost, ReadableRecord, Source,
    SourceExtras,
};
pub use sentiment::SentimentLabel;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
