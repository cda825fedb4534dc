use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Twitter source error: {0}")]
    Twitter(String),

    #[error("Reddit API error: {0}")]
    Reddit(String),

    #[error("sentiment classifier error: {0}")]
    Classifier(String),

    #[error("translation error: {0}")]
    Translate(String),

    #[error("keyword generation error: {0}")]
    KeywordGen(String),
}
