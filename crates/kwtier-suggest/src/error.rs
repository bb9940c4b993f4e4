use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} for query \"{query}\"")]
    UnexpectedStatus { status: u16, query: String },

    #[error("JSON deserialization error for query \"{query}\": {source}")]
    Deserialize {
        query: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid suggestion endpoint \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
