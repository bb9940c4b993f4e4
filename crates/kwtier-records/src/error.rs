use thiserror::Error;

/// Errors returned by the hosted record store client.
#[derive(Debug, Error)]
pub enum RecordsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The record store answered with a non-2xx status.
    #[error("record store returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The analysis document does not carry a search intent.
    #[error("invalid analysis: {0}")]
    InvalidAnalysis(String),

    #[error("invalid record store URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
