use thiserror::Error;

/// Failure while delivering a payload to the webhook.
///
/// Carries the HTTP status and the decoded response body whenever they were
/// available at the point of failure.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DeliveryError {
    pub message: String,
    pub status_code: Option<u16>,
    pub response_body: Option<serde_json::Value>,
}

impl DeliveryError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            response_body: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Option<serde_json::Value>) -> Self {
        self.response_body = body;
        self
    }

    /// A response-shape violation. Always reported as status 400.
    pub(crate) fn invalid(field: &str) -> Self {
        Self::new(format!("Invalid response: {field}")).with_status(400)
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        Self {
            message: err.to_string(),
            status_code: status,
            response_body: None,
        }
    }
}
