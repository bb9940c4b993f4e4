//! HTTP client for the keyword enrichment webhook.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::DeliveryError;
use crate::retry::retry_linear;
use crate::types::{DeliveryPayload, DeliveryResponse};
use crate::validate::validate_response;

pub const DEFAULT_WEBHOOK_URL: &str =
    "https://hook.integrator.boost.space/0w7dejdvm21p78a4lf4wdjkfi8dlvk25";

/// Client that posts analysis batches to the enrichment webhook.
///
/// Use [`DeliveryClient::new`] for the production endpoint or
/// [`DeliveryClient::with_endpoint`] to point at a mock server in tests.
pub struct DeliveryClient {
    client: Client,
    endpoint: Url,
    /// Total attempts per [`DeliveryClient::send`], including the first.
    max_attempts: u32,
    /// Base wait for linear back-off: `retry_delay_ms * attempt`.
    retry_delay_ms: u64,
}

impl DeliveryClient {
    /// Creates a client pointed at the production webhook.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(
        timeout_secs: u64,
        max_attempts: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, DeliveryError> {
        Self::with_endpoint(DEFAULT_WEBHOOK_URL, timeout_secs, max_attempts, retry_delay_ms)
    }

    /// Creates a client with a custom endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if `endpoint` is not a valid URL or the
    /// underlying `reqwest::Client` cannot be constructed.
    pub fn with_endpoint(
        endpoint: &str,
        timeout_secs: u64,
        max_attempts: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, DeliveryError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| DeliveryError::new(format!("invalid webhook URL '{endpoint}': {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("kwtier/0.1 (keyword-analysis)")
            .build()?;

        Ok(Self {
            client,
            endpoint,
            max_attempts: max_attempts.max(1),
            retry_delay_ms,
        })
    }

    /// Posts `payload` and returns the validated reply.
    ///
    /// Any failure (network, unparseable body, non-2xx status, invalid shape)
    /// is retried after `retry_delay_ms * attempt` until the attempt ceiling
    /// is reached.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] naming the attempt count and carrying the
    /// last attempt's status and body once every attempt has failed.
    pub async fn send(&self, payload: &DeliveryPayload) -> Result<DeliveryResponse, DeliveryError> {
        tracing::debug!(
            keywords = payload.keywords.len(),
            max_attempts = self.max_attempts,
            "sending keyword batch to webhook"
        );
        retry_linear(self.max_attempts, self.retry_delay_ms, |attempt| {
            self.attempt(attempt, payload)
        })
        .await
    }

    async fn attempt(
        &self,
        attempt: u32,
        payload: &DeliveryPayload,
    ) -> Result<DeliveryResponse, DeliveryError> {
        tracing::info!(attempt, "sending webhook attempt");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let data: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            tracing::debug!(attempt, error = %e, "webhook body is not JSON");
            DeliveryError::new("Failed to parse response as JSON").with_status(status.as_u16())
        })?;

        tracing::debug!(attempt, status = status.as_u16(), body = %data, "webhook response");

        if !status.is_success() {
            return Err(DeliveryError::new(format!(
                "Server responded with {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            ))
            .with_status(status.as_u16())
            .with_body(Some(data)));
        }

        validate_response(&data)
    }
}
