//! HTTP client for the third-party search-suggestion endpoint.
//!
//! Lookups never fail from the caller's point of view: any error is logged and
//! turned into an empty suggestion list. Batches run strictly one request at a
//! time with a fixed pause between requests to stay under the endpoint's
//! rate limit.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::SuggestError;
use crate::locale::split_locale;

pub const DEFAULT_SUGGEST_URL: &str = "https://suggestqueries.google.com/complete/search";

/// Client for single and batched keyword suggestion lookups.
pub struct SuggestClient {
    client: Client,
    base_url: Url,
}

impl SuggestClient {
    /// Creates a client pointed at the public suggestion endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SuggestError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, SuggestError> {
        Self::with_base_url(DEFAULT_SUGGEST_URL, timeout_secs, user_agent)
    }

    /// Creates a client with a custom endpoint (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SuggestError::InvalidUrl`] if `base_url` does not parse, or
    /// [`SuggestError::Http`] if the `reqwest::Client` cannot be constructed.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SuggestError> {
        let parsed = Url::parse(base_url).map_err(|e| SuggestError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Returns suggestions for one keyword, or an empty list on any failure.
    pub async fn fetch_one(&self, keyword: &str, locale: &str) -> Vec<String> {
        match self.try_fetch(keyword, locale).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::warn!(keyword, locale, error = %e, "suggestion lookup failed");
                Vec::new()
            }
        }
    }

    /// Looks up every keyword in order, one request at a time.
    ///
    /// `inter_request_delay_ms` is slept between consecutive requests whatever
    /// each request's latency was. A failed lookup maps to an empty list and
    /// the batch carries on. Repeated keywords keep the last result.
    pub async fn fetch_batch(
        &self,
        keywords: &[&str],
        locale: &str,
        inter_request_delay_ms: u64,
    ) -> HashMap<String, Vec<String>> {
        let mut results = HashMap::with_capacity(keywords.len());

        for (i, keyword) in keywords.iter().enumerate() {
            if i > 0 && inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
            }
            let suggestions = self.fetch_one(keyword, locale).await;
            tracing::debug!(keyword, count = suggestions.len(), "fetched suggestions");
            results.insert((*keyword).to_owned(), suggestions);
        }

        results
    }

    async fn try_fetch(&self, keyword: &str, locale: &str) -> Result<Vec<String>, SuggestError> {
        let url = self.build_url(keyword, locale);
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SuggestError::UnexpectedStatus {
                status: status.as_u16(),
                query: keyword.to_owned(),
            });
        }

        let body = response.text().await?;
        let parsed: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| SuggestError::Deserialize {
                query: keyword.to_owned(),
                source: e,
            })?;

        Ok(extract_suggestions(&parsed))
    }

    /// Builds the lookup URL with `client`, `hl`, `gl` and `q` query parameters.
    fn build_url(&self, keyword: &str, locale: &str) -> Url {
        let (language, region) = split_locale(locale);
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("client", "firefox");
            pairs.append_pair("hl", language);
            if let Some(region) = region {
                pairs.append_pair("gl", region);
            }
            pairs.append_pair("q", keyword);
        }
        url
    }
}

/// Pulls the suggestion array out of an `[echoedQuery, [suggestions...]]` reply.
///
/// Anything that does not have that shape yields an empty list; non-string
/// entries are skipped.
fn extract_suggestions(body: &serde_json::Value) -> Vec<String> {
    body.get(1)
        .and_then(serde_json::Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(serde_json::Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
