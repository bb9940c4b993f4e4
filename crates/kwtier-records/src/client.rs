//! REST client for the hosted keyword record store.
//!
//! The store exposes a PostgREST-style `keywords` table. A single analysis is
//! written with a filtered `PATCH`; a batch is written as one upserting `POST`.
//! Failures are returned to the caller without retry.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Serialize;

use crate::analysis::KeywordAnalysis;
use crate::error::RecordsError;

const KEYWORDS_PATH: &str = "rest/v1/keywords";

/// Client that records confirmed keyword analyses.
pub struct AnalysisRecorder {
    client: Client,
    keywords_url: Url,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct AnalysisUpdate<'a> {
    analysis: &'a KeywordAnalysis,
    intent: &'a str,
    confirmed: bool,
    updated_at: &'a str,
}

#[derive(Serialize)]
struct AnalysisRow<'a> {
    id: &'a str,
    #[serde(flatten)]
    update: AnalysisUpdate<'a>,
}

impl AnalysisRecorder {
    /// Creates a recorder for the store at `base_url`.
    ///
    /// When `api_key` is set it is sent as both the `apikey` header and a
    /// bearer token on every request.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::InvalidUrl`] if `base_url` does not parse, or
    /// [`RecordsError::Http`] if the `reqwest::Client` cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, RecordsError> {
        let joined = format!("{}/{KEYWORDS_PATH}", base_url.trim_end_matches('/'));
        let keywords_url = Url::parse(&joined).map_err(|e| RecordsError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            keywords_url,
            api_key,
        })
    }

    /// Stores `analysis` on the keyword record `keyword_id` and marks it
    /// confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::Http`] on network failure or
    /// [`RecordsError::Api`] if the store rejects the update.
    pub async fn save_analysis(
        &self,
        keyword_id: &str,
        analysis: &KeywordAnalysis,
    ) -> Result<(), RecordsError> {
        let updated_at = now_iso();
        let body = AnalysisUpdate {
            analysis,
            intent: analysis.intent(),
            confirmed: true,
            updated_at: &updated_at,
        };

        let mut url = self.keywords_url.clone();
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{keyword_id}"));

        let response = self.authorized(self.client.patch(url)).json(&body).send().await?;
        check_status(response).await?;

        tracing::info!(keyword_id, intent = analysis.intent(), "saved keyword analysis");
        Ok(())
    }

    /// Upserts every analysis in one request and returns the number of rows sent.
    ///
    /// An empty batch sends nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::Http`] on network failure or
    /// [`RecordsError::Api`] if the store rejects the batch. No row is
    /// reported as saved in either case.
    pub async fn batch_save_analysis(
        &self,
        analyses: &[(String, KeywordAnalysis)],
    ) -> Result<usize, RecordsError> {
        if analyses.is_empty() {
            tracing::debug!("no analyses to save");
            return Ok(0);
        }

        let updated_at = now_iso();
        let rows: Vec<AnalysisRow<'_>> = analyses
            .iter()
            .map(|(id, analysis)| AnalysisRow {
                id,
                update: AnalysisUpdate {
                    analysis,
                    intent: analysis.intent(),
                    confirmed: true,
                    updated_at: &updated_at,
                },
            })
            .collect();

        let response = self
            .authorized(self.client.post(self.keywords_url.clone()))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&rows)
            .send()
            .await?;
        check_status(response).await?;

        tracing::info!(count = rows.len(), "saved keyword analyses");
        Ok(rows.len())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }
}

async fn check_status(response: Response) -> Result<(), RecordsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    tracing::error!(status = status.as_u16(), body = %body, "record store rejected request");
    Err(RecordsError::Api {
        status: status.as_u16(),
        body,
    })
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
