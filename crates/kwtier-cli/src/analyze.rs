//! Analysis of selected tier keywords through the enrichment webhook.
//!
//! A [`TierSession`] holds one tier's keywords and the current selection.
//! [`TierSession::analyze_selected`] delivers the selected keywords, applies
//! the reply's suggestions to the keyword it addresses and saves the tier.
//! On failure the session keeps its previous suggestions and only the
//! in-flight flags are cleared.

use std::collections::HashSet;

use kwtier_core::{Context, Keyword, ProjectedMetrics, Tier};
use kwtier_db::DbError;
use kwtier_webhook::{DeliveryClient, DeliveryError, DeliveryPayload};
use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AnalyzeError {
    #[error("no keywords selected for analysis")]
    NothingSelected,

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("failed to save analyzed tier: {0}")]
    Persist(#[from] DbError),
}

/// Result of one successful analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnalyzeOutcome {
    /// Keyword id the webhook reply addressed.
    pub addressed_id: String,
    /// Whether the addressed keyword was selected and received suggestions.
    pub updated: bool,
    pub suggestion_count: usize,
}

/// One project tier loaded for analysis.
#[derive(Debug)]
pub(crate) struct TierSession {
    project_id: String,
    tier: Tier,
    keywords: Vec<Keyword>,
    selected: HashSet<String>,
    is_analyzing: bool,
    analyzed_count: usize,
}

impl TierSession {
    pub(crate) fn new(project_id: impl Into<String>, tier: Tier, keywords: Vec<Keyword>) -> Self {
        Self {
            project_id: project_id.into(),
            tier,
            keywords,
            selected: HashSet::new(),
            is_analyzing: false,
            analyzed_count: 0,
        }
    }

    /// Loads `tier` of `project_id` with an empty selection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the project is missing or the tier is corrupted.
    pub(crate) async fn load(
        pool: &SqlitePool,
        project_id: &str,
        tier: Tier,
    ) -> Result<Self, DbError> {
        let keywords = kwtier_db::load_tier(pool, project_id, tier).await?;
        Ok(Self::new(project_id, tier, keywords))
    }

    /// Adds `keyword_id` to the selection. Returns `false` if the tier has no
    /// keyword with that id.
    pub(crate) fn select(&mut self, keyword_id: &str) -> bool {
        if self.keywords.iter().any(|k| k.id == keyword_id) {
            self.selected.insert(keyword_id.to_owned());
            true
        } else {
            false
        }
    }

    pub(crate) fn select_all(&mut self) {
        self.selected = self.keywords.iter().map(|k| k.id.clone()).collect();
    }

    pub(crate) fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub(crate) fn is_analyzing(&self) -> bool {
        self.is_analyzing
    }

    pub(crate) fn analyzed_count(&self) -> usize {
        self.analyzed_count
    }

    /// Sends the selected keywords to the webhook and saves the tier.
    ///
    /// Only the keyword whose id matches the reply's `ID` and is selected
    /// receives suggestions. Whatever the outcome, every analyzing flag is
    /// cleared and the session leaves the analyzing state.
    ///
    /// # Errors
    ///
    /// - [`AnalyzeError::NothingSelected`] if the selection is empty; the
    ///   session is left untouched.
    /// - [`AnalyzeError::Delivery`] if every delivery attempt failed.
    /// - [`AnalyzeError::Persist`] if the tier could not be saved.
    pub(crate) async fn analyze_selected(
        &mut self,
        client: &DeliveryClient,
        pool: &SqlitePool,
        context: &Context,
    ) -> Result<AnalyzeOutcome, AnalyzeError> {
        if self.selected.is_empty() {
            tracing::warn!(project_id = %self.project_id, tier = %self.tier, "no keywords selected");
            return Err(AnalyzeError::NothingSelected);
        }

        self.is_analyzing = true;
        self.analyzed_count = 0;
        for kw in self
            .keywords
            .iter_mut()
            .filter(|k| self.selected.contains(&k.id))
        {
            kw.is_analyzing = true;
            ProjectedMetrics::project(kw.volume, context).apply_to(kw);
        }

        tracing::info!(
            project_id = %self.project_id,
            tier = %self.tier,
            selected = self.selected.len(),
            "analyzing keywords"
        );

        let result = self.deliver_and_save(client, pool, context).await;

        for kw in &mut self.keywords {
            kw.is_analyzing = false;
        }
        self.is_analyzing = false;
        self.analyzed_count = 0;

        match result {
            Ok((keywords, outcome)) => {
                self.keywords = keywords;
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(
                    project_id = %self.project_id,
                    tier = %self.tier,
                    error = %e,
                    "keyword analysis failed"
                );
                Err(e)
            }
        }
    }

    /// Delivers the selection and persists the merged tier. The merged keywords
    /// are only handed back once the save succeeded.
    async fn deliver_and_save(
        &mut self,
        client: &DeliveryClient,
        pool: &SqlitePool,
        context: &Context,
    ) -> Result<(Vec<Keyword>, AnalyzeOutcome), AnalyzeError> {
        let payload = DeliveryPayload::build(
            self.keywords
                .iter()
                .filter(|k| self.selected.contains(&k.id)),
            context,
        );
        let response = client.send(&payload).await?;
        let suggestions = response.suggestions();

        let mut merged = self.keywords.clone();
        let mut updated = false;
        for kw in &mut merged {
            kw.is_analyzing = false;
            if kw.id == response.id && self.selected.contains(&kw.id) {
                kw.auto_suggestions = Some(suggestions.clone());
                updated = true;
                self.analyzed_count += 1;
            }
        }

        tracing::debug!(analyzed = self.analyzed_count, "applied webhook suggestions");
        if !updated {
            tracing::warn!(
                addressed_id = %response.id,
                "webhook reply addressed a keyword outside the selection"
            );
        }

        kwtier_db::save_tier(pool, &self.project_id, self.tier, &merged).await?;

        Ok((
            merged,
            AnalyzeOutcome {
                addressed_id: response.id,
                updated,
                suggestion_count: suggestions.len(),
            },
        ))
    }
}

/// Runs `analyze` for the CLI: selects keywords, delivers them and prints the
/// outcome.
///
/// # Errors
///
/// Returns an error if an id is not in the tier, the project cannot be loaded,
/// or the analysis fails.
pub(crate) async fn run_analyze(
    pool: &SqlitePool,
    config: &kwtier_core::AppConfig,
    project_id: &str,
    tier: Tier,
    keyword_ids: &[String],
    all: bool,
) -> anyhow::Result<()> {
    let context = kwtier_db::load_context(pool, project_id).await?;
    let mut session = TierSession::load(pool, project_id, tier).await?;

    if all {
        session.select_all();
    } else {
        for id in keyword_ids {
            if !session.select(id) {
                anyhow::bail!("keyword '{id}' is not in tier {tier} of project {project_id}");
            }
        }
    }

    let client = DeliveryClient::with_endpoint(
        &config.webhook_url,
        config.webhook_timeout_secs,
        config.webhook_max_attempts,
        config.webhook_retry_delay_ms,
    )
    .map_err(|e| anyhow::anyhow!("failed to build webhook client: {e}"))?;

    let outcome = session.analyze_selected(&client, pool, &context).await?;
    tracing::debug!(
        analyzing = session.is_analyzing(),
        analyzed_count = session.analyzed_count(),
        keywords = session.keywords().len(),
        "analysis session idle"
    );

    if outcome.updated {
        println!(
            "keyword {} received {} suggestion(s)",
            outcome.addressed_id, outcome.suggestion_count
        );
    } else {
        println!(
            "webhook addressed keyword {} which was not selected; tier saved without suggestions",
            outcome.addressed_id
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "analyze_test.rs"]
mod tests;
