//! Suggestion lookup for the keywords of one tier.
//!
//! Lookups run one at a time with the configured pause between requests. A
//! keyword whose lookup came back empty keeps whatever suggestions it had.

use std::collections::{HashMap, HashSet};

use kwtier_core::{Keyword, Tier};
use kwtier_suggest::SuggestClient;
use sqlx::SqlitePool;

/// Replaces the suggestions of every keyword in `keyword_ids` that has a
/// non-empty lookup result. Returns how many keywords changed.
fn apply_suggestions(
    keywords: &mut [Keyword],
    keyword_ids: &HashSet<String>,
    results: &HashMap<String, Vec<String>>,
) -> usize {
    let mut applied = 0;
    for kw in keywords
        .iter_mut()
        .filter(|k| keyword_ids.contains(k.id.as_str()))
    {
        match results.get(&kw.keyword) {
            Some(found) if !found.is_empty() => {
                kw.auto_suggestions = Some(found.clone());
                applied += 1;
            }
            _ => {}
        }
    }
    applied
}

/// Fetch suggestions for the selected keywords of a tier and save them.
///
/// With no `keyword_ids` every keyword in the tier is looked up. The locale
/// defaults to the project's language.
///
/// When `dry_run` is `true` the suggestions are printed and nothing is saved.
///
/// # Errors
///
/// Returns an error if the project or tier cannot be loaded, an id is not in
/// the tier, or the tier cannot be saved. Individual lookup failures are
/// logged and skipped, not propagated.
pub(crate) async fn run_suggest(
    pool: &SqlitePool,
    config: &kwtier_core::AppConfig,
    project_id: &str,
    tier: Tier,
    keyword_ids: &[String],
    locale: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let context = kwtier_db::load_context(pool, project_id).await?;
    let mut keywords = kwtier_db::load_tier(pool, project_id, tier).await?;

    let ids: HashSet<String> = if keyword_ids.is_empty() {
        keywords.iter().map(|k| k.id.clone()).collect()
    } else {
        for id in keyword_ids {
            if !keywords.iter().any(|k| &k.id == id) {
                anyhow::bail!("keyword '{id}' is not in tier {tier} of project {project_id}");
            }
        }
        keyword_ids.iter().cloned().collect()
    };

    if ids.is_empty() {
        println!("tier {tier} is empty; nothing to look up");
        return Ok(());
    }

    let locale = locale.unwrap_or(&context.language);
    let queries: Vec<&str> = keywords
        .iter()
        .filter(|k| ids.contains(k.id.as_str()))
        .map(|k| k.keyword.as_str())
        .collect();

    let client = SuggestClient::with_base_url(
        &config.suggest_url,
        config.suggest_timeout_secs,
        &config.suggest_user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build suggestion client: {e}"))?;

    tracing::info!(project_id, tier = %tier, count = queries.len(), locale, "fetching suggestions");
    let results = client
        .fetch_batch(&queries, locale, config.suggest_inter_request_delay_ms)
        .await;

    if dry_run {
        for query in &queries {
            let found = results.get(*query).map_or(&[][..], Vec::as_slice);
            println!("{query}: {}", found.join(", "));
        }
        return Ok(());
    }

    let applied = apply_suggestions(&mut keywords, &ids, &results);
    kwtier_db::save_tier(pool, project_id, tier, &keywords).await?;

    println!(
        "updated suggestions for {applied} of {} keyword(s) in tier {tier}",
        ids.len()
    );
    Ok(())
}
