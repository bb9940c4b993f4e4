//! Record store command handlers for the CLI.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Subcommand;
use kwtier_records::{AnalysisRecorder, KeywordAnalysis};
use serde::Deserialize;

/// Sub-commands available under `record`.
#[derive(Debug, Subcommand)]
pub enum RecordCommands {
    /// Save one analysis document onto a keyword record
    Save {
        /// Keyword record id
        #[arg(long)]
        keyword: String,
        /// Path to the analysis JSON document
        file: PathBuf,
    },
    /// Upsert many analyses from a JSON array of `{ "keywordId", "analysis" }`
    Batch {
        /// Path to the JSON array
        file: PathBuf,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchEntry {
    keyword_id: String,
    analysis: KeywordAnalysis,
}

pub(crate) async fn run(
    config: &kwtier_core::AppConfig,
    command: RecordCommands,
) -> anyhow::Result<()> {
    let base_url = config
        .records_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("KWTIER_RECORDS_URL is not set; cannot record analyses"))?;
    let recorder = AnalysisRecorder::new(
        base_url,
        config.records_api_key.clone(),
        config.webhook_timeout_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build record store client: {e}"))?;

    match command {
        RecordCommands::Save { keyword, file } => {
            let analysis: KeywordAnalysis = read_json(&file)?;
            recorder.save_analysis(&keyword, &analysis).await?;
            println!("saved {} analysis for keyword {keyword}", analysis.intent());
        }
        RecordCommands::Batch { file } => {
            let entries: Vec<BatchEntry> = read_json(&file)?;
            let analyses: Vec<(String, KeywordAnalysis)> = entries
                .into_iter()
                .map(|e| (e.keyword_id, e.analysis))
                .collect();
            let saved = recorder.batch_save_analysis(&analyses).await?;
            println!("{saved} analyses saved");
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(file: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", file.display()))
}
