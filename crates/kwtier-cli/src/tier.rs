//! Tier command handlers for the CLI.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Subcommand;
use kwtier_core::{Keyword, Tier};
use sqlx::SqlitePool;

/// Sub-commands available under `tier`.
#[derive(Debug, Subcommand)]
pub enum TierCommands {
    /// Print the keywords of a tier
    Show {
        /// Project id
        #[arg(long)]
        project: String,
        /// Tier number (1-5)
        #[arg(long, value_parser = crate::parse_tier)]
        tier: Tier,
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Replace the keywords of a tier with a JSON array from a file
    Replace {
        /// Project id
        #[arg(long)]
        project: String,
        /// Tier number (1-5)
        #[arg(long, value_parser = crate::parse_tier)]
        tier: Tier,
        /// Path to a JSON array of keywords
        file: PathBuf,
    },
}

pub(crate) async fn run(pool: &SqlitePool, command: TierCommands) -> anyhow::Result<()> {
    match command {
        TierCommands::Show {
            project,
            tier,
            json,
        } => {
            let keywords = kwtier_db::load_tier(pool, &project, tier).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&keywords)?);
            } else {
                print_table(tier, &keywords);
            }
        }
        TierCommands::Replace {
            project,
            tier,
            file,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let keywords: Vec<Keyword> = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a keyword array", file.display()))?;
            kwtier_db::save_tier(pool, &project, tier, &keywords).await?;
            println!("saved {} keyword(s) to tier {tier}", keywords.len());
        }
    }
    Ok(())
}

fn print_table(tier: Tier, keywords: &[Keyword]) {
    if keywords.is_empty() {
        println!("tier {tier} is empty");
        return;
    }

    println!(
        "{:<14}{:<32}{:>8}{:>6}{:>9}{:>9}",
        "ID", "KEYWORD", "VOLUME", "KD", "TRAFFIC", "SUGGEST"
    );
    for kw in keywords {
        let traffic = kw
            .potential_traffic
            .map_or_else(|| "-".to_string(), |t| t.to_string());
        let suggestions = kw.auto_suggestions.as_ref().map_or(0, Vec::len);
        println!(
            "{:<14}{:<32}{:>8}{:>6.1}{:>9}{:>9}",
            kw.id, kw.keyword, kw.volume, kw.difficulty, traffic, suggestions
        );
    }
}
