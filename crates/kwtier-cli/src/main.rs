mod analyze;
mod project;
mod record;
mod suggest;
mod tier;

use clap::{Parser, Subcommand};
use kwtier_core::Tier;
use tracing_subscriber::EnvFilter;

use crate::project::ProjectCommands;
use crate::record::RecordCommands;
use crate::tier::TierCommands;

#[derive(Debug, Parser)]
#[command(name = "kwtier")]
#[command(about = "Keyword tier analysis command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Inspect or replace the keywords of one tier
    Tier {
        #[command(subcommand)]
        command: TierCommands,
    },
    /// Send selected keywords of a tier to the enrichment webhook
    Analyze {
        /// Project id
        #[arg(long)]
        project: String,
        /// Tier number (1-5)
        #[arg(long, value_parser = parse_tier)]
        tier: Tier,
        /// Keyword id to analyze (repeatable)
        #[arg(long = "keyword", required_unless_present = "all")]
        keywords: Vec<String>,
        /// Analyze every keyword in the tier
        #[arg(long, conflicts_with = "keywords")]
        all: bool,
    },
    /// Fetch search suggestions for the keywords of a tier
    Suggest {
        /// Project id
        #[arg(long)]
        project: String,
        /// Tier number (1-5)
        #[arg(long, value_parser = parse_tier)]
        tier: Tier,
        /// Keyword id to look up (repeatable; defaults to the whole tier)
        #[arg(long = "keyword")]
        keywords: Vec<String>,
        /// Locale tag overriding the project language (e.g. pt-PT)
        #[arg(long)]
        locale: Option<String>,
        /// Print the suggestions without saving them
        #[arg(long)]
        dry_run: bool,
    },
    /// Store confirmed keyword analyses in the hosted record store
    Record {
        #[command(subcommand)]
        command: RecordCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check that the database is reachable
    Ping,
}

fn parse_tier(raw: &str) -> Result<Tier, String> {
    let n: u8 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a tier number"))?;
    Tier::new(n).map_err(|e| e.to_string())
}

async fn open_pool(config: &kwtier_core::AppConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool_config = kwtier_db::PoolConfig::from_app_config(config);
    Ok(kwtier_db::connect_pool(&config.database_url, pool_config).await?)
}

async fn open_migrated_pool(config: &kwtier_core::AppConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool = open_pool(config).await?;
    kwtier_db::run_migrations(&pool).await?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = kwtier_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, "configuration loaded");

    let Some(command) = cli.command else {
        println!("kwtier ready; run `kwtier --help` for commands");
        return Ok(());
    };

    match command {
        Commands::Db { command } => {
            let pool = open_pool(&config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = kwtier_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
                DbCommands::Ping => {
                    kwtier_db::ping(&pool).await?;
                    println!("database reachable");
                }
            }
        }
        Commands::Project { command } => {
            let pool = open_migrated_pool(&config).await?;
            project::run(&pool, command).await?;
        }
        Commands::Tier { command } => {
            let pool = open_migrated_pool(&config).await?;
            tier::run(&pool, command).await?;
        }
        Commands::Analyze {
            project,
            tier,
            keywords,
            all,
        } => {
            let pool = open_migrated_pool(&config).await?;
            analyze::run_analyze(&pool, &config, &project, tier, &keywords, all).await?;
        }
        Commands::Suggest {
            project,
            tier,
            keywords,
            locale,
            dry_run,
        } => {
            let pool = open_migrated_pool(&config).await?;
            suggest::run_suggest(
                &pool,
                &config,
                &project,
                tier,
                &keywords,
                locale.as_deref(),
                dry_run,
            )
            .await?;
        }
        // The record store is remote; no local database is opened.
        Commands::Record { command } => record::run(&config, command).await?,
    }

    Ok(())
}
