//! Project command handlers for the CLI.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Subcommand;
use kwtier_core::{Context, Project};
use sqlx::SqlitePool;

/// Sub-commands available under `project`.
#[derive(Debug, Subcommand)]
pub enum ProjectCommands {
    /// Create an empty project
    Create {
        /// Display name
        #[arg(long)]
        name: String,
        /// Conversion rate in percent (e.g. 2.5)
        #[arg(long, default_value_t = 0.0)]
        conversion_rate: f64,
        /// Average order value
        #[arg(long, default_value_t = 0.0)]
        average_order_value: f64,
        /// Locale tag (e.g. pt-PT)
        #[arg(long, default_value = "")]
        language: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        brand_name: Option<String>,
        #[arg(long)]
        business_context: Option<String>,
    },
    /// List all projects
    List,
    /// Print a project with all of its tiers as JSON
    Show {
        /// Project id
        id: String,
    },
    /// Import one project or an array of projects from a JSON export
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Delete a project and its tiers
    Delete {
        /// Project id
        id: String,
    },
}

pub(crate) async fn run(pool: &SqlitePool, command: ProjectCommands) -> anyhow::Result<()> {
    match command {
        ProjectCommands::Create {
            name,
            conversion_rate,
            average_order_value,
            language,
            category,
            brand_name,
            business_context,
        } => {
            let context = Context {
                conversion_rate,
                average_order_value,
                language,
                category,
                brand_name,
                business_context,
            };
            let row = kwtier_db::create_project(pool, &name, &context).await?;
            println!("created project {} ({})", row.id, row.name);
        }
        ProjectCommands::List => run_list(pool).await?,
        ProjectCommands::Show { id } => {
            let project = kwtier_db::get_project(pool, &id).await?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectCommands::Import { file } => run_import(pool, &file).await?,
        ProjectCommands::Delete { id } => {
            if kwtier_db::delete_project(pool, &id).await? {
                println!("deleted project {id}");
            } else {
                anyhow::bail!("project '{id}' not found");
            }
        }
    }
    Ok(())
}

async fn run_list(pool: &SqlitePool) -> anyhow::Result<()> {
    let projects = kwtier_db::list_projects(pool).await?;
    if projects.is_empty() {
        println!("no projects found; run `project create` or `project import` first");
        return Ok(());
    }

    println!("{:<38}{:<22}NAME", "ID", "UPDATED");
    for p in &projects {
        println!(
            "{:<38}{:<22}{}",
            p.id,
            p.updated_at.format("%Y-%m-%d %H:%M:%S"),
            p.name
        );
    }
    Ok(())
}

async fn run_import(pool: &SqlitePool, file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let projects = parse_export(&content)
        .with_context(|| format!("{} is not a project export", file.display()))?;

    for project in &projects {
        let tiers = kwtier_db::import_project(pool, project).await?;
        println!("imported project {} ({tiers} tier(s))", project.id);
    }
    Ok(())
}

/// Accepts either a single project object or the full array the browser
/// store kept.
fn parse_export(content: &str) -> Result<Vec<Project>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if value.is_array() {
        serde_json::from_value(value)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}
