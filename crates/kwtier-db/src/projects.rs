//! Project and tier storage.
//!
//! Each tier lives in its own `project_tiers` row keyed by project id and the
//! tier's slot key (`tier{N}Keywords`), so reading or replacing one tier never
//! touches any other project or tier. Writes are last-write-wins per tier.

use chrono::{DateTime, Utc};
use kwtier_core::{ensure_unique_ids, Context, Keyword, Project, Tier};
use serde::de::DeserializeOwned;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// Summary row from the `projects` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Creates a project with a generated id and no keywords.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_project(
    pool: &SqlitePool,
    name: &str,
    context: &Context,
) -> Result<ProjectRow, DbError> {
    let id = Uuid::new_v4().to_string();
    let context_json = encode(context, || format!("context of project {id}"))?;
    let now = Utc::now();

    let row = sqlx::query_as::<_, ProjectRow>(
        "INSERT INTO projects (id, name, context, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) \
         RETURNING id, name, created_at, updated_at",
    )
    .bind(&id)
    .bind(name)
    .bind(context_json)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    tracing::info!(project_id = %row.id, name, "created project");
    Ok(row)
}

/// Returns every project, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<ProjectRow>, DbError> {
    let rows = sqlx::query_as::<_, ProjectRow>(
        "SELECT id, name, created_at, updated_at FROM projects ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Loads a whole project with every stored tier under its slot key.
///
/// # Errors
///
/// - [`DbError::NotFound`] if no project has this id.
/// - [`DbError::Parse`] if the context or a tier column is corrupted.
/// - [`DbError::Sqlx`] if a query fails.
pub async fn get_project(pool: &SqlitePool, project_id: &str) -> Result<Project, DbError> {
    let (id, name, context_raw) = sqlx::query_as::<_, (String, String, String)>(
        "SELECT id, name, context FROM projects WHERE id = ?",
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(project_id))?;

    let context: Context = decode(&context_raw, || format!("context of project {project_id}"))?;

    let slots = sqlx::query_as::<_, (String, String)>(
        "SELECT slot_key, keywords FROM project_tiers WHERE project_id = ? ORDER BY slot_key",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    let mut data = serde_json::Map::with_capacity(slots.len());
    for (slot_key, raw) in slots {
        let value: serde_json::Value =
            decode(&raw, || format!("{slot_key} of project {project_id}"))?;
        data.insert(slot_key, value);
    }

    Ok(Project {
        id,
        name,
        context,
        data,
    })
}

/// Inserts or fully replaces a project and its tiers.
///
/// Tier slots not present in `project.data` are cleared. Keys in `data` that
/// are not tier slots are ignored. Returns the number of tiers written.
///
/// # Errors
///
/// - [`DbError::Parse`] if a tier slot is not a keyword array.
/// - [`DbError::Core`] if a tier contains duplicate keyword ids.
/// - [`DbError::Sqlx`] if a statement fails; nothing is written in that case.
pub async fn import_project(pool: &SqlitePool, project: &Project) -> Result<usize, DbError> {
    let mut tiers = Vec::new();
    for tier in Tier::ALL {
        let key = tier.storage_key();
        if !project.data.contains_key(&key) {
            continue;
        }
        let keywords = project
            .tier_keywords(tier)
            .map_err(|source| DbError::Parse {
                context: format!("{key} of imported project {}", project.id),
                source,
            })?;
        ensure_unique_ids(&keywords)?;
        let raw = encode(&keywords, || format!("{key} of project {}", project.id))?;
        tiers.push((key, raw));
    }

    for key in project.data.keys() {
        if !tiers.iter().any(|(k, _)| k == key) {
            tracing::debug!(project_id = %project.id, key = %key, "ignoring non-tier data key");
        }
    }

    let context_json = encode(&project.context, || {
        format!("context of project {}", project.id)
    })?;
    let now = Utc::now();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO projects (id, name, context, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT (id) DO UPDATE SET \
             name = excluded.name, \
             context = excluded.context, \
             updated_at = excluded.updated_at",
    )
    .bind(&project.id)
    .bind(&project.name)
    .bind(context_json)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM project_tiers WHERE project_id = ?")
        .bind(&project.id)
        .execute(&mut *tx)
        .await?;

    for (key, raw) in &tiers {
        upsert_slot(&mut tx, &project.id, key, raw, now).await?;
    }

    tx.commit().await?;

    tracing::info!(project_id = %project.id, tiers = tiers.len(), "imported project");
    Ok(tiers.len())
}

/// Deletes a project and all of its tiers. Returns `false` if it did not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_project(pool: &SqlitePool, project_id: &str) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Context and tiers
// ---------------------------------------------------------------------------

/// Returns the project's campaign context.
///
/// # Errors
///
/// - [`DbError::NotFound`] if no project has this id.
/// - [`DbError::Parse`] if the stored context is corrupted.
pub async fn load_context(pool: &SqlitePool, project_id: &str) -> Result<Context, DbError> {
    let raw = sqlx::query_scalar::<_, String>("SELECT context FROM projects WHERE id = ?")
        .bind(project_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(project_id))?;

    decode(&raw, || format!("context of project {project_id}"))
}

/// Returns the keywords stored for `tier`, in stored order.
///
/// A tier that was never written is empty.
///
/// # Errors
///
/// - [`DbError::NotFound`] if no project has this id.
/// - [`DbError::Parse`] if the stored tier is corrupted. Nothing is written back.
pub async fn load_tier(
    pool: &SqlitePool,
    project_id: &str,
    tier: Tier,
) -> Result<Vec<Keyword>, DbError> {
    let key = tier.storage_key();
    let (_, raw) = sqlx::query_as::<_, (String, Option<String>)>(
        "SELECT p.id, t.keywords \
         FROM projects p \
         LEFT JOIN project_tiers t ON t.project_id = p.id AND t.slot_key = ? \
         WHERE p.id = ?",
    )
    .bind(&key)
    .bind(project_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(project_id))?;

    match raw {
        None => Ok(Vec::new()),
        Some(raw) => decode(&raw, || format!("{key} of project {project_id}")),
    }
}

/// Replaces the keywords stored for `tier`.
///
/// The project is checked before anything is written, and the replacement is
/// a single transaction.
///
/// # Errors
///
/// - [`DbError::Core`] if `keywords` contains duplicate ids.
/// - [`DbError::NotFound`] if no project has this id.
/// - [`DbError::Sqlx`] if a statement fails.
pub async fn save_tier(
    pool: &SqlitePool,
    project_id: &str,
    tier: Tier,
    keywords: &[Keyword],
) -> Result<(), DbError> {
    ensure_unique_ids(keywords)?;
    let key = tier.storage_key();
    let raw = encode(keywords, || format!("{key} of project {project_id}"))?;
    let now = Utc::now();

    let mut tx = pool.begin().await?;

    if !project_exists(&mut tx, project_id).await? {
        return Err(not_found(project_id));
    }

    upsert_slot(&mut tx, project_id, &key, &raw, now).await?;

    sqlx::query("UPDATE projects SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(project_id, tier = %tier, keywords = keywords.len(), "saved tier");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn project_exists(conn: &mut SqliteConnection, project_id: &str) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE id = ?")
        .bind(project_id)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

async fn upsert_slot(
    conn: &mut SqliteConnection,
    project_id: &str,
    slot_key: &str,
    keywords_json: &str,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO project_tiers (project_id, slot_key, keywords, updated_at) \
         VALUES (?, ?, ?, ?) \
         ON CONFLICT (project_id, slot_key) DO UPDATE SET \
             keywords = excluded.keywords, \
             updated_at = excluded.updated_at",
    )
    .bind(project_id)
    .bind(slot_key)
    .bind(keywords_json)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

fn not_found(project_id: &str) -> DbError {
    DbError::NotFound {
        project_id: project_id.to_owned(),
    }
}

fn decode<T, F>(raw: &str, context: F) -> Result<T, DbError>
where
    T: DeserializeOwned,
    F: FnOnce() -> String,
{
    serde_json::from_str(raw).map_err(|source| DbError::Parse {
        context: context(),
        source,
    })
}

fn encode<T, F>(value: &T, context: F) -> Result<String, DbError>
where
    T: serde::Serialize + ?Sized,
    F: FnOnce() -> String,
{
    serde_json::to_string(value).map_err(|source| DbError::Encode {
        context: context(),
        source,
    })
}
