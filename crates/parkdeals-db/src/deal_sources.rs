//! Database operations for the `deal_sources` table, including the per-run
//! health stamp.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `deal_sources` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DealSourceRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub source_type: String,
    pub is_active: bool,
    /// The schema defines this as `INTEGER NOT NULL DEFAULT 0`.
    pub error_count: i32,
    pub last_error: Option<String>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

const SOURCE_COLUMNS: &str = "id, public_id, name, source_type, is_active, error_count, \
     last_error, last_checked_at, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the registered source with the given name, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_source_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<DealSourceRow>, DbError> {
    let row = sqlx::query_as::<_, DealSourceRow>(&format!(
        "SELECT {SOURCE_COLUMNS} FROM deal_sources WHERE name = $1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all registered sources, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sources(pool: &PgPool) -> Result<Vec<DealSourceRow>, DbError> {
    let rows = sqlx::query_as::<_, DealSourceRow>(&format!(
        "SELECT {SOURCE_COLUMNS} FROM deal_sources ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Stamps a source after an aggregation run.
///
/// `last_checked_at` is set to now regardless of outcome. On success the
/// error counter resets to zero and `last_error` clears; on failure the
/// counter increments by one and `last_error` records the provided message
/// (or a generic fallback when none is given).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no source with the given name exists, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn record_source_run(
    pool: &PgPool,
    name: &str,
    success: bool,
    error: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE deal_sources \
         SET last_checked_at = NOW(), \
             error_count = CASE WHEN $2 THEN 0 ELSE error_count + 1 END, \
             last_error  = CASE WHEN $2 THEN NULL \
                                ELSE COALESCE($3, 'unknown error') END \
         WHERE name = $1",
    )
    .bind(name)
    .bind(success)
    .bind(error)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
