//! Database operations for the `deals` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use parkdeals_core::DealCandidate;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `deals` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DealRow {
    pub id: i64,
    pub public_id: Uuid,
    pub source_id: i64,
    pub title: String,
    pub description: String,
    pub deal_type: String,
    pub discount_percentage: Option<i32>,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub travel_valid_from: NaiveDate,
    pub travel_valid_to: NaiveDate,
    pub source_url: String,
    pub deal_code: Option<String>,
    pub is_active: bool,
    pub priority: i32,
    pub blackout_dates: Vec<NaiveDate>,
    pub ticket_required: bool,
    pub dining_plan_included: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const DEAL_COLUMNS: &str = "id, public_id, source_id, title, description, deal_type, \
     discount_percentage, valid_from, valid_to, travel_valid_from, travel_valid_to, \
     source_url, deal_code, is_active, priority, blackout_dates, ticket_required, \
     dining_plan_included, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the deal with the given canonical source URL, or `None`.
///
/// `source_url` is the natural key aggregation deduplicates on.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_deal_by_source_url(
    pool: &PgPool,
    source_url: &str,
) -> Result<Option<DealRow>, DbError> {
    let row = sqlx::query_as::<_, DealRow>(&format!(
        "SELECT {DEAL_COLUMNS} FROM deals WHERE source_url = $1"
    ))
    .bind(source_url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a new deal from an extracted candidate.
///
/// Operational fields take their fresh-deal defaults: active, priority 0, no
/// blackout dates, no ticket requirement, and `dining_plan_included` set iff
/// the deal type is free dining. Returns the full inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a unique-key
/// violation on `source_url` when a concurrent run won the insert).
pub async fn insert_deal(
    pool: &PgPool,
    source_id: i64,
    candidate: &DealCandidate,
) -> Result<DealRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, DealRow>(&format!(
        "INSERT INTO deals \
             (public_id, source_id, title, description, deal_type, discount_percentage, \
              valid_from, valid_to, travel_valid_from, travel_valid_to, source_url, deal_code, \
              is_active, priority, blackout_dates, ticket_required, dining_plan_included) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
                 true, 0, '{{}}', false, $13) \
         RETURNING {DEAL_COLUMNS}"
    ))
    .bind(public_id)
    .bind(source_id)
    .bind(&candidate.title)
    .bind(&candidate.description)
    .bind(candidate.deal_type.as_str())
    .bind(candidate.discount_percentage)
    .bind(candidate.valid_from)
    .bind(candidate.valid_to)
    .bind(candidate.travel_valid_from)
    .bind(candidate.travel_valid_to)
    .bind(&candidate.source_url)
    .bind(candidate.deal_code.as_deref())
    .bind(candidate.deal_type.includes_dining_plan())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Overwrites all candidate-derived fields of an existing deal.
///
/// Operational fields (`is_active`, `priority`, blackout dates, flags) are
/// left untouched; only `updated_at` moves.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no deal with the given `id` exists, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_deal(
    pool: &PgPool,
    id: i64,
    source_id: i64,
    candidate: &DealCandidate,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE deals \
         SET source_id = $2, title = $3, description = $4, deal_type = $5, \
             discount_percentage = $6, valid_from = $7, valid_to = $8, \
             travel_valid_from = $9, travel_valid_to = $10, source_url = $11, \
             deal_code = $12, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(source_id)
    .bind(&candidate.title)
    .bind(&candidate.description)
    .bind(candidate.deal_type.as_str())
    .bind(candidate.discount_percentage)
    .bind(candidate.valid_from)
    .bind(candidate.valid_to)
    .bind(candidate.travel_valid_from)
    .bind(candidate.travel_valid_to)
    .bind(&candidate.source_url)
    .bind(candidate.deal_code.as_deref())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
