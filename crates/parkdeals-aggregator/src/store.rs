//! Narrow repository surface the pipeline persists through.
//!
//! Keeping the surface to resolve/upsert/record-health lets the pipeline run
//! against an in-memory fake in tests while production uses Postgres.

use async_trait::async_trait;
use sqlx::PgPool;

use parkdeals_core::DealCandidate;
use parkdeals_db::DbError;

/// Whether an upsert inserted a fresh deal or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealWrite {
    Inserted,
    Updated,
}

/// Persistence operations the aggregation run needs.
#[async_trait]
pub trait DealStore: Send + Sync {
    /// Resolves a registered source name to its id; `None` when unregistered.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the lookup itself fails.
    async fn resolve_source(&self, name: &str) -> Result<Option<i64>, DbError>;

    /// Inserts the candidate, or updates the existing deal with the same
    /// `source_url` in place.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the lookup or write fails.
    async fn upsert_deal(
        &self,
        source_id: i64,
        candidate: &DealCandidate,
    ) -> Result<DealWrite, DbError>;

    /// Stamps the source's health after a run (see
    /// [`parkdeals_db::record_source_run`]).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stamp fails or the source is unknown.
    async fn record_run(
        &self,
        name: &str,
        success: bool,
        error: Option<&str>,
    ) -> Result<(), DbError>;
}

/// Postgres-backed [`DealStore`].
pub struct PgDealStore {
    pool: PgPool,
}

impl PgDealStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DealStore for PgDealStore {
    async fn resolve_source(&self, name: &str) -> Result<Option<i64>, DbError> {
        let source = parkdeals_db::get_source_by_name(&self.pool, name).await?;
        Ok(source.map(|s| s.id))
    }

    // Lookup-then-write, no transaction: two overlapping runs can race on the
    // same source_url. The unique index turns the losing insert into a
    // per-item error the pipeline contains.
    async fn upsert_deal(
        &self,
        source_id: i64,
        candidate: &DealCandidate,
    ) -> Result<DealWrite, DbError> {
        match parkdeals_db::get_deal_by_source_url(&self.pool, &candidate.source_url).await? {
            Some(existing) => {
                parkdeals_db::update_deal(&self.pool, existing.id, source_id, candidate).await?;
                Ok(DealWrite::Updated)
            }
            None => {
                parkdeals_db::insert_deal(&self.pool, source_id, candidate).await?;
                Ok(DealWrite::Inserted)
            }
        }
    }

    async fn record_run(
        &self,
        name: &str,
        success: bool,
        error: Option<&str>,
    ) -> Result<(), DbError> {
        parkdeals_db::record_source_run(&self.pool, name, success, error).await
    }
}
