use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use parkdeals_core::DealCandidate;
use parkdeals_db::DbError;

use super::*;
use crate::error::AggregatorError;
use crate::extract::ExtractionRules;
use crate::sources::allears;
use crate::store::DealWrite;
use crate::types::RawCandidate;

// ---------------------------------------------------------------------------
// In-memory store fake
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
struct SourceHealth {
    error_count: i32,
    last_error: Option<String>,
    last_checked_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct MemoryDealStore {
    sources: HashMap<String, i64>,
    /// Keyed by `source_url`, mirroring the unique index.
    deals: Mutex<HashMap<String, (i64, DealCandidate)>>,
    health: Mutex<HashMap<String, SourceHealth>>,
    fail_urls: HashSet<String>,
}

impl MemoryDealStore {
    fn with_source(name: &str, id: i64) -> Self {
        Self {
            sources: HashMap::from([(name.to_owned(), id)]),
            ..Self::default()
        }
    }

    fn deal_count(&self) -> usize {
        self.deals.lock().unwrap().len()
    }

    fn health_for(&self, name: &str) -> SourceHealth {
        self.health.lock().unwrap().get(name).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl DealStore for MemoryDealStore {
    async fn resolve_source(&self, name: &str) -> Result<Option<i64>, DbError> {
        Ok(self.sources.get(name).copied())
    }

    async fn upsert_deal(
        &self,
        source_id: i64,
        candidate: &DealCandidate,
    ) -> Result<DealWrite, DbError> {
        if self.fail_urls.contains(&candidate.source_url) {
            return Err(DbError::NotFound);
        }
        let mut deals = self.deals.lock().unwrap();
        let write = if deals.contains_key(&candidate.source_url) {
            DealWrite::Updated
        } else {
            DealWrite::Inserted
        };
        deals.insert(candidate.source_url.clone(), (source_id, candidate.clone()));
        Ok(write)
    }

    async fn record_run(
        &self,
        name: &str,
        success: bool,
        error: Option<&str>,
    ) -> Result<(), DbError> {
        let mut health = self.health.lock().unwrap();
        let entry = health.entry(name.to_owned()).or_default();
        entry.last_checked_at = Some(Utc::now());
        if success {
            entry.error_count = 0;
            entry.last_error = None;
        } else {
            entry.error_count += 1;
            entry.last_error = Some(error.unwrap_or("unknown error").to_owned());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Source fake
// ---------------------------------------------------------------------------

struct StaticSource {
    name: &'static str,
    /// `None` simulates a terminal fetch failure.
    items: Option<Vec<RawCandidate>>,
}

#[async_trait]
impl CandidateSource for StaticSource {
    fn name(&self) -> &str {
        self.name
    }

    fn rules(&self) -> &ExtractionRules {
        &allears::RULES
    }

    async fn fetch_candidates(
        &self,
        _client: &HttpClient,
    ) -> Result<Vec<RawCandidate>, AggregatorError> {
        match &self.items {
            Some(items) => Ok(items.clone()),
            None => Err(AggregatorError::UnexpectedStatus {
                status: 500,
                url: "https://example.com/feed".to_owned(),
            }),
        }
    }
}

fn deal_item(title: &str, url: &str) -> RawCandidate {
    RawCandidate {
        title: title.to_owned(),
        body: "Savings on select stays.".to_owned(),
        url: url.to_owned(),
        score: None,
        comment_count: None,
    }
}

fn client() -> HttpClient {
    HttpClient::new(5).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_runs_update_in_place() {
    let store = MemoryDealStore::with_source("Test Source", 1);
    let source = StaticSource {
        name: "Test Source",
        items: Some(vec![deal_item(
            "Special offer on deluxe resorts",
            "https://example.com/deal-1",
        )]),
    };
    let client = client();

    let first = run_source(&store, &client, &source).await;
    let second = run_source(&store, &client, &source).await;

    assert!(first.success && second.success);
    assert_eq!(first.persisted, 1);
    assert_eq!(second.persisted, 1);
    // Identical input twice: still exactly one record for the URL.
    assert_eq!(store.deal_count(), 1);
}

#[tokio::test]
async fn fetch_failure_is_contained_and_stamped() {
    let store = MemoryDealStore::with_source("Test Source", 1);
    let failing = StaticSource {
        name: "Test Source",
        items: None,
    };
    let client = client();

    let report = run_source(&store, &client, &failing).await;

    assert!(!report.success);
    assert_eq!(report.deals_found, 0);
    let message = report.error.expect("failed run carries a message");
    assert!(message.contains("500"), "message: {message}");

    let health = store.health_for("Test Source");
    assert_eq!(health.error_count, 1);
    assert!(health.last_error.is_some());
    assert!(health.last_checked_at.is_some());
}

#[tokio::test]
async fn success_resets_the_error_counter() {
    let store = MemoryDealStore::with_source("Test Source", 1);
    let failing = StaticSource {
        name: "Test Source",
        items: None,
    };
    let healthy = StaticSource {
        name: "Test Source",
        items: Some(vec![]),
    };
    let client = client();

    run_source(&store, &client, &failing).await;
    run_source(&store, &client, &failing).await;
    assert_eq!(store.health_for("Test Source").error_count, 2);

    let report = run_source(&store, &client, &healthy).await;
    assert!(report.success);

    let health = store.health_for("Test Source");
    assert_eq!(health.error_count, 0);
    assert!(health.last_error.is_none());
    assert!(health.last_checked_at.is_some());
}

#[tokio::test]
async fn unregistered_source_skips_persistence_but_not_health() {
    let store = MemoryDealStore::default();
    let source = StaticSource {
        name: "Unknown Source",
        items: Some(vec![deal_item(
            "Special offer on deluxe resorts",
            "https://example.com/deal-1",
        )]),
    };
    let client = client();

    let report = run_source(&store, &client, &source).await;

    assert!(report.success);
    assert_eq!(report.deals_found, 1);
    assert_eq!(report.persisted, 0);
    assert_eq!(store.deal_count(), 0);
    assert_eq!(store.health_for("Unknown Source").error_count, 0);
    assert!(store.health_for("Unknown Source").last_checked_at.is_some());
}

#[tokio::test]
async fn per_item_store_failures_do_not_abort_the_run() {
    let mut store = MemoryDealStore::with_source("Test Source", 1);
    store
        .fail_urls
        .insert("https://example.com/poison".to_owned());
    let source = StaticSource {
        name: "Test Source",
        items: Some(vec![
            deal_item("Special offer on deluxe resorts", "https://example.com/poison"),
            deal_item("Another big deal on packages", "https://example.com/deal-2"),
        ]),
    };
    let client = client();

    let report = run_source(&store, &client, &source).await;

    assert!(report.success);
    assert_eq!(report.deals_found, 2);
    assert_eq!(report.persisted, 1);
    assert_eq!(store.deal_count(), 1);
}

#[tokio::test]
async fn one_failing_source_does_not_block_the_next() {
    let store = MemoryDealStore::with_source("Second Source", 2);
    let sources: Vec<Box<dyn CandidateSource>> = vec![
        Box::new(StaticSource {
            name: "First Source",
            items: None,
        }),
        Box::new(StaticSource {
            name: "Second Source",
            items: Some(vec![deal_item(
                "Special offer on deluxe resorts",
                "https://example.com/deal-1",
            )]),
        }),
    ];
    let client = client();

    let reports = run_all(&store, &client, &sources).await;

    assert_eq!(reports.len(), 2);
    assert!(!reports[0].success);
    assert!(reports[1].success);
    assert_eq!(reports[1].persisted, 1);
    assert_eq!(store.deal_count(), 1);
}
