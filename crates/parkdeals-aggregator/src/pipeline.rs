//! Per-source aggregation run orchestration.

use chrono::Utc;

use parkdeals_core::DealCandidate;

use crate::client::HttpClient;
use crate::extract::{extract_candidate, passes_inclusion};
use crate::sources::CandidateSource;
use crate::store::DealStore;
use crate::types::RunReport;

/// Runs one source's aggregation pass: fetch → filter/extract → persist →
/// health stamp.
///
/// Never returns an error. A fetch/parse failure is terminal for the run and
/// reported through the returned [`RunReport`] (and the source's health
/// record); per-item persistence failures are logged and the remaining items
/// still get their chance. Health-stamp failures are logged and swallowed.
pub async fn run_source(
    store: &dyn DealStore,
    client: &HttpClient,
    source: &dyn CandidateSource,
) -> RunReport {
    let name = source.name();
    tracing::info!(source = name, "starting aggregation run");

    let raw_items = match source.fetch_candidates(client).await {
        Ok(items) => items,
        Err(e) => {
            let message = e.to_string();
            tracing::error!(source = name, error = %message, "aggregation run failed");
            record_run_best_effort(store, name, false, Some(&message)).await;
            return RunReport {
                source: name.to_owned(),
                success: false,
                deals_found: 0,
                persisted: 0,
                error: Some(message),
            };
        }
    };

    let today = Utc::now().date_naive();
    let rules = source.rules();
    let scanned = raw_items.len();

    let candidates: Vec<DealCandidate> = raw_items
        .iter()
        .filter(|item| passes_inclusion(rules, item))
        .map(|item| extract_candidate(rules, item, today))
        .collect();

    tracing::info!(
        source = name,
        scanned,
        matched = candidates.len(),
        "extracted deal candidates"
    );

    let mut persisted = 0;
    match store.resolve_source(name).await {
        Ok(Some(source_id)) => {
            for candidate in &candidates {
                match store.upsert_deal(source_id, candidate).await {
                    Ok(write) => {
                        persisted += 1;
                        tracing::debug!(
                            source = name,
                            url = %candidate.source_url,
                            write = ?write,
                            "persisted deal"
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            source = name,
                            url = %candidate.source_url,
                            error = %e,
                            "failed to persist deal"
                        );
                    }
                }
            }
        }
        Ok(None) => {
            tracing::error!(source = name, "source is not registered; skipping persistence");
        }
        Err(e) => {
            tracing::error!(
                source = name,
                error = %e,
                "failed to resolve source id; skipping persistence"
            );
        }
    }

    record_run_best_effort(store, name, true, None).await;

    RunReport {
        source: name.to_owned(),
        success: true,
        deals_found: candidates.len(),
        persisted,
        error: None,
    }
}

/// Runs every source in order. Runs are independent: a failed source is
/// reported in its own [`RunReport`] and never blocks the sources after it.
pub async fn run_all(
    store: &dyn DealStore,
    client: &HttpClient,
    sources: &[Box<dyn CandidateSource>],
) -> Vec<RunReport> {
    let mut reports = Vec::with_capacity(sources.len());
    for source in sources {
        reports.push(run_source(store, client, source.as_ref()).await);
    }
    reports
}

async fn record_run_best_effort(
    store: &dyn DealStore,
    name: &str,
    success: bool,
    error: Option<&str>,
) {
    if let Err(e) = store.record_run(name, success, error).await {
        tracing::warn!(source = name, error = %e, "failed to record source health");
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
