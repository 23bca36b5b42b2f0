//! Deal source strategies.
//!
//! Each source knows how to fetch and structurally parse its own feed into
//! [`RawCandidate`] items; inclusion filtering and extraction are shared and
//! driven by the source's [`ExtractionRules`].

pub(crate) mod allears;
pub(crate) mod reddit;

pub use allears::AllEarsSource;
pub use reddit::RedditWdwSource;

use async_trait::async_trait;

use crate::client::HttpClient;
use crate::error::AggregatorError;
use crate::extract::ExtractionRules;
use crate::types::RawCandidate;

/// A source-specific fetch + candidate-extraction strategy.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Registered source name; must match a `deal_sources.name` row.
    fn name(&self) -> &str;

    /// Inclusion and extraction knobs for this source.
    fn rules(&self) -> &ExtractionRules;

    /// Fetches the feed and parses it into raw candidate items.
    ///
    /// # Errors
    ///
    /// Returns [`AggregatorError`] on fetch or structural-parse failure;
    /// the pipeline treats this as the run's terminal failure.
    async fn fetch_candidates(
        &self,
        client: &HttpClient,
    ) -> Result<Vec<RawCandidate>, AggregatorError>;
}

/// The registered production sources, in run order.
#[must_use]
pub fn default_sources() -> Vec<Box<dyn CandidateSource>> {
    vec![
        Box::new(AllEarsSource::default()),
        Box::new(RedditWdwSource::default()),
    ]
}
