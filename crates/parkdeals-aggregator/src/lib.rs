//! Deal aggregation pipeline.
//!
//! Fetches raw content from external deal sources (a content blog and a
//! Reddit community feed), extracts structured deal candidates via keyword
//! and regex matching, upserts them into the store keyed by canonical source
//! URL, and stamps per-source health after every run.

pub mod client;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod sources;
pub mod store;
pub mod types;

pub use client::HttpClient;
pub use error::AggregatorError;
pub use pipeline::{run_all, run_source};
pub use sources::{default_sources, AllEarsSource, CandidateSource, RedditWdwSource};
pub use store::{DealStore, DealWrite, PgDealStore};
pub use types::{RawCandidate, RunReport};
