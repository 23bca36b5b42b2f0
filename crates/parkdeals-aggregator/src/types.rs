/// A raw item produced by a source before inclusion filtering and extraction.
#[derive(Debug, Clone)]
pub struct RawCandidate {
    /// Item headline (article title or post title).
    pub title: String,
    /// Item body text (article excerpt or post selftext). May be empty.
    pub body: String,
    /// Canonical absolute URL of the item.
    pub url: String,
    /// Community score, for sources that expose engagement metrics.
    pub score: Option<i64>,
    /// Comment count, for sources that expose engagement metrics.
    pub comment_count: Option<i64>,
}

/// Outcome descriptor for one source's aggregation run.
///
/// Runs never propagate errors to the caller; a failed fetch produces a
/// report with `success = false` and the error message.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub source: String,
    pub success: bool,
    /// Candidates that passed the inclusion rule.
    pub deals_found: usize,
    /// Candidates actually written to the store.
    pub persisted: usize,
    pub error: Option<String>,
}
