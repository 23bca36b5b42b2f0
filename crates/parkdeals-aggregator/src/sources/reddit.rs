//! r/WaltDisneyWorld hot-listing source (public JSON endpoint, no auth).

use async_trait::async_trait;
use serde::Deserialize;

use crate::client::HttpClient;
use crate::error::AggregatorError;
use crate::extract::{ExtractionRules, InclusionPolicy};
use crate::sources::CandidateSource;
use crate::types::RawCandidate;

pub(crate) const SOURCE_NAME: &str = "Reddit WaltDisneyWorld";

const HOT_URL: &str = "https://www.reddit.com/r/WaltDisneyWorld/hot.json?limit=25";
const REDDIT_ORIGIN: &str = "https://www.reddit.com";
const USER_AGENT: &str = "Disney-Deal-Tracker/1.0";

pub(crate) const RULES: ExtractionRules = ExtractionRules {
    keywords: &[
        "discount",
        "save",
        "deal",
        "offer",
        "promo",
        "code",
        "free",
        "%",
        "off",
        "special",
        "resort rate",
        "room rate",
        "cheap",
        "price",
        "booking",
        "passholder",
    ],
    inclusion: InclusionPolicy::KeywordOrEngagement {
        min_score: 10,
        min_comments: 5,
    },
    date_patterns: &[
        r"(?i)(\w+\s+\d{1,2}(?:,\s*\d{4})?)\s*(?:-|through|to|until)\s*(\w+\s+\d{1,2}(?:,\s*\d{4})?)",
        r"(\d{1,2}/\d{1,2}/\d{2,4})\s*-\s*(\d{1,2}/\d{1,2}/\d{2,4})",
        r"(?i)from\s+(\w+\s+\d{1,2})\s+to\s+(\w+\s+\d{1,2}(?:,\s*\d{4})?)",
    ],
    default_window_days: 90,
    empty_description_label: Some("Reddit community post"),
};

/// Reddit listing wrapper (`/hot.json` response shape).
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: Option<String>,
    selftext: Option<String>,
    permalink: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
}

/// Community source reading one fixed-size page of hot posts.
pub struct RedditWdwSource {
    endpoint: String,
}

impl Default for RedditWdwSource {
    fn default() -> Self {
        Self {
            endpoint: HOT_URL.to_owned(),
        }
    }
}

impl RedditWdwSource {
    /// Builds a source pointed at a non-production endpoint (tests).
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CandidateSource for RedditWdwSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn rules(&self) -> &ExtractionRules {
        &RULES
    }

    async fn fetch_candidates(
        &self,
        client: &HttpClient,
    ) -> Result<Vec<RawCandidate>, AggregatorError> {
        let listing: Listing = client.fetch_json(&self.endpoint, USER_AGENT).await?;
        Ok(listing
            .data
            .children
            .into_iter()
            .filter_map(|post| to_candidate(post.data))
            .collect())
    }
}

/// Posts without a title or permalink cannot form a keyed candidate and are
/// skipped.
fn to_candidate(post: PostData) -> Option<RawCandidate> {
    let title = post.title.filter(|t| !t.is_empty())?;
    let permalink = post.permalink?;

    Some(RawCandidate {
        title,
        body: post.selftext.unwrap_or_default(),
        url: format!("{REDDIT_ORIGIN}{permalink}"),
        score: Some(post.score),
        comment_count: Some(post.num_comments),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "children": [
                {
                    "kind": "t3",
                    "data": {
                        "title": "30% off deluxe resorts announced",
                        "selftext": "Just got the email, code SAVE2026 works for fall stays.",
                        "permalink": "/r/WaltDisneyWorld/comments/abc123/30_off/",
                        "score": 154,
                        "num_comments": 42
                    }
                },
                {
                    "kind": "t3",
                    "data": {
                        "title": "Trip report!",
                        "selftext": "",
                        "permalink": "/r/WaltDisneyWorld/comments/def456/trip_report/",
                        "score": 3,
                        "num_comments": 1
                    }
                },
                {
                    "kind": "t3",
                    "data": {
                        "title": null,
                        "selftext": "orphan body",
                        "permalink": "/r/WaltDisneyWorld/comments/ghi789/orphan/",
                        "score": 99,
                        "num_comments": 10
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn listing_deserializes_and_maps_to_candidates() {
        let listing: Listing = serde_json::from_str(LISTING).unwrap();
        let candidates: Vec<RawCandidate> = listing
            .data
            .children
            .into_iter()
            .filter_map(|post| to_candidate(post.data))
            .collect();

        // The titleless post is dropped; the low-engagement one survives to
        // the inclusion filter.
        assert_eq!(candidates.len(), 2);

        let first = &candidates[0];
        assert_eq!(first.title, "30% off deluxe resorts announced");
        assert_eq!(
            first.url,
            "https://www.reddit.com/r/WaltDisneyWorld/comments/abc123/30_off/"
        );
        assert_eq!(first.score, Some(154));
        assert_eq!(first.comment_count, Some(42));
    }

    #[test]
    fn missing_engagement_fields_default_to_zero() {
        let raw = r#"{"data": {"children": [{"data": {"title": "A deal", "permalink": "/r/x/1/"}}]}}"#;
        let listing: Listing = serde_json::from_str(raw).unwrap();
        let post = listing.data.children.into_iter().next().unwrap();
        let candidate = to_candidate(post.data).unwrap();
        assert_eq!(candidate.score, Some(0));
        assert_eq!(candidate.comment_count, Some(0));
        assert!(candidate.body.is_empty());
    }
}
