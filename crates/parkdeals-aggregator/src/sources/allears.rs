//! AllEars.net deals-category page source.
//!
//! The page is plain server-rendered HTML; candidate blocks are pulled out
//! with ordered regex passes rather than a DOM parser.

use async_trait::async_trait;
use regex::Regex;

use crate::client::HttpClient;
use crate::error::AggregatorError;
use crate::extract::{ExtractionRules, InclusionPolicy};
use crate::sources::CandidateSource;
use crate::types::RawCandidate;

pub(crate) const SOURCE_NAME: &str = "AllEars.net";

const DEALS_URL: &str = "https://allears.net/category/walt-disney-world/wdw-planning/wdw-deals/";
const SITE_ORIGIN: &str = "https://allears.net";

/// Browser-shaped identifying header; the site serves a bot-check page to
/// unknown agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const MIN_EXCERPT_CHARS: usize = 20;

pub(crate) const RULES: ExtractionRules = ExtractionRules {
    keywords: &[
        "discount", "save", "deal", "offer", "promo", "free", "%", "special",
    ],
    inclusion: InclusionPolicy::Keyword {
        min_title_chars: 10,
    },
    date_patterns: &[
        r"(?i)(\w+\s+\d{1,2}(?:,\s*\d{4})?)\s*(?:-|through|to|until)\s*(\w+\s+\d{1,2}(?:,\s*\d{4})?)",
        r"(?i)(?:valid|stay)\s+(\w+\s+\d{1,2})\s*-\s*(\w+\s+\d{1,2})",
        r"(?i)from\s+(\w+\s+\d{1,2})\s+to\s+(\w+\s+\d{1,2}(?:,\s*\d{4})?)",
    ],
    default_window_days: 120,
    empty_description_label: None,
};

/// Content-site source scraping the AllEars deals category page.
pub struct AllEarsSource {
    endpoint: String,
    origin: String,
}

impl Default for AllEarsSource {
    fn default() -> Self {
        Self {
            endpoint: DEALS_URL.to_owned(),
            origin: SITE_ORIGIN.to_owned(),
        }
    }
}

impl AllEarsSource {
    /// Builds a source pointed at a non-production endpoint (tests).
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            origin: origin.into(),
        }
    }
}

#[async_trait]
impl CandidateSource for AllEarsSource {
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
        let html = client.fetch_text(&self.endpoint, USER_AGENT).await?;
        Ok(parse_candidate_blocks(&html, &self.origin))
    }
}

/// Pulls candidate items out of the category page markup.
///
/// `<article>` blocks are tried first; pages that render entries as classed
/// `<div>`s (`post`/`entry`/`card`) fall back to the second pass. Per block:
/// the first `<h2>`/`<h3>` is the title, the first link inside the heading
/// (or, failing that, in the block) is the URL, and the first paragraph of
/// substance is the excerpt.
fn parse_candidate_blocks(html: &str, origin: &str) -> Vec<RawCandidate> {
    let article_re = Regex::new(r"(?is)<article[^>]*>(.*?)</article>").expect("valid article regex");
    let mut blocks: Vec<&str> = article_re
        .captures_iter(html)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect();

    if blocks.is_empty() {
        let div_re = Regex::new(
            r#"(?is)<div[^>]+class\s*=\s*["'][^"']*(?:post|entry|card)[^"']*["'][^>]*>(.*?)</div>"#,
        )
        .expect("valid entry-div regex");
        blocks = div_re
            .captures_iter(html)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
            .collect();
    }

    blocks
        .into_iter()
        .filter_map(|block| parse_block(block, origin))
        .collect()
}

fn parse_block(block: &str, origin: &str) -> Option<RawCandidate> {
    let heading_re = Regex::new(r"(?is)<h[23][^>]*>(.*?)</h[23]>").expect("valid heading regex");
    let heading_html = heading_re
        .captures(block)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())?;

    let title = clean_text(heading_html);
    if title.is_empty() {
        return None;
    }

    let href = first_href(heading_html).or_else(|| first_href(block));
    let url = href.map(|link| resolve_link(&link, origin)).unwrap_or_default();

    let body = first_paragraph(block).unwrap_or_default();

    Some(RawCandidate {
        title,
        body,
        url,
        score: None,
        comment_count: None,
    })
}

fn first_href(html: &str) -> Option<String> {
    let re = Regex::new(r#"(?is)href\s*=\s*["']([^"']+)["']"#).expect("valid href regex");
    re.captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
}

fn first_paragraph(html: &str) -> Option<String> {
    let re = Regex::new(r"(?is)<p[^>]*>(.*?)</p>").expect("valid paragraph regex");
    for cap in re.captures_iter(html) {
        let candidate = clean_text(cap.get(1).map_or("", |m| m.as_str()));
        if candidate.chars().count() >= MIN_EXCERPT_CHARS {
            return Some(candidate);
        }
    }
    None
}

/// Relative links on the site are origin-relative.
fn resolve_link(href: &str, origin: &str) -> String {
    if href.starts_with("http") {
        href.to_owned()
    } else {
        format!("{origin}{href}")
    }
}

fn clean_text(input: &str) -> String {
    let tags = Regex::new(r"(?is)<[^>]+>").expect("valid tags regex");
    let no_tags = tags.replace_all(input, " ");
    no_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}
