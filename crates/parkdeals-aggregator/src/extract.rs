//! Shared deal extraction: inclusion rules, discount/code/date parsing, and
//! deal-type classification, parameterized per source by [`ExtractionRules`].

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;

use parkdeals_core::{DealCandidate, DealType, MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};

use crate::types::RawCandidate;

/// Ordered promo-code patterns; the first match wins. The bare-token pattern
/// stays case-sensitive so it only matches shapes like `SAVE2026`.
const CODE_PATTERNS: &[&str] = &[
    r"(?i)(?:code|promo)[:\s]+([A-Z0-9]{4,15})",
    r"(?i)use\s+([A-Z0-9]{4,15})",
    r"\b([A-Z]{3,}\d{2,})\b",
];

const DISCOUNT_PATTERN: &str = r"(?i)(\d+)%\s*(?:off|discount|savings)";
const UP_TO_PATTERN: &str = r"(?i)up\s+to\s+(\d+)%";

/// How a source admits items into extraction.
#[derive(Debug, Clone, Copy)]
pub enum InclusionPolicy {
    /// Content-site rule: a headline of sensible length, a link, and at least
    /// one deal keyword in the combined text.
    Keyword { min_title_chars: usize },
    /// Community rule: a deal keyword in the combined text, OR engagement
    /// strictly above either threshold (community-validated items are admitted
    /// even without an explicit deal keyword).
    KeywordOrEngagement { min_score: i64, min_comments: i64 },
}

/// Per-source knobs for the shared extractor.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    pub keywords: &'static [&'static str],
    pub inclusion: InclusionPolicy,
    /// Ordered date-range patterns, each with two capture groups. A pattern
    /// that matches structurally but fails date parsing is discarded and the
    /// next pattern is tried.
    pub date_patterns: &'static [&'static str],
    /// Validity window applied when no date range parses out of the text.
    pub default_window_days: i64,
    /// When the item body is empty, label the fallback description
    /// (`"{label}: {title}"`) instead of reusing the bare title.
    pub empty_description_label: Option<&'static str>,
}

/// Decides whether a raw item is worth extracting. A `false` here is a skip,
/// never an error.
#[must_use]
pub fn passes_inclusion(rules: &ExtractionRules, item: &RawCandidate) -> bool {
    if item.title.trim().is_empty() {
        return false;
    }

    let combined = format!("{} {}", item.title, item.body).to_lowercase();
    let has_keyword = rules.keywords.iter().any(|kw| combined.contains(kw));

    match rules.inclusion {
        InclusionPolicy::Keyword { min_title_chars } => {
            item.title.chars().count() >= min_title_chars && !item.url.is_empty() && has_keyword
        }
        InclusionPolicy::KeywordOrEngagement {
            min_score,
            min_comments,
        } => {
            let engaged = item.score.unwrap_or(0) > min_score
                || item.comment_count.unwrap_or(0) > min_comments;
            has_keyword || engaged
        }
    }
}

/// Builds a [`DealCandidate`] from an admitted raw item.
///
/// `today` anchors the default validity window and year injection, so runs
/// and tests stay deterministic.
#[must_use]
pub fn extract_candidate(
    rules: &ExtractionRules,
    item: &RawCandidate,
    today: NaiveDate,
) -> DealCandidate {
    let combined = format!("{} {}", item.title, item.body);

    let discount_percentage = extract_discount(&combined);
    let deal_code = extract_deal_code(&combined);
    let (valid_from, valid_to) = extract_date_range(rules, &combined, today);
    let deal_type = classify_deal_type(&combined.to_lowercase());

    let title = truncate_chars(&item.title, MAX_TITLE_CHARS);
    let description = if item.body.trim().is_empty() {
        let fallback = match rules.empty_description_label {
            Some(label) => format!("{label}: {}", item.title),
            None => item.title.clone(),
        };
        truncate_chars(&fallback, MAX_DESCRIPTION_CHARS)
    } else {
        truncate_chars(&item.body, MAX_DESCRIPTION_CHARS)
    };

    DealCandidate {
        title,
        description,
        deal_type,
        discount_percentage,
        valid_from,
        valid_to,
        travel_valid_from: valid_from,
        travel_valid_to: valid_to,
        source_url: item.url.clone(),
        deal_code,
    }
}

/// Extracts a discount percentage. An "up to N%" phrasing wins over a plain
/// "N% off"/"N% discount"/"N% savings" match.
fn extract_discount(text: &str) -> Option<i32> {
    let up_to = Regex::new(UP_TO_PATTERN)
        .expect("valid up-to discount regex")
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok());

    let plain = Regex::new(DISCOUNT_PATTERN)
        .expect("valid discount regex")
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok());

    up_to.or(plain)
}

/// Tries the ordered code patterns; first match wins.
fn extract_deal_code(text: &str) -> Option<String> {
    for pattern in CODE_PATTERNS {
        let re = Regex::new(pattern).expect("valid promo-code regex");
        if let Some(caps) = re.captures(text) {
            if let Some(token) = caps.get(1) {
                return Some(token.as_str().to_owned());
            }
        }
    }
    None
}

/// Tries each date pattern in order; the first structural match whose two
/// captures both parse as dates wins. A match that fails parsing falls
/// through to the next pattern. When nothing parses, the window defaults to
/// `[today, today + default_window_days]`.
fn extract_date_range(
    rules: &ExtractionRules,
    text: &str,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    for pattern in rules.date_patterns {
        let re = Regex::new(pattern).expect("valid date-range regex");
        let Some(caps) = re.captures(text) else {
            continue;
        };
        let (Some(from_raw), Some(to_raw)) = (caps.get(1), caps.get(2)) else {
            continue;
        };

        match (
            parse_flexible_date(from_raw.as_str(), today.year()),
            parse_flexible_date(to_raw.as_str(), today.year()),
        ) {
            (Some(from), Some(to)) => return (from, to),
            // Structural match, unparseable dates: discard and try the next pattern.
            _ => continue,
        }
    }

    (today, today + Duration::days(rules.default_window_days))
}

/// Parses a captured date string: `6/15/2026`-style numeric dates, or
/// `June 15[, 2026]` word dates with the current year injected when absent.
fn parse_flexible_date(raw: &str, current_year: i32) -> Option<NaiveDate> {
    let trimmed = raw.trim();

    if trimmed.contains('/') {
        // Two-digit years need %y so "6/1/26" lands in 2026, not year 26.
        let format = match trimmed.rsplit('/').next() {
            Some(year) if year.len() <= 2 => "%m/%d/%y",
            _ => "%m/%d/%Y",
        };
        return NaiveDate::parse_from_str(trimmed, format).ok();
    }

    let with_year = if trimmed.contains(',') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}, {current_year}")
    };
    for format in ["%B %d, %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&with_year, format) {
            return Some(date);
        }
    }

    None
}

/// Six substring rules in fixed priority order; the first hit wins.
fn classify_deal_type(text_lower: &str) -> DealType {
    if text_lower.contains("free dining") {
        DealType::FreeDining
    } else if text_lower.contains("room")
        && (text_lower.contains("discount") || text_lower.contains("rate"))
    {
        DealType::RoomDiscount
    } else if text_lower.contains("package") {
        DealType::PackageDiscount
    } else if text_lower.contains("free night") {
        DealType::FreeNights
    } else if text_lower.contains("upgrade") {
        DealType::RoomUpgrade
    } else if text_lower.contains("passholder") || text_lower.contains("annual pass") {
        DealType::PassholderExclusive
    } else {
        DealType::Other
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
