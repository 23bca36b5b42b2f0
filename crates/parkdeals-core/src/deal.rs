//! Domain types shared across the aggregation pipeline and the database layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stored titles are capped at this many characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Stored descriptions are capped at this many characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Category of a promotional offer.
///
/// Classification tests substring rules in declaration order and keeps the
/// first hit, so `FreeDining` outranks everything below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealType {
    FreeDining,
    RoomDiscount,
    PackageDiscount,
    FreeNights,
    RoomUpgrade,
    PassholderExclusive,
    Other,
}

impl DealType {
    /// The `snake_case` form stored in the `deals.deal_type` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DealType::FreeDining => "free_dining",
            DealType::RoomDiscount => "room_discount",
            DealType::PackageDiscount => "package_discount",
            DealType::FreeNights => "free_nights",
            DealType::RoomUpgrade => "room_upgrade",
            DealType::PassholderExclusive => "passholder_exclusive",
            DealType::Other => "other",
        }
    }

    /// Whether a freshly inserted deal of this type bundles the dining plan.
    #[must_use]
    pub fn includes_dining_plan(self) -> bool {
        self == DealType::FreeDining
    }
}

impl std::fmt::Display for DealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured offer extracted from unstructured source text.
///
/// Candidates live for one aggregation run; `source_url` is the natural key
/// the store deduplicates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealCandidate {
    pub title: String,
    pub description: String,
    pub deal_type: DealType,
    pub discount_percentage: Option<i32>,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub travel_valid_from: NaiveDate,
    pub travel_valid_to: NaiveDate,
    pub source_url: String,
    pub deal_code: Option<String>,
}
