use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::RatingSummary;

const MAX_IDENTIFIER_LEN: usize = 64;

fn is_valid_identifier(raw: &str) -> bool {
    !raw.is_empty()
        && raw.len() <= MAX_IDENTIFIER_LEN
        && raw
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}

/// Store-assigned identifier for a company. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub String);

impl CompanyId {
    /// Accepts 1-64 characters of ASCII alphanumerics, `-` or `_`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        is_valid_identifier(trimmed).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-assigned identifier for a review.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub String);

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A star rating in the closed range 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value).ok_or_else(|| format!("rating {value} is outside 1..=5"))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A company as persisted by the company store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    /// Relative reference to an image resource, e.g. `/uploads/acme.png`.
    pub logo: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub founded_on: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated attributes handed to the company store on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,
    pub logo: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub founded_on: Option<NaiveDate>,
    pub description: Option<String>,
}

/// A single review as persisted by the review store.
///
/// `rating` is `None` only for legacy or imported records whose rating was
/// missing or non-numeric; the aggregator counts those as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub company_id: CompanyId,
    pub full_name: String,
    pub subject: String,
    pub review_text: String,
    pub rating: Option<Rating>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated attributes handed to the review store on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub company_id: CompanyId,
    pub full_name: String,
    pub subject: String,
    pub review_text: String,
    pub rating: Option<Rating>,
}

/// A company enriched with its review count and average rating.
///
/// Computed fresh for every read and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedCompanyView {
    #[serde(flatten)]
    pub company: Company,
    #[serde(flatten)]
    pub rating: RatingSummary,
}

impl AggregatedCompanyView {
    pub fn new(company: Company, rating: RatingSummary) -> Self {
        Self { company, rating }
    }

    pub fn id(&self) -> &CompanyId {
        &self.company.id
    }
}
