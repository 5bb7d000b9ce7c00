//! Raw request payloads and their validation into store-ready attributes.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{CompanyId, NewCompany, NewReview, Rating};

/// A rating as it arrives on the wire: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatingInput {
    Number(f64),
    Text(String),
}

impl RatingInput {
    /// Coerces to a number, returning `None` for non-numeric text.
    pub fn coerce(&self) -> Option<f64> {
        match self {
            RatingInput::Number(value) => Some(*value),
            RatingInput::Text(raw) => raw.trim().parse::<f64>().ok(),
        }
        .filter(|value| value.is_finite())
    }
}

impl From<u8> for RatingInput {
    fn from(value: u8) -> Self {
        RatingInput::Number(f64::from(value))
    }
}

/// Candidate review as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub review_text: Option<String>,
    #[serde(default)]
    pub rating: Option<RatingInput>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReviewValidationError {
    #[error("companyId is required")]
    MissingCompanyId,
    #[error("companyId '{0}' is not a valid identifier")]
    InvalidCompanyId(String),
    #[error("rating is required")]
    MissingRating,
    #[error("rating must be a number")]
    NonNumericRating,
    #[error("rating {0} must be a whole number between 1 and 5")]
    RatingOutOfRange(f64),
}

impl ReviewSubmission {
    /// Checks the payload shape. Whether the company exists is checked by the
    /// submission service against the company store.
    pub fn validate(self) -> Result<NewReview, ReviewValidationError> {
        let raw_id = self
            .company_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ReviewValidationError::MissingCompanyId)?;
        let company_id = CompanyId::parse(&raw_id)
            .ok_or_else(|| ReviewValidationError::InvalidCompanyId(raw_id.clone()))?;

        let value = self
            .rating
            .ok_or(ReviewValidationError::MissingRating)?
            .coerce()
            .ok_or(ReviewValidationError::NonNumericRating)?;
        let rating = whole_rating(value).ok_or(ReviewValidationError::RatingOutOfRange(value))?;

        Ok(NewReview {
            company_id,
            full_name: text(self.full_name),
            subject: text(self.subject),
            review_text: text(self.review_text),
            rating: Some(rating),
        })
    }
}

fn whole_rating(value: f64) -> Option<Rating> {
    if value.fract() != 0.0 || value < f64::from(Rating::MIN) || value > f64::from(Rating::MAX) {
        return None;
    }
    Rating::new(value as u8)
}

fn text(value: Option<String>) -> String {
    value.map(|raw| raw.trim().to_string()).unwrap_or_default()
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Candidate company as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    #[serde(default)]
    pub founded_on: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompanyValidationError {
    #[error("name is required")]
    MissingName,
    #[error("foundedOn '{0}' is not a date (expected YYYY-MM-DD)")]
    InvalidFoundedOn(String),
    #[error("logo '{0}' must be a relative reference")]
    AbsoluteLogo(String),
    #[error("logo '{0}' does not reference an image")]
    LogoNotImage(String),
}

impl CompanyPayload {
    pub fn validate(self) -> Result<NewCompany, CompanyValidationError> {
        let name = optional_text(self.name).ok_or(CompanyValidationError::MissingName)?;
        let founded_on = optional_text(self.founded_on)
            .map(|raw| parse_date(&raw).ok_or(CompanyValidationError::InvalidFoundedOn(raw)))
            .transpose()?;
        let logo = optional_text(self.logo).map(validate_logo).transpose()?;

        Ok(NewCompany {
            name,
            logo,
            location: optional_text(self.location),
            city: optional_text(self.city),
            founded_on,
            description: optional_text(self.description),
        })
    }
}

/// Parses `YYYY-MM-DD`, or keeps the date part of an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn validate_logo(logo: String) -> Result<String, CompanyValidationError> {
    if logo.contains("://") || logo.starts_with("//") {
        return Err(CompanyValidationError::AbsoluteLogo(logo));
    }

    let is_image = mime_guess::from_path(&logo)
        .first()
        .is_some_and(|guess| guess.type_() == mime::IMAGE);
    if !is_image {
        return Err(CompanyValidationError::LogoNotImage(logo));
    }

    Ok(logo)
}
