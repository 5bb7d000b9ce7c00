use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::warn;

use super::domain::{Company, CompanyId, Rating, Review, ReviewId};
use super::intake::parse_date;

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidIdentifier { row: usize, value: String },
    MissingName { row: usize },
    InvalidRating { row: usize, value: String },
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read catalog file: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid catalog CSV data: {}", err),
            CatalogImportError::InvalidIdentifier { row, value } => {
                write!(f, "row {}: '{}' is not a valid company id", row, value)
            }
            CatalogImportError::MissingName { row } => {
                write!(f, "row {}: company name is required", row)
            }
            CatalogImportError::InvalidRating { row, value } => {
                write!(f, "row {}: rating '{}' must be a whole number from 1 to 5", row, value)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::InvalidIdentifier { .. }
            | CatalogImportError::MissingName { .. }
            | CatalogImportError::InvalidRating { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads catalog seed data from CSV exports.
///
/// Companies: `id,name,logo,location,city,founded_on,description`.
/// Reviews: `company_id,full_name,subject,review_text,rating,created_at`.
/// Blank or unparseable `founded_on`/`created_at` cells are dropped and a
/// blank or non-numeric rating is kept as a missing rating. A numeric rating
/// that is not a whole number in 1..=5 rejects the whole file.
pub struct CatalogImporter;

impl CatalogImporter {
    pub fn companies_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Company>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::companies_from_reader(file)
    }

    pub fn companies_from_reader<R: Read>(reader: R) -> Result<Vec<Company>, CatalogImportError> {
        let imported_at = Utc::now();
        let mut companies = Vec::new();

        for (index, record) in csv_reader(reader).deserialize::<CompanyRow>().enumerate() {
            let row = record?;
            let line = index + 2;
            let id = CompanyId::parse(&row.id).ok_or_else(|| CatalogImportError::InvalidIdentifier {
                row: line,
                value: row.id.clone(),
            })?;
            let name = row.name.ok_or(CatalogImportError::MissingName { row: line })?;

            companies.push(Company {
                id,
                name,
                logo: row.logo,
                location: row.location,
                city: row.city,
                founded_on: row.founded_on.as_deref().and_then(parse_date),
                description: row.description,
                created_at: imported_at,
                updated_at: imported_at,
            });
        }

        Ok(companies)
    }

    pub fn reviews_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Review>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::reviews_from_reader(file)
    }

    pub fn reviews_from_reader<R: Read>(reader: R) -> Result<Vec<Review>, CatalogImportError> {
        let imported_at = Utc::now();
        let mut reviews = Vec::new();

        for (index, record) in csv_reader(reader).deserialize::<ReviewRow>().enumerate() {
            let row = record?;
            let line = index + 2;
            let company_id =
                CompanyId::parse(&row.company_id).ok_or_else(|| CatalogImportError::InvalidIdentifier {
                    row: line,
                    value: row.company_id.clone(),
                })?;
            let id = ReviewId(format!("rev-import-{:06}", index + 1));
            let rating = parse_rating(row.rating.as_deref(), line)?;
            if rating.is_none() {
                warn!(
                    row = line,
                    review_id = %id,
                    company_id = %company_id,
                    "imported review has no usable rating"
                );
            }
            let created_at = row
                .created_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(imported_at);

            reviews.push(Review {
                id,
                company_id,
                full_name: row.full_name.unwrap_or_default(),
                subject: row.subject.unwrap_or_default(),
                review_text: row.review_text.unwrap_or_default(),
                rating,
                created_at,
                updated_at: created_at,
            });
        }

        Ok(reviews)
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Blank and non-numeric cells are missing ratings; numbers must be whole stars.
fn parse_rating(raw: Option<&str>, row: usize) -> Result<Option<Rating>, CatalogImportError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => return Ok(None),
    };

    let whole = value.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&value);
    whole
        .then(|| Rating::new(value as u8))
        .flatten()
        .map(Some)
        .ok_or_else(|| CatalogImportError::InvalidRating {
            row,
            value: raw.to_string(),
        })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_date(raw)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Deserialize)]
struct CompanyRow {
    id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    logo: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    location: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    founded_on: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewRow {
    company_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    full_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    subject: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    review_text: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rating: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
