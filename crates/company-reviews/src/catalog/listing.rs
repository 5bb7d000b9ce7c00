use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use super::aggregate::{aggregate_companies, RatingSummary};
use super::domain::{AggregatedCompanyView, Company, CompanyId, Review};
use super::service::CatalogError;
use super::store::{CompanyStore, ReviewStore};

/// City filter value that disables city filtering.
pub const ALL_CITIES: &str = "All";

/// Filters composed with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyFilter {
    /// Case-insensitive substring of the company name. Blank matches all.
    pub name_contains: Option<String>,
    /// Case-insensitive exact city. `None`, blank or [`ALL_CITIES`] match all.
    pub city: Option<String>,
}

impl CompanyFilter {
    pub fn matches(&self, company: &Company) -> bool {
        self.name_matches(company) && self.city_matches(company)
    }

    fn name_matches(&self, company: &Company) -> bool {
        let term = match self.name_contains.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return true,
        };
        company.name.to_lowercase().contains(&term)
    }

    fn city_matches(&self, company: &Company) -> bool {
        match self.city.as_deref() {
            None | Some(ALL_CITIES) => true,
            Some(city) if city.trim().is_empty() => true,
            Some(city) => {
                company.city.as_deref().unwrap_or_default().to_lowercase() == city.to_lowercase()
            }
        }
    }
}

/// Ordering applied to a listing. Exactly one key per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Case-insensitive ascending.
    #[default]
    Name,
    /// Highest average first.
    Rating,
    /// Case-insensitive ascending over `location`, falling back to `city`.
    Location,
    /// Most recently founded first; unknown founding dates last.
    FoundedOn,
}

impl SortKey {
    pub const fn label(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Rating => "rating",
            SortKey::Location => "location",
            SortKey::FoundedOn => "foundedOn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key '{0}', expected one of name, rating, location, foundedOn")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "name" => Ok(SortKey::Name),
            "rating" | "averagerating" | "average_rating" => Ok(SortKey::Rating),
            "location" => Ok(SortKey::Location),
            "foundedon" | "founded_on" => Ok(SortKey::FoundedOn),
            _ => Err(UnknownSortKey(raw.to_string())),
        }
    }
}

/// Filter plus sort key for one listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyQuery {
    pub filter: CompanyFilter,
    pub sort: SortKey,
}

impl CompanyQuery {
    pub fn sorted_by(sort: SortKey) -> Self {
        Self {
            filter: CompanyFilter::default(),
            sort,
        }
    }
}

fn location_key(company: &Company) -> String {
    [company.location.as_deref(), company.city.as_deref()]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_lowercase()
}

/// Stable in-place sort, so equal keys keep their input order.
pub fn sort_views(views: &mut [AggregatedCompanyView], key: SortKey) {
    match key {
        SortKey::Name => views.sort_by_cached_key(|view| view.company.name.to_lowercase()),
        SortKey::Location => views.sort_by_cached_key(|view| location_key(&view.company)),
        SortKey::Rating => views.sort_by(|a, b| {
            b.rating
                .average_rating
                .total_cmp(&a.rating.average_rating)
        }),
        SortKey::FoundedOn => {
            views.sort_by(|a, b| b.company.founded_on.cmp(&a.company.founded_on))
        }
    }
}

/// Aggregates, filters and sorts into a fresh sequence.
///
/// Aggregation runs over the whole catalog so that companies excluded by the
/// filter are not reported as missing targets of their reviews.
pub fn list_companies(
    companies: &[Company],
    reviews: &[Review],
    query: &CompanyQuery,
) -> Vec<AggregatedCompanyView> {
    let mut views: Vec<AggregatedCompanyView> = aggregate_companies(companies.to_vec(), reviews)
        .into_iter()
        .filter(|view| query.filter.matches(&view.company))
        .collect();
    sort_views(&mut views, query.sort);
    views
}

/// Distinct non-blank cities, sorted case-insensitively.
pub fn city_options(companies: &[Company]) -> Vec<String> {
    let distinct: BTreeSet<&str> = companies
        .iter()
        .filter_map(|company| company.city.as_deref())
        .filter(|city| !city.trim().is_empty())
        .collect();

    let mut cities: Vec<String> = distinct.into_iter().map(str::to_string).collect();
    cities.sort_by_cached_key(|city| city.to_lowercase());
    cities
}

/// Read side of the catalog: companies composed with their rating summaries.
pub struct CompanyListingService<C, R> {
    companies: Arc<C>,
    reviews: Arc<R>,
}

impl<C, R> CompanyListingService<C, R>
where
    C: CompanyStore + 'static,
    R: ReviewStore + 'static,
{
    pub fn new(companies: Arc<C>, reviews: Arc<R>) -> Self {
        Self { companies, reviews }
    }

    pub fn list_companies(
        &self,
        query: &CompanyQuery,
    ) -> Result<Vec<AggregatedCompanyView>, CatalogError> {
        let companies = self.companies.list()?;
        let reviews = self.reviews.list()?;
        let views = list_companies(&companies, &reviews, query);

        debug!(
            total = companies.len(),
            returned = views.len(),
            sort = query.sort.label(),
            "company listing composed"
        );
        Ok(views)
    }

    pub fn get_company_detail(
        &self,
        company_id: &str,
    ) -> Result<AggregatedCompanyView, CatalogError> {
        let id = CompanyId::parse(company_id)
            .ok_or_else(|| CatalogError::NotFound(company_id.to_string()))?;
        let company = self
            .companies
            .get(&id)?
            .ok_or_else(|| CatalogError::NotFound(id.0.clone()))?;

        let reviews = self.reviews.list_by_company(&id)?;
        let rating = RatingSummary::for_company(&id, &reviews);
        Ok(AggregatedCompanyView::new(company, rating))
    }

    pub fn city_options(&self) -> Result<Vec<String>, CatalogError> {
        let companies = self.companies.list()?;
        Ok(city_options(&companies))
    }
}
