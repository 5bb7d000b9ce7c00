use std::sync::Arc;

use tracing::info;

use super::aggregate::RatingSummary;
use super::domain::{AggregatedCompanyView, Review};
use super::intake::{CompanyPayload, CompanyValidationError, ReviewSubmission, ReviewValidationError};
use super::listing::{CompanyListingService, CompanyQuery};
use super::store::{CompanyStore, ReviewStore, StoreError};
use super::submission::ReviewSubmissionService;

/// Facade over the listing and submission services sharing one pair of stores.
pub struct CatalogService<C, R> {
    companies: Arc<C>,
    listing: CompanyListingService<C, R>,
    submissions: ReviewSubmissionService<C, R>,
}

impl<C, R> CatalogService<C, R>
where
    C: CompanyStore + 'static,
    R: ReviewStore + 'static,
{
    pub fn new(companies: Arc<C>, reviews: Arc<R>) -> Self {
        Self {
            listing: CompanyListingService::new(companies.clone(), reviews.clone()),
            submissions: ReviewSubmissionService::new(companies.clone(), reviews),
            companies,
        }
    }

    pub fn list_companies(
        &self,
        query: &CompanyQuery,
    ) -> Result<Vec<AggregatedCompanyView>, CatalogError> {
        self.listing.list_companies(query)
    }

    pub fn get_company_detail(
        &self,
        company_id: &str,
    ) -> Result<AggregatedCompanyView, CatalogError> {
        self.listing.get_company_detail(company_id)
    }

    pub fn city_options(&self) -> Result<Vec<String>, CatalogError> {
        self.listing.city_options()
    }

    /// Create a company. A new company has no reviews yet, so its view carries
    /// the zero summary.
    pub fn create_company(
        &self,
        payload: CompanyPayload,
    ) -> Result<AggregatedCompanyView, CatalogError> {
        let company = payload.validate()?;
        let stored = self.companies.create(company)?;
        info!(company_id = %stored.id, name = %stored.name, "company created");
        Ok(AggregatedCompanyView::new(stored, RatingSummary::default()))
    }

    pub fn submit_review(&self, submission: ReviewSubmission) -> Result<Review, CatalogError> {
        self.submissions.submit_review(submission)
    }

    pub fn list_reviews(&self, company_id: &str) -> Result<Vec<Review>, CatalogError> {
        self.submissions.list_reviews(company_id)
    }
}

/// Error raised by the catalog services.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("company {0} not found")]
    NotFound(String),
    #[error(transparent)]
    InvalidReview(#[from] ReviewValidationError),
    #[error(transparent)]
    InvalidCompany(#[from] CompanyValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
