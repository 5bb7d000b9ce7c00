use std::sync::Arc;

use tracing::info;

use super::domain::{CompanyId, Review};
use super::intake::{ReviewSubmission, ReviewValidationError};
use super::service::CatalogError;
use super::store::{CompanyStore, ReviewStore};

/// Validates review payloads and appends them to the review store.
pub struct ReviewSubmissionService<C, R> {
    companies: Arc<C>,
    reviews: Arc<R>,
}

impl<C, R> ReviewSubmissionService<C, R>
where
    C: CompanyStore + 'static,
    R: ReviewStore + 'static,
{
    pub fn new(companies: Arc<C>, reviews: Arc<R>) -> Self {
        Self { companies, reviews }
    }

    /// Validate and store a review. Nothing is written when validation fails or
    /// the referenced company does not exist.
    pub fn submit_review(&self, submission: ReviewSubmission) -> Result<Review, CatalogError> {
        let review = submission.validate()?;

        if self.companies.get(&review.company_id)?.is_none() {
            return Err(CatalogError::NotFound(review.company_id.0));
        }

        let stored = self.reviews.create(review)?;
        info!(
            review_id = %stored.id,
            company_id = %stored.company_id,
            "review submitted"
        );
        Ok(stored)
    }

    /// Reviews for a company, newest first. Unknown companies yield an empty list.
    pub fn list_reviews(&self, company_id: &str) -> Result<Vec<Review>, CatalogError> {
        let id = CompanyId::parse(company_id)
            .ok_or_else(|| ReviewValidationError::InvalidCompanyId(company_id.to_string()))?;
        Ok(self.reviews.list_by_company(&id)?)
    }
}
