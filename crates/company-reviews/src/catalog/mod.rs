//! Company catalog: listing with rating aggregation, review intake, and the
//! HTTP routes that expose both.

pub mod aggregate;
pub mod domain;
pub mod import;
pub mod intake;
pub mod listing;
pub mod memory;
pub mod router;
pub mod service;
pub mod store;
pub mod submission;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate_companies, RatingIndex, RatingSummary};
pub use domain::{
    AggregatedCompanyView, Company, CompanyId, NewCompany, NewReview, Rating, Review, ReviewId,
};
pub use import::{CatalogImportError, CatalogImporter};
pub use intake::{
    CompanyPayload, CompanyValidationError, RatingInput, ReviewSubmission, ReviewValidationError,
};
pub use listing::{
    city_options, list_companies, sort_views, CompanyFilter, CompanyListingService, CompanyQuery,
    SortKey, UnknownSortKey, ALL_CITIES,
};
pub use memory::{InMemoryCompanyStore, InMemoryReviewStore};
pub use router::{catalog_router, LogoResolver};
pub use service::{CatalogError, CatalogService};
pub use store::{CompanyStore, ReviewStore, StoreError};
pub use submission::ReviewSubmissionService;
