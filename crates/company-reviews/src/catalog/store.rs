use super::domain::{Company, CompanyId, NewCompany, NewReview, Review};

/// Persistence boundary for companies. Implementations assign identifiers and
/// timestamps on creation.
pub trait CompanyStore: Send + Sync {
    fn create(&self, company: NewCompany) -> Result<Company, StoreError>;
    fn list(&self) -> Result<Vec<Company>, StoreError>;
    fn get(&self, id: &CompanyId) -> Result<Option<Company>, StoreError>;
}

/// Persistence boundary for reviews. Append-only from the catalog's side.
pub trait ReviewStore: Send + Sync {
    fn create(&self, review: NewReview) -> Result<Review, StoreError>;
    /// Reviews for one company, newest first.
    fn list_by_company(&self, company_id: &CompanyId) -> Result<Vec<Review>, StoreError>;
    /// Every stored review, in no particular order.
    fn list(&self) -> Result<Vec<Review>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {0} already exists")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
