use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::catalog::aggregate::RatingSummary;
use crate::catalog::domain::{
    AggregatedCompanyView, Company, CompanyId, NewCompany, NewReview, Rating, Review, ReviewId,
};
use crate::catalog::memory::{InMemoryCompanyStore, InMemoryReviewStore};
use crate::catalog::router::{catalog_router, LogoResolver};
use crate::catalog::service::CatalogService;
use crate::catalog::store::{CompanyStore, ReviewStore, StoreError};

static REVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) const BASE_URL: &str = "http://localhost:5000";

pub(crate) fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) fn company(id: &str, name: &str) -> Company {
    Company {
        id: CompanyId(id.to_string()),
        name: name.to_string(),
        logo: None,
        location: None,
        city: None,
        founded_on: None,
        description: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub(crate) fn company_in(id: &str, name: &str, city: Option<&str>) -> Company {
    Company {
        city: city.map(str::to_string),
        ..company(id, name)
    }
}

pub(crate) fn founded_company(id: &str, founded_on: Option<NaiveDate>) -> Company {
    Company {
        founded_on,
        ..company(id, id)
    }
}

pub(crate) fn review(company_id: &str, rating: u8) -> Review {
    let n = REVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    Review {
        id: ReviewId(format!("fixture-{n}")),
        company_id: CompanyId(company_id.to_string()),
        full_name: "Jane".to_string(),
        subject: "Great".to_string(),
        review_text: "Loved it".to_string(),
        rating: Some(Rating::new(rating).expect("fixture rating in range")),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub(crate) fn review_without_rating(company_id: &str) -> Review {
    Review {
        rating: None,
        ..review(company_id, 1)
    }
}

pub(crate) fn view(company: Company, review_count: usize, average_rating: f64) -> AggregatedCompanyView {
    AggregatedCompanyView::new(
        company,
        RatingSummary {
            review_count,
            average_rating,
        },
    )
}

pub(crate) fn new_company(name: &str) -> NewCompany {
    NewCompany {
        name: name.to_string(),
        logo: None,
        location: None,
        city: None,
        founded_on: None,
        description: None,
    }
}

pub(crate) fn new_review(company_id: &str, rating: u8) -> NewReview {
    NewReview {
        company_id: CompanyId(company_id.to_string()),
        full_name: "Jane".to_string(),
        subject: "Great".to_string(),
        review_text: "Loved it".to_string(),
        rating: Rating::new(rating),
    }
}

pub(crate) type MemoryCatalog = CatalogService<InMemoryCompanyStore, InMemoryReviewStore>;

/// Service over stores seeded with company `C1` ("Acme", Pune) and `C2`
/// ("Globex", Delhi, logo), both without reviews.
pub(crate) fn build_service() -> (MemoryCatalog, Arc<InMemoryCompanyStore>, Arc<InMemoryReviewStore>) {
    let mut globex = company_in("C2", "Globex", Some("Delhi"));
    globex.logo = Some("/uploads/globex.png".to_string());
    let companies = Arc::new(
        InMemoryCompanyStore::with_companies(vec![
            company_in("C1", "Acme", Some("Pune")),
            globex,
        ])
        .expect("seed companies"),
    );
    let reviews = Arc::new(InMemoryReviewStore::default());
    let service = CatalogService::new(companies.clone(), reviews.clone());
    (service, companies, reviews)
}

pub(crate) fn router_with_service(service: MemoryCatalog) -> axum::Router {
    catalog_router(Arc::new(service), LogoResolver::new(BASE_URL))
}

pub(crate) struct UnavailableCompanyStore;

impl CompanyStore for UnavailableCompanyStore {
    fn create(&self, _company: NewCompany) -> Result<Company, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Company>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn get(&self, _id: &CompanyId) -> Result<Option<Company>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(crate) struct UnavailableReviewStore;

impl ReviewStore for UnavailableReviewStore {
    fn create(&self, _review: NewReview) -> Result<Review, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list_by_company(&self, _company_id: &CompanyId) -> Result<Vec<Review>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Review>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
