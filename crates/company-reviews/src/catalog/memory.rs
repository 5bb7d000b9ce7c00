//! Mutex-backed stores used by the service binary, the CLI report and tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{Company, CompanyId, NewCompany, NewReview, Review, ReviewId};
use super::store::{CompanyStore, ReviewStore, StoreError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
}

#[derive(Default, Clone)]
pub struct InMemoryCompanyStore {
    records: Arc<Mutex<Vec<Company>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryCompanyStore {
    /// Seeds the store with existing records, rejecting duplicate identifiers.
    pub fn with_companies(companies: Vec<Company>) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        for company in &companies {
            if !seen.insert(company.id.clone()) {
                return Err(StoreError::Conflict(company.id.0.clone()));
            }
        }

        Ok(Self {
            records: Arc::new(Mutex::new(companies)),
            sequence: Arc::default(),
        })
    }

    fn next_id(&self, records: &[Company]) -> CompanyId {
        loop {
            let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
            let candidate = CompanyId(format!("cmp-{n:06}"));
            if !records.iter().any(|company| company.id == candidate) {
                return candidate;
            }
        }
    }
}

impl CompanyStore for InMemoryCompanyStore {
    fn create(&self, company: NewCompany) -> Result<Company, StoreError> {
        let mut guard = lock(&self.records)?;
        let now = Utc::now();
        let record = Company {
            id: self.next_id(&guard),
            name: company.name,
            logo: company.logo,
            location: company.location,
            city: company.city,
            founded_on: company.founded_on,
            description: company.description,
            created_at: now,
            updated_at: now,
        };
        guard.push(record.clone());
        Ok(record)
    }

    fn list(&self) -> Result<Vec<Company>, StoreError> {
        Ok(lock(&self.records)?.clone())
    }

    fn get(&self, id: &CompanyId) -> Result<Option<Company>, StoreError> {
        let guard = lock(&self.records)?;
        Ok(guard.iter().find(|company| &company.id == id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryReviewStore {
    records: Arc<Mutex<Vec<Review>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryReviewStore {
    pub fn with_reviews(reviews: Vec<Review>) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        for review in &reviews {
            if !seen.insert(review.id.clone()) {
                return Err(StoreError::Conflict(review.id.0.clone()));
            }
        }

        Ok(Self {
            records: Arc::new(Mutex::new(reviews)),
            sequence: Arc::default(),
        })
    }

    fn next_id(&self, records: &[Review]) -> ReviewId {
        loop {
            let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
            let candidate = ReviewId(format!("rev-{n:06}"));
            if !records.iter().any(|review| review.id == candidate) {
                return candidate;
            }
        }
    }
}

impl ReviewStore for InMemoryReviewStore {
    fn create(&self, review: NewReview) -> Result<Review, StoreError> {
        let mut guard = lock(&self.records)?;
        let now = Utc::now();
        let record = Review {
            id: self.next_id(&guard),
            company_id: review.company_id,
            full_name: review.full_name,
            subject: review.subject,
            review_text: review.review_text,
            rating: review.rating,
            created_at: now,
            updated_at: now,
        };
        guard.push(record.clone());
        Ok(record)
    }

    fn list_by_company(&self, company_id: &CompanyId) -> Result<Vec<Review>, StoreError> {
        let guard = lock(&self.records)?;
        // Later inserts first, so equal timestamps still come out newest first.
        let mut reviews: Vec<Review> = guard
            .iter()
            .rev()
            .filter(|review| &review.company_id == company_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    fn list(&self) -> Result<Vec<Review>, StoreError> {
        Ok(lock(&self.records)?.clone())
    }
}
