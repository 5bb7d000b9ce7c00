use super::common::*;
use std::sync::Arc;

use crate::catalog::domain::{CompanyId, Rating};
use crate::catalog::intake::{
    CompanyPayload, CompanyValidationError, RatingInput, ReviewSubmission, ReviewValidationError,
};
use crate::catalog::listing::{CompanyFilter, CompanyQuery, SortKey};
use crate::catalog::memory::{InMemoryCompanyStore, InMemoryReviewStore};
use crate::catalog::service::{CatalogError, CatalogService};
use crate::catalog::store::{CompanyStore, ReviewStore, StoreError};

fn submission(company_id: &str, rating: u8) -> ReviewSubmission {
    ReviewSubmission {
        company_id: Some(company_id.to_string()),
        full_name: Some("Jane".to_string()),
        subject: Some("Great".to_string()),
        review_text: Some("Loved it".to_string()),
        rating: Some(RatingInput::from(rating)),
    }
}

#[test]
fn single_submission_is_listed_and_aggregated() {
    let (service, _, _) = build_service();

    service
        .submit_review(submission("C1", 5))
        .expect("submission succeeds");

    let reviews = service.list_reviews("C1").expect("reviews listed");
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating.map(Rating::value), Some(5));
    assert_eq!(reviews[0].full_name, "Jane");

    let detail = service.get_company_detail("C1").expect("company exists");
    assert_eq!(detail.rating.review_count, 1);
    assert!((detail.rating.average_rating - 5.0).abs() < f64::EPSILON);
}

#[test]
fn two_submissions_average_to_four() {
    let (service, _, _) = build_service();

    service.submit_review(submission("C1", 3)).expect("first");
    service.submit_review(submission("C1", 5)).expect("second");

    let detail = service.get_company_detail("C1").expect("company exists");
    assert_eq!(detail.rating.review_count, 2);
    assert!((detail.rating.average_rating - 4.0).abs() < f64::EPSILON);
}

#[test]
fn detail_for_unknown_company_is_not_found() {
    let (service, _, _) = build_service();

    match service.get_company_detail("does-not-exist") {
        Err(CatalogError::NotFound(id)) => assert_eq!(id, "does-not-exist"),
        other => panic!("expected not found, got {other:?}"),
    }
    assert!(matches!(
        service.get_company_detail("../etc/passwd"),
        Err(CatalogError::NotFound(_))
    ));
}

#[test]
fn invalid_submission_writes_nothing() {
    let (service, _, reviews) = build_service();

    let mut payload = submission("C1", 5);
    payload.rating = Some(RatingInput::Number(7.0));

    match service.submit_review(payload) {
        Err(CatalogError::InvalidReview(ReviewValidationError::RatingOutOfRange(value))) => {
            assert_eq!(value, 7.0)
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(reviews.list().expect("list").is_empty());
}

#[test]
fn submission_for_unknown_company_is_rejected() {
    let (service, _, reviews) = build_service();

    assert!(matches!(
        service.submit_review(submission("ghost", 4)),
        Err(CatalogError::NotFound(id)) if id == "ghost"
    ));
    assert!(reviews.list().expect("list").is_empty());
}

#[test]
fn list_reviews_is_newest_first_and_scoped() {
    let (service, _, _) = build_service();

    let first = service.submit_review(submission("C1", 2)).expect("first");
    service.submit_review(submission("C2", 4)).expect("other company");
    let second = service.submit_review(submission("C1", 4)).expect("second");

    let reviews = service.list_reviews("C1").expect("reviews listed");
    let ids: Vec<_> = reviews.iter().map(|review| review.id.clone()).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    assert!(service.list_reviews("nobody").expect("empty list").is_empty());
}

#[test]
fn list_companies_applies_query_and_aggregates() {
    let (service, _, _) = build_service();
    service.submit_review(submission("C1", 2)).expect("review");
    service.submit_review(submission("C2", 5)).expect("review");

    let all = service
        .list_companies(&CompanyQuery::sorted_by(SortKey::Rating))
        .expect("listing");
    let ids: Vec<&str> = all.iter().map(|view| view.id().as_str()).collect();
    assert_eq!(ids, vec!["C2", "C1"]);

    let pune = service
        .list_companies(&CompanyQuery {
            filter: CompanyFilter {
                name_contains: None,
                city: Some("pune".to_string()),
            },
            sort: SortKey::Name,
        })
        .expect("listing");
    assert_eq!(pune.len(), 1);
    assert_eq!(pune[0].company.name, "Acme");
    assert_eq!(pune[0].rating.review_count, 1);
}

#[test]
fn create_company_validates_and_assigns_identity() {
    let (service, companies, _) = build_service();

    let created = service
        .create_company(CompanyPayload {
            name: Some("Initech".to_string()),
            city: Some("Austin".to_string()),
            founded_on: Some("1999-02-19".to_string()),
            ..CompanyPayload::default()
        })
        .expect("company created");

    assert!(created.id().as_str().starts_with("cmp-"));
    assert_eq!(created.rating.review_count, 0);
    assert_eq!(created.rating.average_rating, 0.0);
    assert_eq!(
        service.city_options().expect("cities"),
        vec!["Austin", "Delhi", "Pune"]
    );

    assert!(matches!(
        service.create_company(CompanyPayload::default()),
        Err(CatalogError::InvalidCompany(CompanyValidationError::MissingName))
    ));
    assert_eq!(companies.list().expect("list").len(), 3);
}

#[test]
fn store_failures_surface_as_store_errors() {
    let service = CatalogService::new(
        Arc::new(UnavailableCompanyStore),
        Arc::new(UnavailableReviewStore),
    );

    assert!(matches!(
        service.list_companies(&CompanyQuery::default()),
        Err(CatalogError::Store(StoreError::Unavailable(_)))
    ));
    assert!(matches!(
        service.get_company_detail("C1"),
        Err(CatalogError::Store(StoreError::Unavailable(_)))
    ));
    assert!(matches!(
        service.submit_review(submission("C1", 4)),
        Err(CatalogError::Store(StoreError::Unavailable(_)))
    ));
}

#[test]
fn review_store_failure_after_company_lookup_is_reported() {
    let companies = Arc::new(
        InMemoryCompanyStore::with_companies(vec![company("C1", "Acme")]).expect("seed"),
    );
    let service = CatalogService::new(companies, Arc::new(UnavailableReviewStore));

    assert!(matches!(
        service.submit_review(submission("C1", 4)),
        Err(CatalogError::Store(StoreError::Unavailable(_)))
    ));
    assert!(matches!(
        service.list_reviews("C1"),
        Err(CatalogError::Store(StoreError::Unavailable(_)))
    ));
}

#[test]
fn dangling_reviews_do_not_break_listing() {
    let companies = Arc::new(
        InMemoryCompanyStore::with_companies(vec![company("C1", "Acme")]).expect("seed"),
    );
    let reviews = Arc::new(
        InMemoryReviewStore::with_reviews(vec![review("C1", 4), review("removed", 1)])
            .expect("seed"),
    );
    let service = CatalogService::new(companies, reviews);

    let views = service
        .list_companies(&CompanyQuery::default())
        .expect("listing");
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].rating.review_count, 1);
    assert_eq!(views[0].id(), &CompanyId("C1".to_string()));
}
