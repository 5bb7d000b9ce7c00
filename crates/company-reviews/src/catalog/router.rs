use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::AggregatedCompanyView;
use super::intake::{CompanyPayload, ReviewSubmission};
use super::listing::{CompanyFilter, CompanyQuery, SortKey};
use super::service::{CatalogError, CatalogService};
use super::store::{CompanyStore, ReviewStore, StoreError};

/// Turns relative logo references into absolute URLs under a configured base.
#[derive(Debug, Clone)]
pub struct LogoResolver {
    base_url: Arc<str>,
}

impl LogoResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: Arc::from(base_url.trim().trim_end_matches('/')),
        }
    }

    pub fn resolve(&self, logo: &str) -> String {
        if logo.starts_with('/') {
            format!("{}{}", self.base_url, logo)
        } else {
            format!("{}/{}", self.base_url, logo)
        }
    }
}

pub struct CatalogState<C, R> {
    service: Arc<CatalogService<C, R>>,
    logos: LogoResolver,
}

impl<C, R> Clone for CatalogState<C, R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            logos: self.logos.clone(),
        }
    }
}

/// Router builder exposing the company and review endpoints.
pub fn catalog_router<C, R>(service: Arc<CatalogService<C, R>>, logos: LogoResolver) -> Router
where
    C: CompanyStore + 'static,
    R: ReviewStore + 'static,
{
    Router::new()
        .route(
            "/api/companies",
            get(list_companies_handler::<C, R>).post(create_company_handler::<C, R>),
        )
        .route("/api/companies/cities", get(city_options_handler::<C, R>))
        .route(
            "/api/companies/:company_id",
            get(company_detail_handler::<C, R>),
        )
        .route("/api/reviews", post(submit_review_handler::<C, R>))
        .route(
            "/api/reviews/:company_id",
            get(list_reviews_handler::<C, R>),
        )
        .with_state(CatalogState { service, logos })
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListCompaniesParams {
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) city: Option<String>,
    #[serde(default)]
    pub(crate) sort: Option<String>,
}

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
}

fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(Envelope {
            success: true,
            data,
        }),
    )
        .into_response()
}

fn failure(status: StatusCode, message: String) -> Response {
    let payload = json!({
        "success": false,
        "message": message,
    });
    (status, Json(payload)).into_response()
}

/// Malformed or mistyped JSON bodies keep axum's status but use the shared envelope.
fn rejection_response(rejection: JsonRejection) -> Response {
    failure(rejection.status(), rejection.body_text())
}

fn error_response(err: CatalogError) -> Response {
    let status = match &err {
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::InvalidReview(_) | CatalogError::InvalidCompany(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CatalogError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
        CatalogError::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!(error = %err, "catalog request failed");
    }
    failure(status, err.to_string())
}

/// Company payload with the logo resolved to a fetchable URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompanyResponse {
    #[serde(flatten)]
    pub(crate) view: AggregatedCompanyView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) logo_url: Option<String>,
}

impl CompanyResponse {
    fn new(view: AggregatedCompanyView, logos: &LogoResolver) -> Self {
        let logo_url = view
            .company
            .logo
            .as_deref()
            .map(|logo| logos.resolve(logo));
        Self { view, logo_url }
    }
}

pub(crate) async fn list_companies_handler<C, R>(
    State(state): State<CatalogState<C, R>>,
    Query(params): Query<ListCompaniesParams>,
) -> Response
where
    C: CompanyStore + 'static,
    R: ReviewStore + 'static,
{
    let sort = match params.sort.as_deref().map(str::parse::<SortKey>).transpose() {
        Ok(sort) => sort.unwrap_or_default(),
        Err(err) => return failure(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
    };
    let query = CompanyQuery {
        filter: CompanyFilter {
            name_contains: params.search,
            city: params.city,
        },
        sort,
    };

    match state.service.list_companies(&query) {
        Ok(views) => {
            let companies: Vec<CompanyResponse> = views
                .into_iter()
                .map(|view| CompanyResponse::new(view, &state.logos))
                .collect();
            success(StatusCode::OK, companies)
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn company_detail_handler<C, R>(
    State(state): State<CatalogState<C, R>>,
    Path(company_id): Path<String>,
) -> Response
where
    C: CompanyStore + 'static,
    R: ReviewStore + 'static,
{
    match state.service.get_company_detail(&company_id) {
        Ok(view) => success(StatusCode::OK, CompanyResponse::new(view, &state.logos)),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn city_options_handler<C, R>(State(state): State<CatalogState<C, R>>) -> Response
where
    C: CompanyStore + 'static,
    R: ReviewStore + 'static,
{
    match state.service.city_options() {
        Ok(cities) => success(StatusCode::OK, cities),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_company_handler<C, R>(
    State(state): State<CatalogState<C, R>>,
    payload: Result<Json<CompanyPayload>, JsonRejection>,
) -> Response
where
    C: CompanyStore + 'static,
    R: ReviewStore + 'static,
{
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    match state.service.create_company(payload) {
        Ok(view) => success(StatusCode::CREATED, CompanyResponse::new(view, &state.logos)),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_review_handler<C, R>(
    State(state): State<CatalogState<C, R>>,
    submission: Result<Json<ReviewSubmission>, JsonRejection>,
) -> Response
where
    C: CompanyStore + 'static,
    R: ReviewStore + 'static,
{
    let Json(submission) = match submission {
        Ok(submission) => submission,
        Err(rejection) => return rejection_response(rejection),
    };
    match state.service.submit_review(submission) {
        Ok(review) => success(StatusCode::CREATED, review),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_reviews_handler<C, R>(
    State(state): State<CatalogState<C, R>>,
    Path(company_id): Path<String>,
) -> Response
where
    C: CompanyStore + 'static,
    R: ReviewStore + 'static,
{
    match state.service.list_reviews(&company_id) {
        Ok(reviews) => success(StatusCode::OK, reviews),
        Err(err) => error_response(err),
    }
}

#[cfg(test)]
pub(crate) fn state_for_tests<C, R>(
    service: Arc<CatalogService<C, R>>,
    logos: LogoResolver,
) -> CatalogState<C, R> {
    CatalogState { service, logos }
}
