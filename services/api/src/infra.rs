use company_reviews::catalog::{
    CatalogImporter, Company, InMemoryCompanyStore, InMemoryReviewStore, Review,
};
use company_reviews::config::SeedConfig;
use company_reviews::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Reads the optional company and review exports. A missing path yields an empty set.
pub(crate) fn load_seed_records(
    companies_csv: Option<&Path>,
    reviews_csv: Option<&Path>,
) -> Result<(Vec<Company>, Vec<Review>), AppError> {
    let companies = match companies_csv {
        Some(path) => CatalogImporter::companies_from_path(path)?,
        None => Vec::new(),
    };
    let reviews = match reviews_csv {
        Some(path) => CatalogImporter::reviews_from_path(path)?,
        None => Vec::new(),
    };
    Ok((companies, reviews))
}

pub(crate) fn seeded_stores(
    seed: &SeedConfig,
) -> Result<(InMemoryCompanyStore, InMemoryReviewStore), AppError> {
    let (companies, reviews) =
        load_seed_records(seed.companies_csv.as_deref(), seed.reviews_csv.as_deref())?;

    info!(
        companies = companies.len(),
        reviews = reviews.len(),
        "catalog stores seeded"
    );

    Ok((
        InMemoryCompanyStore::with_companies(companies)?,
        InMemoryReviewStore::with_reviews(reviews)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use company_reviews::catalog::{CompanyStore, ReviewStore};

    #[test]
    fn empty_seed_config_yields_empty_stores() {
        let (companies, reviews) = seeded_stores(&SeedConfig::default()).expect("stores build");
        assert!(companies.list().expect("companies").is_empty());
        assert!(reviews.list().expect("reviews").is_empty());
    }

    #[test]
    fn missing_seed_file_is_an_import_error() {
        let seed = SeedConfig {
            companies_csv: Some("does/not/exist.csv".into()),
            reviews_csv: None,
        };
        assert!(matches!(seeded_stores(&seed), Err(AppError::Import(_))));
    }
}
