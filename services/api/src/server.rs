use crate::cli::ServeArgs;
use crate::infra::{seeded_stores, AppState};
use crate::routes::with_catalog_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use company_reviews::catalog::{CatalogService, LogoResolver};
use company_reviews::config::AppConfig;
use company_reviews::error::AppError;
use company_reviews::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (companies, reviews) = seeded_stores(&config.seed)?;
    let catalog = Arc::new(CatalogService::new(Arc::new(companies), Arc::new(reviews)));
    let logos = LogoResolver::new(&config.public.base_url);

    let app = with_catalog_routes(catalog, logos)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "company review catalog ready");

    axum::serve(listener, app).await?;
    Ok(())
}
