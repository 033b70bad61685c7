use crate::cli::ServeArgs;
use crate::infra::{
    build_planner, load_catalog, load_rubric, open_listing_store, AppState,
    InMemoryAccreditationRepository,
};
use crate::routes::{app_router, Services};
use axum::http::{HeaderValue, Method};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use boardinghouse::accreditation::{AccreditationService, ClassificationThresholds};
use boardinghouse::config::{AppConfig, ConfigError};
use boardinghouse::error::AppError;
use boardinghouse::listings::ListingService;
use boardinghouse::prediction::LikelihoodHeuristic;
use boardinghouse::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

fn cors_layer(origin: &str) -> Result<CorsLayer, AppError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    if origin == "*" {
        return Ok(layer.allow_origin(Any));
    }

    let origin = HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidCorsOrigin {
        origin: origin.to_string(),
    })?;
    Ok(layer.allow_origin(origin))
}

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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let rubric = Arc::new(load_rubric(config.rubric_path.as_deref())?);
    let catalog = load_catalog(config.listings.catalog_csv.as_deref())?;
    let store = open_listing_store(config.listings.store_path.as_deref(), &catalog)?;
    let planner = build_planner(&config.routing)?;

    let services = Services {
        accreditations: Arc::new(AccreditationService::new(
            Arc::new(InMemoryAccreditationRepository::default()),
            rubric,
            ClassificationThresholds::default(),
        )),
        listings: Arc::new(ListingService::new(Arc::new(catalog), store)),
        planner,
        heuristic: Arc::new(LikelihoodHeuristic::new()?),
    };

    let app = app_router(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.cors_origin)?);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        routing = config.routing.backend.label(),
        "boarding-house accreditation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
