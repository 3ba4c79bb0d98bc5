//! # Server Configuration
//!
//! This module contains the server setup and configuration for the SLE
//! Dashboard API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers;
use crate::sle::SleService;
use crate::telemetry;
use crate::upstream::UpstreamClient;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sle: SleService,
}

impl AppState {
    pub fn new(config: AppConfig, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self {
            config,
            sle: SleService::new(upstream),
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/test-connection", post(handlers::sites::test_connection))
        .route("/api/sites", get(handlers::sites::list_sites))
        .route("/api/sites/{site_id}/health", get(handlers::sites::site_health))
        .route("/api/sites/{site_id}/devices", get(handlers::sites::list_devices))
        .route("/api/sites/{site_id}/sle", get(handlers::sle::site_sle))
        .route(
            "/api/sites/{site_id}/sle/impact/{metric}/{classifier}",
            get(handlers::sle::classifier_impact),
        )
        .route(
            "/api/sites/{site_id}/sle/{selector}",
            get(handlers::sle::category_details),
        )
        .route(
            "/api/sites/{site_id}/sle/{selector}/csv",
            get(handlers::sle::export_csv),
        )
        .route(
            "/api/sites/{site_id}/sle/{selector}/impacted/{item_type}",
            get(handlers::sle::impacted_items),
        )
        .route(
            "/api/org/sle/{sle_type}",
            get(handlers::insights::worst_sites_by_category),
        )
        .route(
            "/api/org/sle/{sle_type}/metric/{metric}",
            get(handlers::insights::worst_sites_by_metric),
        )
        .layer(axum::middleware::from_fn(telemetry::trace_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    upstream: Arc<dyn UpstreamClient>,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = config.profile.clone();
    let state = AppState::new(config.clone(), upstream);
    let app = create_app(state);

    // Resolve the configured bind address
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::sites::test_connection,
        crate::handlers::sites::list_sites,
        crate::handlers::sites::site_health,
        crate::handlers::sites::list_devices,
        crate::handlers::sle::site_sle,
        crate::handlers::sle::category_details,
        crate::handlers::sle::classifier_impact,
        crate::handlers::sle::export_csv,
        crate::handlers::sle::impacted_items,
        crate::handlers::insights::worst_sites_by_category,
        crate::handlers::insights::worst_sites_by_metric,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::Site,
            crate::models::SiteSle,
            crate::models::CategoryResult,
            crate::models::CategoryDetails,
            crate::models::MetricDetail,
            crate::models::ClassifierInfo,
            crate::models::ClassifierImpact,
            crate::models::ClassifierImpactDetails,
            crate::models::ImpactedElement,
            crate::models::ImpactedItems,
            crate::inventory::DeviceSummary,
            crate::models::WorstSite,
            crate::models::WorstSitesResponse,
            crate::inventory::SiteDeviceHealth,
            crate::inventory::DeviceTypeHealth,
            crate::error::ApiError,
        )
    ),
    info(
        title = "SLE Dashboard API",
        description = "Service level experience aggregation over the upstream network controller",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
