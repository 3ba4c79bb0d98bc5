//! # SLE API Handlers
//!
//! Site-scoped SLE endpoints: score rollup, classifier details, impacted
//! items, and CSV export.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::catalog::Category;
use crate::error::{validation_error, ApiError};
use crate::models::{CategoryDetails, ClassifierImpactDetails, ImpactedItems, SiteSle};
use crate::server::AppState;
use crate::sle::duration;
use crate::sle::impacted::ItemType;

/// Common query parameters for SLE endpoints.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SleQuery {
    /// Time range token. Unrecognized values fall back to one day.
    pub duration: Option<String>,
}

/// Query parameters for the impacted-items endpoint.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ImpactedQuery {
    /// Time range token, e.g. 1d, 7d, 2w.
    pub duration: Option<String>,
    /// Restrict the listing to a single classifier.
    pub classifier: Option<String>,
}

/// Site SLE rollup envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SiteSleResponse {
    pub success: bool,
    pub sle: SiteSle,
    /// The duration actually applied, after clamping.
    pub duration: String,
}

fn parse_category(raw: &str) -> Result<Category, ApiError> {
    raw.parse().map_err(|_| {
        validation_error(
            &format!("Invalid category '{raw}'. Must be one of: wifi, wired, wan"),
            json!({ "category": raw }),
        )
    })
}

/// SLE scores for all categories of one site.
#[utoipa::path(
    get,
    path = "/api/sites/{site_id}/sle",
    params(
        ("site_id" = String, Path, description = "Site ID"),
        SleQuery
    ),
    responses(
        (status = 200, description = "Per-category SLE scores", body = SiteSleResponse),
        (status = 502, description = "Upstream error", body = ApiError)
    ),
    tag = "sle"
)]
pub async fn site_sle(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Query(query): Query<SleQuery>,
) -> Result<Json<SiteSleResponse>, ApiError> {
    let duration = duration::clamp(query.duration.as_deref().unwrap_or("1d"), duration::SITE_TOKENS);
    let sle = state.sle.site_sle(&site_id, duration).await?;
    Ok(Json(SiteSleResponse {
        success: true,
        sle,
        duration: duration.to_string(),
    }))
}

/// Classifier breakdown for one category of a site.
#[utoipa::path(
    get,
    path = "/api/sites/{site_id}/sle/{category}",
    params(
        ("site_id" = String, Path, description = "Site ID"),
        ("category" = String, Path, description = "SLE category: wifi, wired, or wan"),
        SleQuery
    ),
    responses(
        (status = 200, description = "Metric and classifier details", body = CategoryDetails),
        (status = 400, description = "Invalid category", body = ApiError),
        (status = 502, description = "Upstream error", body = ApiError)
    ),
    tag = "sle"
)]
pub async fn category_details(
    State(state): State<AppState>,
    Path((site_id, category)): Path<(String, String)>,
    Query(query): Query<SleQuery>,
) -> Result<Json<CategoryDetails>, ApiError> {
    let category = parse_category(&category)?;
    let duration = duration::clamp(query.duration.as_deref().unwrap_or("1d"), duration::SITE_TOKENS);
    let details = state.sle.category_details(&site_id, category, duration).await?;
    Ok(Json(details))
}

/// Classifier breakdown for one category, rendered as a CSV download.
#[utoipa::path(
    get,
    path = "/api/sites/{site_id}/sle/{category}/csv",
    params(
        ("site_id" = String, Path, description = "Site ID"),
        ("category" = String, Path, description = "SLE category: wifi, wired, or wan"),
        SleQuery
    ),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv"),
        (status = 400, description = "Invalid category", body = ApiError),
        (status = 502, description = "Upstream error", body = ApiError)
    ),
    tag = "sle"
)]
pub async fn export_csv(
    State(state): State<AppState>,
    Path((site_id, category)): Path<(String, String)>,
    Query(query): Query<SleQuery>,
) -> Result<Response, ApiError> {
    let category = parse_category(&category)?;
    let duration = duration::clamp(query.duration.as_deref().unwrap_or("1d"), duration::SITE_TOKENS);
    let export = state
        .sle
        .export_category_csv(&site_id, category, duration)
        .await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", export.filename),
            ),
        ],
        export.content,
    )
        .into_response())
}

/// Root-cause breakdown for one classifier of a metric.
///
/// Degraded elements grouped by AP, WLAN, device type, OS, and band. An
/// upstream failure yields empty lists rather than an error status.
#[utoipa::path(
    get,
    path = "/api/sites/{site_id}/sle/impact/{metric}/{classifier}",
    params(
        ("site_id" = String, Path, description = "Site ID"),
        ("metric" = String, Path, description = "SLE metric name"),
        ("classifier" = String, Path, description = "Classifier name"),
        SleQuery
    ),
    responses(
        (status = 200, description = "Impact breakdown", body = ClassifierImpactDetails)
    ),
    tag = "sle"
)]
pub async fn classifier_impact(
    State(state): State<AppState>,
    Path((site_id, metric, classifier)): Path<(String, String, String)>,
    Query(query): Query<SleQuery>,
) -> Json<ClassifierImpactDetails> {
    let duration = duration::clamp(query.duration.as_deref().unwrap_or("1d"), duration::SITE_TOKENS);
    Json(
        state
            .sle
            .classifier_impact(&site_id, &metric, &classifier, duration)
            .await,
    )
}

/// Ranked impacted items for one metric of a site.
///
/// The item type is validated before any upstream work.
#[utoipa::path(
    get,
    path = "/api/sites/{site_id}/sle/{metric}/impacted/{item_type}",
    params(
        ("site_id" = String, Path, description = "Site ID"),
        ("metric" = String, Path, description = "SLE metric name"),
        ("item_type" = String, Path,
            description = "gateways, interfaces, applications, clients, or wireless_clients"),
        ImpactedQuery
    ),
    responses(
        (status = 200, description = "Ranked impacted items", body = ImpactedItems),
        (status = 400, description = "Invalid item type", body = ApiError),
        (status = 502, description = "Upstream error", body = ApiError)
    ),
    tag = "sle"
)]
pub async fn impacted_items(
    State(state): State<AppState>,
    Path((site_id, metric, item_type)): Path<(String, String, String)>,
    Query(query): Query<ImpactedQuery>,
) -> Result<Json<ImpactedItems>, ApiError> {
    let item_type: ItemType = item_type.parse().map_err(|error| {
        validation_error(&format!("{error}"), json!({ "item_type": item_type }))
    })?;
    let duration = query.duration.as_deref().unwrap_or("1d");
    let items = state
        .sle
        .impacted_items(
            &site_id,
            &metric,
            item_type,
            query.classifier.as_deref(),
            duration,
        )
        .await?;
    Ok(Json(items))
}
