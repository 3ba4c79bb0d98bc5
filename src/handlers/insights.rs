//! # Org Insights Handlers
//!
//! Org-wide worst-site rankings, by category or by explicit metric.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::catalog::Category;
use crate::error::{validation_error, ApiError};
use crate::models::WorstSitesResponse;
use crate::server::AppState;
use crate::sle::duration;

const DEFAULT_LIMIT: usize = 100;

/// Query parameters for the ranking endpoints.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct InsightsQuery {
    /// Time range token. Unrecognized values fall back to one day.
    pub duration: Option<String>,
    /// Maximum number of sites to return (default: 100).
    pub limit: Option<usize>,
}

/// Worst sites of the organization for one SLE category.
///
/// An upstream failure comes back as 500 with the failure recorded in the
/// envelope, so the dashboard panel can render the error inline.
#[utoipa::path(
    get,
    path = "/api/org/sle/{sle_type}",
    params(
        ("sle_type" = String, Path, description = "SLE category: wifi, wired, or wan"),
        InsightsQuery
    ),
    responses(
        (status = 200, description = "Ranked worst sites", body = WorstSitesResponse),
        (status = 400, description = "Invalid category", body = ApiError),
        (status = 500, description = "Upstream failure envelope", body = WorstSitesResponse)
    ),
    tag = "insights"
)]
pub async fn worst_sites_by_category(
    State(state): State<AppState>,
    Path(sle_type): Path<String>,
    Query(query): Query<InsightsQuery>,
) -> Result<(StatusCode, Json<WorstSitesResponse>), ApiError> {
    let category: Category = sle_type.parse().map_err(|_| {
        validation_error(
            &format!("Invalid sle_type '{sle_type}'. Must be one of: wifi, wired, wan"),
            json!({ "sle_type": sle_type }),
        )
    })?;
    let duration = duration::clamp(query.duration.as_deref().unwrap_or("1d"), duration::ORG_TOKENS);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let response = state.sle.worst_sites(category, duration, limit).await;
    Ok(envelope_status(response))
}

/// Worst sites of the organization for one specific metric.
///
/// The metric name is not validated against the catalog; the upstream
/// supports more metrics than the dashboard displays.
#[utoipa::path(
    get,
    path = "/api/org/sle/{sle_type}/metric/{metric}",
    params(
        ("sle_type" = String, Path, description = "SLE category: wifi, wired, or wan"),
        ("metric" = String, Path, description = "SLE metric name"),
        InsightsQuery
    ),
    responses(
        (status = 200, description = "Ranked worst sites", body = WorstSitesResponse),
        (status = 400, description = "Invalid category", body = ApiError),
        (status = 500, description = "Upstream failure envelope", body = WorstSitesResponse)
    ),
    tag = "insights"
)]
pub async fn worst_sites_by_metric(
    State(state): State<AppState>,
    Path((sle_type, metric)): Path<(String, String)>,
    Query(query): Query<InsightsQuery>,
) -> Result<(StatusCode, Json<WorstSitesResponse>), ApiError> {
    let _: Category = sle_type.parse().map_err(|_| {
        validation_error(
            &format!("Invalid sle_type '{sle_type}'. Must be one of: wifi, wired, wan"),
            json!({ "sle_type": sle_type }),
        )
    })?;
    let duration = duration::clamp(
        query.duration.as_deref().unwrap_or("1d"),
        duration::ORG_METRIC_TOKENS,
    );
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let response = state.sle.worst_sites_by_metric(&metric, duration, limit).await;
    Ok(envelope_status(response))
}

fn envelope_status(response: WorstSitesResponse) -> (StatusCode, Json<WorstSitesResponse>) {
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response))
}
