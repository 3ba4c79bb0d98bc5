//! # Site API Handlers
//!
//! Connection testing, site listing, the per-site device health rollup, and
//! the device inventory listing.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::inventory::{self, DeviceSummary, SiteDeviceHealth};
use crate::models::Site;
use crate::server::AppState;

/// Result of probing the upstream connection.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TestConnectionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Probe upstream connectivity and report the resolved organization.
///
/// A failed probe is the expected answer for a misconfigured token, so it
/// comes back as 200 with `success: false` rather than an error status.
#[utoipa::path(
    post,
    path = "/api/test-connection",
    responses(
        (status = 200, description = "Probe result", body = TestConnectionResponse)
    ),
    tag = "sites"
)]
pub async fn test_connection(State(state): State<AppState>) -> Json<TestConnectionResponse> {
    let upstream = state.sle.upstream();
    let org_id = match upstream.resolve_org().await {
        Ok(org_id) => org_id,
        Err(error) => {
            tracing::warn!(%error, "connection test failed");
            return Json(TestConnectionResponse {
                success: false,
                message: None,
                org_id: None,
                org_name: None,
                error: Some(error.to_string()),
            });
        }
    };
    let org_name = match upstream.org_name(&org_id).await {
        Ok(name) => name,
        Err(error) => {
            tracing::debug!(%error, "org name lookup failed");
            "Unknown".to_string()
        }
    };
    Json(TestConnectionResponse {
        success: true,
        message: Some("Connected to upstream API successfully".to_string()),
        org_id: Some(org_id),
        org_name: Some(org_name),
        error: None,
    })
}

/// Site listing envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SitesResponse {
    pub success: bool,
    pub sites: Vec<Site>,
}

/// List all sites of the organization, sorted by name.
#[utoipa::path(
    get,
    path = "/api/sites",
    responses(
        (status = 200, description = "Sites of the organization", body = SitesResponse),
        (status = 502, description = "Upstream error", body = ApiError),
        (status = 503, description = "Upstream not configured", body = ApiError)
    ),
    tag = "sites"
)]
pub async fn list_sites(State(state): State<AppState>) -> Result<Json<SitesResponse>, ApiError> {
    let upstream = state.sle.upstream();
    let org_id = upstream.resolve_org().await?;
    let mut sites = upstream.list_sites(&org_id).await?;
    sites.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::info!(count = sites.len(), "retrieved site list");
    Ok(Json(SitesResponse {
        success: true,
        sites,
    }))
}

/// Device health envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SiteHealthResponse {
    pub success: bool,
    pub health: SiteDeviceHealth,
}

/// Device inventory health rollup for one site.
#[utoipa::path(
    get,
    path = "/api/sites/{site_id}/health",
    params(
        ("site_id" = String, Path, description = "Site ID")
    ),
    responses(
        (status = 200, description = "Device health rollup", body = SiteHealthResponse),
        (status = 502, description = "Upstream error", body = ApiError)
    ),
    tag = "sites"
)]
pub async fn site_health(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<SiteHealthResponse>, ApiError> {
    let health = inventory::site_device_health(state.sle.upstream().as_ref(), &site_id).await?;
    Ok(Json(SiteHealthResponse {
        success: true,
        health,
    }))
}

/// Query parameters for the device listing.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DevicesQuery {
    /// Device type filter: ap, switch, gateway, or all.
    #[serde(rename = "type")]
    pub device_type: Option<String>,
}

/// Device listing envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DevicesResponse {
    pub success: bool,
    pub devices: Vec<DeviceSummary>,
}

/// Device inventory of one site.
#[utoipa::path(
    get,
    path = "/api/sites/{site_id}/devices",
    params(
        ("site_id" = String, Path, description = "Site ID"),
        DevicesQuery
    ),
    responses(
        (status = 200, description = "Devices of the site", body = DevicesResponse),
        (status = 502, description = "Upstream error", body = ApiError)
    ),
    tag = "sites"
)]
pub async fn list_devices(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Query(query): Query<DevicesQuery>,
) -> Result<Json<DevicesResponse>, ApiError> {
    let device_type = query.device_type.as_deref().unwrap_or("all");
    let devices =
        inventory::site_devices(state.sle.upstream().as_ref(), &site_id, device_type).await?;
    tracing::info!(site_id, count = devices.len(), "retrieved device list");
    Ok(Json(DevicesResponse {
        success: true,
        devices,
    }))
}
