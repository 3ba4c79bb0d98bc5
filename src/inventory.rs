//! Device inventory for a site: the health rollup across device types and
//! the normalized device listing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::upstream::{UpstreamClient, UpstreamError};

const DEVICE_TYPES: &[&str] = &["ap", "switch", "gateway"];

/// Connected/disconnected counts for one device type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeviceTypeHealth {
    pub total: u64,
    pub connected: u64,
    pub disconnected: u64,
}

/// Inventory health across the three device types of a site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SiteDeviceHealth {
    pub ap: DeviceTypeHealth,
    pub switch: DeviceTypeHealth,
    pub gateway: DeviceTypeHealth,
    /// Share of all devices currently connected, one decimal. 0.0 when the
    /// site has no devices.
    pub health_percentage: f64,
}

impl SiteDeviceHealth {
    fn finalize(&mut self) {
        let total = self.ap.total + self.switch.total + self.gateway.total;
        let connected = self.ap.connected + self.switch.connected + self.gateway.connected;
        self.health_percentage = if total > 0 {
            (connected as f64 / total as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };
    }
}

/// Roll up device statistics for a site. A failed fetch for one device type
/// leaves its counters at zero instead of failing the rollup.
pub async fn site_device_health(
    upstream: &dyn UpstreamClient,
    site_id: &str,
) -> Result<SiteDeviceHealth, UpstreamError> {
    let mut health = SiteDeviceHealth::default();
    for device_type in DEVICE_TYPES {
        let counts = match upstream.list_device_stats(site_id, device_type).await {
            Ok(devices) => tally(&devices),
            Err(error) => {
                tracing::warn!(site_id, device_type, %error, "device stats fetch failed");
                DeviceTypeHealth::default()
            }
        };
        match *device_type {
            "ap" => health.ap = counts,
            "switch" => health.switch = counts,
            _ => health.gateway = counts,
        }
    }
    health.finalize();
    Ok(health)
}

/// One device row of the site inventory listing, reduced to the fields the
/// dashboard renders.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeviceSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub mac: String,
    pub model: String,
    pub status: String,
    pub ip: String,
    pub version: String,
    pub uptime: i64,
    pub last_seen: i64,
    pub cpu_util: i64,
    pub mem_total_kb: i64,
    pub mem_used_kb: i64,
}

/// Devices of a site, optionally filtered by type (`ap`, `switch`,
/// `gateway`, or `all`).
pub async fn site_devices(
    upstream: &dyn UpstreamClient,
    site_id: &str,
    device_type: &str,
) -> Result<Vec<DeviceSummary>, UpstreamError> {
    let rows = upstream.list_device_stats(site_id, device_type).await?;
    Ok(rows.iter().map(summarize).collect())
}

fn summarize(row: &Value) -> DeviceSummary {
    DeviceSummary {
        id: text(row, "id"),
        name: text(row, "name").unwrap_or_else(|| "Unknown".to_string()),
        device_type: text(row, "type").unwrap_or_else(|| "unknown".to_string()),
        mac: text(row, "mac").unwrap_or_default(),
        model: text(row, "model").unwrap_or_default(),
        status: text(row, "status").unwrap_or_else(|| "unknown".to_string()),
        ip: text(row, "ip").unwrap_or_default(),
        version: text(row, "version").unwrap_or_default(),
        uptime: int(row, "uptime"),
        last_seen: int(row, "last_seen"),
        cpu_util: int(row, "cpu_util"),
        mem_total_kb: int(row, "mem_total_kb"),
        mem_used_kb: int(row, "mem_used_kb"),
    }
}

fn text(row: &Value, key: &str) -> Option<String> {
    row.get(key).and_then(Value::as_str).map(str::to_string)
}

fn int(row: &Value, key: &str) -> i64 {
    row.get(key).and_then(Value::as_i64).unwrap_or(0)
}

/// Anything not reporting `status: "connected"` counts as disconnected.
fn tally(devices: &[Value]) -> DeviceTypeHealth {
    let total = devices.len() as u64;
    let connected = devices
        .iter()
        .filter(|d| d.get("status").and_then(Value::as_str) == Some("connected"))
        .count() as u64;
    DeviceTypeHealth {
        total,
        connected,
        disconnected: total - connected,
    }
}
