//! Impacted-item ranking: clients, devices, interfaces, or applications hit
//! by a metric's degradation, ordered by their share of the total impact.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::models::ImpactedItems;
use crate::sle::{duration, SleService};
use crate::upstream::UpstreamError;

/// Kind of impacted item to rank. Each kind maps to its own upstream
/// endpoint and response key; the wired and wireless client endpoints share
/// the `clients` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Gateways,
    Interfaces,
    Applications,
    Clients,
    WirelessClients,
}

impl ItemType {
    pub const ALL: [ItemType; 5] = [
        ItemType::Gateways,
        ItemType::Interfaces,
        ItemType::Applications,
        ItemType::Clients,
        ItemType::WirelessClients,
    ];

    /// Path segment of the upstream endpoint serving this kind.
    pub fn endpoint_segment(self) -> &'static str {
        match self {
            ItemType::Gateways => "impacted-gateways",
            ItemType::Interfaces => "impacted-interfaces",
            ItemType::Applications => "impacted-applications",
            ItemType::Clients => "impacted-wired-clients",
            ItemType::WirelessClients => "impacted-clients",
        }
    }

    /// Key holding the item array in the upstream response.
    pub fn response_key(self) -> &'static str {
        match self {
            ItemType::Gateways => "gateways",
            ItemType::Interfaces => "interfaces",
            ItemType::Applications => "apps",
            ItemType::Clients | ItemType::WirelessClients => "clients",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Gateways => "gateways",
            ItemType::Interfaces => "interfaces",
            ItemType::Applications => "applications",
            ItemType::Clients => "clients",
            ItemType::WirelessClients => "wireless_clients",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error(
    "invalid item type '{0}': must be one of gateways, interfaces, applications, clients, wireless_clients"
)]
pub struct InvalidItemType(pub String);

impl FromStr for ItemType {
    type Err = InvalidItemType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gateways" => Ok(ItemType::Gateways),
            "interfaces" => Ok(ItemType::Interfaces),
            "applications" => Ok(ItemType::Applications),
            "clients" => Ok(ItemType::Clients),
            "wireless_clients" => Ok(ItemType::WirelessClients),
            other => Err(InvalidItemType(other.to_string())),
        }
    }
}

impl SleService {
    /// Ranked impacted items for one metric, optionally restricted to a
    /// single classifier.
    pub async fn impacted_items(
        &self,
        site_id: &str,
        metric: &str,
        item_type: ItemType,
        classifier: Option<&str>,
        duration_token: &str,
    ) -> Result<ImpactedItems, UpstreamError> {
        // This endpoint family accepts longer windows than the trend
        // endpoints, so the token goes through as-is.
        let window = duration::TimeWindow::Duration(duration_token.to_string());
        let raw = self
            .upstream()
            .list_impacted_items(site_id, metric, item_type, classifier, &window)
            .await?;

        let items: Vec<Value> = raw
            .get(item_type.response_key())
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let total_count = raw
            .get("total_count")
            .and_then(Value::as_u64)
            .unwrap_or(items.len() as u64);

        Ok(ImpactedItems {
            metric: metric.to_string(),
            classifier: classifier.map(str::to_string),
            total_count,
            items: rank(items),
        })
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn degraded_of(item: &Value) -> f64 {
    item.get("degraded").and_then(Value::as_f64).unwrap_or(0.0)
}

/// Annotate each item with `failure_rate` and `overall_impact` percentages
/// and order by overall impact, worst first. All upstream fields are kept.
pub(crate) fn rank(items: Vec<Value>) -> Vec<Value> {
    let degraded_total: f64 = items.iter().map(degraded_of).sum();

    let mut ranked: Vec<Value> = items
        .into_iter()
        .map(|mut item| {
            let degraded = degraded_of(&item);
            let total = item.get("total").and_then(Value::as_f64).unwrap_or(0.0);
            let failure_rate = if total > 0.0 {
                round1(degraded / total * 100.0)
            } else {
                0.0
            };
            let overall_impact = if degraded_total > 0.0 {
                round1(degraded / degraded_total * 100.0)
            } else {
                0.0
            };
            if let Some(obj) = item.as_object_mut() {
                obj.insert("failure_rate".to_string(), failure_rate.into());
                obj.insert("overall_impact".to_string(), overall_impact.into());
            }
            item
        })
        .collect();

    ranked.sort_by(|a, b| {
        let impact = |v: &Value| v.get("overall_impact").and_then(Value::as_f64).unwrap_or(0.0);
        impact(b).partial_cmp(&impact(a)).unwrap_or(Ordering::Equal)
    });
    ranked
}
