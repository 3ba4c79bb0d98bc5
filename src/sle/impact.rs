//! Root-cause breakdown for one classifier of a metric: which APs, WLANs,
//! device types, operating systems, and radio bands carry the degradation.

use serde_json::Value;

use crate::models::{ClassifierImpactDetails, ImpactedElement};
use crate::sle::{duration, SleService};

impl SleService {
    /// Impact breakdown for one metric/classifier pair. Each dimension lists
    /// only elements with degraded samples in the window, worst first. An
    /// upstream failure degrades to empty lists rather than an error.
    pub async fn classifier_impact(
        &self,
        site_id: &str,
        metric: &str,
        classifier: &str,
        duration_token: &str,
    ) -> ClassifierImpactDetails {
        let window = duration::resolve(duration_token);
        let raw = match self
            .upstream()
            .sle_impact_summary(site_id, metric, classifier, &window)
            .await
        {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(site_id, metric, classifier, %error, "impact summary fetch failed");
                Value::Null
            }
        };
        breakdown(metric, classifier, &raw)
    }
}

fn breakdown(metric: &str, classifier: &str, raw: &Value) -> ClassifierImpactDetails {
    ClassifierImpactDetails {
        metric: metric.to_string(),
        classifier: classifier.to_string(),
        aps: elements(raw, "ap", |row| {
            let mac = text(row, "ap_mac");
            let name = text(row, "name")
                .or_else(|| mac.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            (name, mac)
        }),
        wlans: elements(raw, "wlan", |row| {
            (
                text(row, "name").unwrap_or_else(|| "Unknown".to_string()),
                text(row, "wlan_id"),
            )
        }),
        device_types: elements(raw, "device_type", |row| {
            let name = text(row, "device_type")
                .or_else(|| text(row, "name"))
                .unwrap_or_else(|| "Unknown".to_string());
            (name, None)
        }),
        device_os: elements(raw, "device_os", |row| {
            let name = text(row, "device_os")
                .or_else(|| text(row, "name"))
                .unwrap_or_else(|| "Unknown".to_string());
            (name, None)
        }),
        bands: elements(raw, "band", |row| {
            let raw_band = text(row, "band")
                .or_else(|| text(row, "name"))
                .unwrap_or_else(|| "Unknown".to_string());
            (band_label(&raw_band), None)
        }),
    }
}

/// Collect one dimension's rows, dropping elements without degradation and
/// sorting by degraded count descending.
fn elements<F>(raw: &Value, key: &str, describe: F) -> Vec<ImpactedElement>
where
    F: Fn(&Value) -> (String, Option<String>),
{
    let mut items: Vec<ImpactedElement> = raw
        .get(key)
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    let degraded = row.get("degraded").and_then(Value::as_i64).unwrap_or(0);
                    if degraded <= 0 {
                        return None;
                    }
                    let (name, id) = describe(row);
                    Some(ImpactedElement {
                        name,
                        id,
                        degraded,
                        total: row.get("total").and_then(Value::as_i64).unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    items.sort_by(|a, b| b.degraded.cmp(&a.degraded));
    items
}

fn text(row: &Value, key: &str) -> Option<String> {
    row.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Radio band identifiers come back as bare numbers.
fn band_label(band: &str) -> String {
    match band {
        "24" => "2.4 GHz".to_string(),
        "5" => "5 GHz".to_string(),
        "6" => "6 GHz".to_string(),
        other => other.to_string(),
    }
}
