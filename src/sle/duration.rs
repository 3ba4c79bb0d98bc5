//! Time-window handling for SLE queries.
//!
//! The upstream API takes either a named `duration` token or an explicit
//! `start`/`end` epoch pair, and different endpoints accept different token
//! sets. All normalization lives here so handlers and the engine deal in one
//! type.

use chrono::Utc;

/// A resolved query window, ready to encode onto an upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeWindow {
    /// Named duration token passed through to the upstream (`1h`, `1d`, `1w`).
    Duration(String),
    /// Explicit epoch-seconds range.
    Range { start: i64, end: i64 },
}

impl TimeWindow {
    /// Query pairs for this window.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            TimeWindow::Duration(d) => vec![("duration", d.clone())],
            TimeWindow::Range { start, end } => vec![
                ("start", start.to_string()),
                ("end", end.to_string()),
            ],
        }
    }
}

/// Duration tokens passed through to site-scoped SLE endpoints unchanged.
const PASSTHROUGH: &[&str] = &["1h", "1d", "1w"];

/// Tokens accepted by site-scoped SLE queries.
pub const SITE_TOKENS: &[&str] = &["10m", "1h", "today", "1d", "1w"];
/// Tokens accepted by the org ranking by category.
pub const ORG_TOKENS: &[&str] = &["1d", "7d", "2w"];
/// Tokens accepted by the org ranking by metric.
pub const ORG_METRIC_TOKENS: &[&str] = &["1h", "3h", "6h", "12h", "1d", "7d"];

/// Clamp a user-supplied token to an endpoint's accepted set, falling back
/// to one day.
pub fn clamp<'a>(token: &'a str, accepted: &[&str]) -> &'a str {
    if accepted.contains(&token) { token } else { "1d" }
}

/// Normalize a user-supplied duration for site-scoped SLE endpoints.
///
/// `10m` is not an upstream token and becomes an explicit ten-minute range
/// ending now. `today` maps to `1d`. Anything unrecognized clamps to `1d`
/// rather than failing the request.
pub fn resolve(duration: &str) -> TimeWindow {
    resolve_at(duration, Utc::now().timestamp())
}

fn resolve_at(duration: &str, now: i64) -> TimeWindow {
    match duration {
        "10m" => TimeWindow::Range {
            start: now - 600,
            end: now,
        },
        "today" => TimeWindow::Duration("1d".to_string()),
        d if PASSTHROUGH.contains(&d) => TimeWindow::Duration(d.to_string()),
        _ => TimeWindow::Duration("1d".to_string()),
    }
}

/// Window length in seconds for an insights duration token, or `None` for
/// unrecognized tokens.
pub fn insight_seconds(duration: &str) -> Option<i64> {
    match duration {
        "1h" => Some(3_600),
        "3h" => Some(10_800),
        "6h" => Some(21_600),
        "12h" => Some(43_200),
        "1d" => Some(86_400),
        "7d" => Some(604_800),
        "2w" => Some(1_209_600),
        _ => None,
    }
}

/// Epoch range for an insights query: the requested window ending now,
/// falling back to one day for unrecognized tokens.
pub fn insight_range(duration: &str) -> (i64, i64) {
    insight_range_at(duration, Utc::now().timestamp())
}

fn insight_range_at(duration: &str, now: i64) -> (i64, i64) {
    let span = insight_seconds(duration).unwrap_or(86_400);
    (now - span, now)
}
