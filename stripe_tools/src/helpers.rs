use chrono::{DateTime, Utc};
use serde_json::Value;

/// Converts one of Stripe's unix timestamps. Out-of-range values map to the epoch.
pub fn stripe_timestamp(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

/// Extracts the human-readable message from a Stripe error body, falling back to the raw body.
pub fn stripe_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}
