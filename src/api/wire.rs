use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{ScanResult, ScanVerdict};

pub const SCAN_PATH: &str = "api/scan";
pub const HEALTH_PATH: &str = "api/health";

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

pub fn decode_scan_response(status: StatusCode, body: &[u8]) -> ScanResult {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => return ScanResult::client_failure(http_error(status)),
        Err(err) => return ScanResult::client_failure(format!("invalid JSON response: {err}")),
    };

    if let Some(message) = message_field(&value, "error") {
        return ScanResult::server_failure(message);
    }

    if !status.is_success() {
        let message = message_field(&value, "detail").unwrap_or_else(|| http_error(status));
        return ScanResult::server_failure(message);
    }

    match serde_json::from_value::<ScanVerdict>(value) {
        Ok(verdict) => ScanResult::Success(verdict),
        Err(err) => ScanResult::client_failure(format!("unexpected response shape: {err}")),
    }
}

// Falsy values (null, false, 0, "") count as absent.
fn message_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn http_error(status: StatusCode) -> String {
    format!("HTTP {status}")
}
