use serde::Serialize;

use super::types::ScanVerdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureOrigin {
    Client,
    Server,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanFailure {
    pub error: String,
    pub origin: FailureOrigin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScanResult {
    Success(ScanVerdict),
    Failure(ScanFailure),
}

impl ScanResult {
    pub fn client_failure(error: impl Into<String>) -> Self {
        Self::Failure(ScanFailure {
            error: error.into(),
            origin: FailureOrigin::Client,
        })
    }

    pub fn server_failure(error: impl Into<String>) -> Self {
        Self::Failure(ScanFailure {
            error: error.into(),
            origin: FailureOrigin::Server,
        })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure(failure) => Some(failure.error.as_str()),
            Self::Success(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_serializes_with_origin() {
        let value = serde_json::to_value(ScanResult::client_failure("Failed to fetch")).unwrap();
        assert_eq!(value, json!({"error": "Failed to fetch", "origin": "client"}));
    }
}
