//! Request/response shapes at the service boundary

use coalesce_foundation::{CacheStats, Error, ErrorCode};
use coalesce_task::QueueStats;
use serde::{Deserialize, Serialize};

/// Successful result of one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub correlation_id: String,
    pub input: String,
    pub digest: String,
    /// 0 for cache hits; wall-clock processor time otherwise
    pub processing_time_ms: u64,
    pub from_cache: bool,
}

/// Structured error for clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        let message = match err {
            Error::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self {
            code: err.code(),
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    /// Shutdown has started; in-flight work is being drained
    Draining,
}

/// Health/stats snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub uptime_ms: u64,
    pub cache: CacheStats,
    pub queue: QueueStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_wire_format() {
        let response = ProcessResponse {
            correlation_id: "c-1".into(),
            input: "hi".into(),
            digest: "abc".into(),
            processing_time_ms: 0,
            from_cache: true,
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "correlationId": "c-1",
                "input": "hi",
                "digest": "abc",
                "processingTimeMs": 0,
                "fromCache": true
            })
        );
    }

    #[test]
    fn test_health_wire_format() {
        let report = HealthReport {
            status: HealthStatus::Ok,
            uptime_ms: 5,
            cache: CacheStats::default(),
            queue: QueueStats::default(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["uptimeMs"], 5);
        assert_eq!(value["cache"], json!({"hits": 0, "misses": 0, "size": 0}));
        assert_eq!(value["queue"]["totalEnqueued"], 0);
        assert_eq!(value["queue"]["totalProcessed"], 0);
    }

    #[test]
    fn test_error_body_uses_validation_message() {
        let err = Error::validation(ErrorCode::BadRequest, "text must not be empty");
        let body = ErrorBody::from(&err);
        assert_eq!(body.code, ErrorCode::BadRequest);
        assert_eq!(body.message, "text must not be empty");

        let body = ErrorBody::from(&Error::Cleared("q".into()));
        assert_eq!(body.code, ErrorCode::QueueCleared);
    }
}
