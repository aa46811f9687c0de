//! NATS message envelope types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generic request wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request<T> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// JWT access token (or internal service key, prefixed `svc:`)
    #[serde(default)]
    pub token: Option<String>,
    pub payload: T,
}

impl<T> Request<T> {
    pub fn with_token(token: String, payload: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            token: Some(token),
            payload,
        }
    }
}

/// Generic success response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse<T> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(request_id: Uuid, payload: T) -> Self {
        Self {
            id: request_id,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(request_id: Uuid, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: request_id,
            timestamp: Utc::now(),
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Build from a typed worker error, preserving its wire code.
    pub fn from_error(request_id: Uuid, err: &crate::error::WorkerError) -> Self {
        Self::new(request_id, err.code(), err.to_string())
    }
}

/// Empty payload that accepts both `null` and `{}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyPayload {}

/// List response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len() as i64;
        Self { items, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkerError;

    #[test]
    fn test_request_deserializes_without_token() {
        let json = r#"{
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "timestamp": "2026-03-01T10:00:00Z",
            "payload": {}
        }"#;
        let request: Request<EmptyPayload> = serde_json::from_str(json).unwrap();
        assert!(request.token.is_none());
    }

    #[test]
    fn test_error_response_from_typed_error() {
        let err = WorkerError::validation("zone is required");
        let resp = ErrorResponse::from_error(Uuid::nil(), &err);
        assert_eq!(resp.error.code, "VALIDATION_ERROR");
        assert_eq!(resp.error.message, "zone is required");
    }

    #[test]
    fn test_error_detail_serializes_camel_case() {
        let resp = ErrorResponse::new(Uuid::nil(), "NOT_FOUND", "zone not found");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"code\":\"NOT_FOUND\""));
        assert!(!json.contains("details"));
    }
}
