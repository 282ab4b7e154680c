use serde::{Deserialize, Serialize};

/// Structured error payload returned by the identity backend.
/// Every error carries a machine-readable code and a message; the
/// remaining fields are advisory. The transport layer consults
/// `message` when classifying auth failures, so this type must decode
/// leniently — an unexpected payload still yields a usable value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code (e.g. "unauthorized", "not_found")
    #[serde(default)]
    pub error: Option<String>,
    /// Human-readable description of what went wrong
    #[serde(default)]
    pub message: Option<String>,
    /// Which field caused the error (if applicable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Request ID for tracing and debugging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Hint about what the correct usage looks like
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

impl ApiErrorBody {
    /// Lenient decode: any JSON value becomes an error body, keeping
    /// whatever recognizable fields it has. Non-object payloads yield
    /// an empty body rather than a decode failure.
    pub fn from_value(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Whether the backend message contains the given marker
    /// substring. Used for the non-recoverable "user is not
    /// authorized" classification.
    pub fn message_contains(&self, marker: &str) -> bool {
        self.message
            .as_deref()
            .is_some_and(|m| m.contains(marker))
    }
}

/// Error codes used across the API
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const NOT_FOUND: &str = "not_found";
    pub const CONFLICT: &str = "conflict";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const FORBIDDEN: &str = "forbidden";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_payload() {
        let body = ApiErrorBody::from_value(&json!({
            "error": codes::UNAUTHORIZED,
            "message": "token expired",
            "request_id": "req-1"
        }));
        assert_eq!(body.error.as_deref(), Some(codes::UNAUTHORIZED));
        assert!(body.message_contains("expired"));
    }

    #[test]
    fn tolerates_unknown_shapes() {
        let body = ApiErrorBody::from_value(&json!("plain string error"));
        assert!(body.error.is_none());
        assert!(!body.message_contains("anything"));
    }
}
