use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operational errors raised by the backend wrapper.
///
/// Rejections that GoTrue reports for the auth exchange itself are NOT in
/// here; those travel inside [`crate::models::AuthOutcome`] as data. See
/// [`crate::auth::sign_up`] for the contract.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The HTTP transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An auth endpoint rejected the request.
    #[error("auth request rejected: {0}")]
    Auth(ApiError),

    /// A profile read or write was rejected by the storage API.
    #[error("profile operation failed: {0}")]
    Profile(ApiError),

    /// The backend answered with a body we could not decode.
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

/// Normalised error payload from GoTrue / PostgREST.
///
/// The two services spell their payloads differently (`msg`, `message`,
/// `error_description`, numeric vs. string codes); [`ApiError::from_body`]
/// folds them into one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status of the response that carried the error.
    pub status: u16,
    /// Machine-readable error code when the backend provided one.
    pub code: Option<String>,
    /// Human-readable message; falls back to the raw body.
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
struct WireError {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl ApiError {
    /// Build an `ApiError` from a non-success response body.
    pub fn from_body(status: u16, body: &str) -> Self {
        let wire: WireError = serde_json::from_str(body).unwrap_or_default();

        let message = wire
            .msg
            .or(wire.message)
            .or(wire.error_description)
            .or(wire.error)
            .unwrap_or_else(|| body.trim().to_string());

        // PostgREST sends string codes ("23505"), older GoTrue a number.
        let code = wire.error_code.or(match wire.code {
            Some(serde_json::Value::String(code)) => Some(code),
            Some(serde_json::Value::Number(code)) => Some(code.to_string()),
            _ => None,
        });

        Self { status, code, message }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "HTTP {} [{}]: {}", self.status, code, self.message),
            None => write!(f, "HTTP {}: {}", self.status, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gotrue_error_body_is_normalised() {
        let e = ApiError::from_body(422, r#"{"code":422,"msg":"User already registered"}"#);
        assert_eq!(e.status, 422);
        assert_eq!(e.code.as_deref(), Some("422"));
        assert_eq!(e.message, "User already registered");
    }

    #[test]
    fn postgrest_error_body_is_normalised() {
        let body = r#"{"code":"23505","message":"duplicate key value","details":null,"hint":null}"#;
        let e = ApiError::from_body(409, body);
        assert_eq!(e.code.as_deref(), Some("23505"));
        assert_eq!(e.message, "duplicate key value");
    }

    #[test]
    fn oauth_style_error_body_is_normalised() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        let e = ApiError::from_body(400, body);
        assert_eq!(e.message, "Invalid login credentials");
        assert!(e.code.is_none());
    }

    #[test]
    fn unparseable_body_falls_back_to_raw_text() {
        let e = ApiError::from_body(502, "upstream connect error\n");
        assert_eq!(e.message, "upstream connect error");
        assert!(e.code.is_none());
    }

    #[test]
    fn display_includes_status_and_code() {
        let e = ApiError::from_body(409, r#"{"code":"23505","message":"duplicate key value"}"#);
        assert_eq!(e.to_string(), "HTTP 409 [23505]: duplicate key value");

        let plain = ApiError::from_body(400, r#"{"msg":"bad request"}"#);
        assert_eq!(plain.to_string(), "HTTP 400: bad request");
    }

    #[test]
    fn profile_variant_wraps_api_error() {
        let e = BackendError::Profile(ApiError::from_body(500, "boom"));
        assert!(e.to_string().contains("profile operation failed"));
        assert!(e.to_string().contains("boom"));
    }
}
