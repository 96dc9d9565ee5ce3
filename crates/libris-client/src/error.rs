//! Error types for the API client.

use std::time::Duration;

use libris_model::{EntityKind, FieldErrors};
use serde::Deserialize;
use thiserror::Error;

/// Message used when the server body carries no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "request failed";

/// Errors returned by [`crate::ApiClient`] operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The request never reached the server.
    #[error("network error: {0}")]
    Network(String),

    /// No response within the configured timeout.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// The server answered 401 outside the login route.
    ///
    /// The session has already been cleared when this is returned.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// 4xx with per-field validation detail.
    #[error("{message}")]
    Validation {
        /// Banner message (`msg`).
        message: String,
        /// Per-field messages (`field_validations`).
        field_errors: FieldErrors,
    },

    /// Any other non-2xx response.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server `msg`, or [`GENERIC_FAILURE_MESSAGE`].
        message: String,
    },

    /// A 2xx body did not match the expected shape.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The record has no id, so it cannot be updated, fetched or deleted.
    #[error("{0} has no id")]
    MissingId(EntityKind),

    /// Base URL or other setting is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The token could not be read or written.
    #[error("session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Build the error for a non-2xx response.
    ///
    /// Only 4xx bodies carrying `field_validations` become
    /// [`ClientError::Validation`]; unparsable bodies fall back to
    /// [`GENERIC_FAILURE_MESSAGE`].
    #[must_use]
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<ErrorBody>(body).ok();
        let Some(parsed) = parsed else {
            return Self::Server {
                status,
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            };
        };

        let message = parsed
            .msg
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());

        match parsed.field_validations {
            Some(field_errors) if (400..500).contains(&status) && !field_errors.is_empty() => {
                Self::Validation {
                    message,
                    field_errors,
                }
            }
            _ => Self::Server { status, message },
        }
    }

    /// Message shown in the error banner.
    ///
    /// Server messages are passed through. Transport and decoding detail
    /// stays in the `Display` text and the logs.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation { message, .. } | Self::Server { message, .. } => message.clone(),
            Self::Network(_) => {
                "could not reach the library server, check your connection".to_string()
            }
            Self::Decode(_) => "the library server sent an unexpected response".to_string(),
            other => other.to_string(),
        }
    }

    /// Field annotations, present only for validation failures.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<SessionError> for ClientError {
    fn from(err: SessionError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Error body shape shared by every endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Application error code, opaque to the client.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub field_validations: Option<FieldErrors>,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Failures of the token persistence layer.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("token store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("token file is malformed: {0}")]
    Format(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_validations_become_validation_errors() {
        let body = br#"{"code": 1001, "field_validations": {"title": "required"}, "msg": "invalid book"}"#;
        let err = ClientError::from_response(400, body);
        assert!(err.is_validation());
        assert_eq!(err.message(), "invalid book");
        assert_eq!(
            err.field_errors().and_then(|f| f.get("title")).map(String::as_str),
            Some("required")
        );
    }

    #[test]
    fn field_validations_on_5xx_are_generic() {
        let body = br#"{"field_validations": {"title": "required"}, "msg": "boom"}"#;
        let err = ClientError::from_response(500, body);
        assert_eq!(
            err,
            ClientError::Server {
                status: 500,
                message: "boom".to_string()
            }
        );
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn unparsable_body_uses_generic_message() {
        let err = ClientError::from_response(502, b"<html>Bad gateway</html>");
        assert_eq!(err.message(), GENERIC_FAILURE_MESSAGE);

        let err = ClientError::from_response(404, br#"{"msg": ""}"#);
        assert_eq!(err.message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn business_failure_keeps_server_message() {
        let err = ClientError::from_response(409, br#"{"msg": "collection not empty"}"#);
        assert_eq!(err.message(), "collection not empty");
    }

    #[test]
    fn transport_detail_stays_out_of_the_banner() {
        let err = ClientError::Network(
            "error sending request for url (http://localhost:8080/v1/books): tcp connect error"
                .to_string(),
        );
        assert_eq!(
            err.message(),
            "could not reach the library server, check your connection"
        );
        assert!(err.to_string().contains("tcp connect error"));

        let err = ClientError::Decode("expected value at line 1 column 1".to_string());
        assert!(!err.message().contains("line 1"));
        assert!(
            ClientError::Timeout(Duration::from_secs(30))
                .message()
                .contains("timed out")
        );
        assert!(ClientError::SessionExpired.message().contains("log in"));
        assert_eq!(
            ClientError::MissingId(EntityKind::Book).to_string(),
            "book has no id"
        );
    }
}
