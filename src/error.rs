use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type shared by the auth service, the HTTP client and the pages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    /// Bad credentials or a failed refresh
    #[error("{0}")]
    Auth(String),

    /// A 401 that could not be recovered by refreshing the session
    #[error("Session expired. Please login again.")]
    SessionExpired,

    /// Any other non-2xx response
    #[error("{message}")]
    Api { message: String, status: u16 },

    /// Transport failure before a response was received
    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    Config { key: String, reason: String },

    /// Client-side form validation failure
    #[error("{0}")]
    Validation(String),
}

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    AuthFailed,
    SessionExpired,
    ApiRequestFailed,
    ApiNotFound,
    ApiPermissionDenied,
    NetworkFailure,
    StorageFailure,
    SerializationFailure,
    ConfigInvalid,
    ValidationFailed,
}

/// Error categories, used to decide how a page presents a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Transport issues - usually retryable by the user
    Network,
    /// Credentials or session problems
    Authentication,
    /// Access denied for the current role
    Permission,
    /// Resource not found
    NotFound,
    /// Backend rejected the request or returned a server error
    Api,
    /// Input rejected before it reached the backend
    Validation,
    /// Local storage, configuration or decoding problems
    Internal,
}

impl ErrorCategory {
    /// Returns true if the user can reasonably retry the same action
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Api)
    }
}

impl AdminError {
    /// Build an API error from a status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status,
        }
    }

    /// Machine readable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Auth(_) => ErrorCode::AuthFailed,
            Self::SessionExpired => ErrorCode::SessionExpired,
            Self::Api { status: 404, .. } => ErrorCode::ApiNotFound,
            Self::Api { status: 403, .. } => ErrorCode::ApiPermissionDenied,
            Self::Api { .. } => ErrorCode::ApiRequestFailed,
            Self::Network(_) => ErrorCode::NetworkFailure,
            Self::Storage(_) => ErrorCode::StorageFailure,
            Self::Serialization(_) => ErrorCode::SerializationFailure,
            Self::Config { .. } => ErrorCode::ConfigInvalid,
            Self::Validation(_) => ErrorCode::ValidationFailed,
        }
    }

    /// Category of this error
    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            ErrorCode::AuthFailed | ErrorCode::SessionExpired => ErrorCategory::Authentication,
            ErrorCode::ApiNotFound => ErrorCategory::NotFound,
            ErrorCode::ApiPermissionDenied => ErrorCategory::Permission,
            ErrorCode::ApiRequestFailed => ErrorCategory::Api,
            ErrorCode::NetworkFailure => ErrorCategory::Network,
            ErrorCode::ValidationFailed => ErrorCategory::Validation,
            ErrorCode::StorageFailure
            | ErrorCode::SerializationFailure
            | ErrorCode::ConfigInvalid => ErrorCategory::Internal,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Network error. Please check your connection and try again.".to_string()
            }
            Self::Storage(_) | Self::Serialization(_) | Self::Config { .. } => {
                "An unknown error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AuthFailed => "auth_failed",
            Self::SessionExpired => "session_expired",
            Self::ApiRequestFailed => "api_request_failed",
            Self::ApiNotFound => "api_not_found",
            Self::ApiPermissionDenied => "api_permission_denied",
            Self::NetworkFailure => "network_failure",
            Self::StorageFailure => "storage_failure",
            Self::SerializationFailure => "serialization_failure",
            Self::ConfigInvalid => "config_invalid",
            Self::ValidationFailed => "validation_failed",
        };
        write!(f, "{}", name)
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AdminError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type for admin console operations
pub type AdminResult<T> = Result<T, AdminError>;

/// Pull a human readable message out of an error response body.
///
/// Understands `{"detail": "..."}`, validation lists shaped like
/// `{"detail": [{"msg": "..."}]}`, `{"error": {"message": "..."}}` and
/// `{"message": "..."}`.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let detail = match value.get("detail") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Array(items)) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(|msg| msg.as_str())
            .map(str::to_string),
        _ => None,
    };

    detail
        .or_else(|| {
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .filter(|message| !message.trim().is_empty())
}
