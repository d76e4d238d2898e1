//! Error taxonomy for the portal.
//!
//! Every failure a view can hit maps onto one of five variants, each with a
//! fixed HTTP status. Errors are converted to JSON at the handler boundary
//! and never crash the process. Each response carries a reference code; the
//! full details are logged internally via tracing.
//!
//! Nothing here is retried automatically: `SourceUnavailable` and `Auth` are
//! recoverable by the user (re-navigate, re-prompt), `Preview` leaves the
//! download path intact, and `Configuration` is fatal to the content view.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use rand::Rng;
use serde::Serialize;

// =============================================================================
// ERROR REFERENCE CODE GENERATION
// =============================================================================

/// Generate a unique error reference code.
/// Format: ERR-YYYYMMDD-XXXXXX (e.g., ERR-20250115-A3F8K2)
pub fn generate_reference_code() -> String {
    let date = Utc::now().format("%Y%m%d");
    let mut rng = rand::thread_rng();
    let chars: Vec<char> = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".chars().collect();
    let random: String = (0..6)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect();
    format!("ERR-{}-{}", date, random)
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Portal error taxonomy.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "error_type", rename_all = "snake_case")]
pub enum PortalError {
    /// Bad credentials or missing/invalid session token (401).
    Auth { message: String, reference: String },

    /// Missing or invalid local content configuration (500).
    Configuration { message: String, reference: String },

    /// Remote source unreachable or returned a non-2xx response (502).
    SourceUnavailable { message: String, reference: String },

    /// Requested file not present in the content source (404).
    NotFound { message: String, reference: String },

    /// Preview parse/decode failure; the download path is unaffected (422).
    Preview { message: String, reference: String },
}

impl PortalError {
    /// Create an Auth error, logging the internal reason.
    pub fn auth(internal_reason: impl AsRef<str>) -> Self {
        let reference = generate_reference_code();
        tracing::warn!(
            reference = %reference,
            internal_reason = %internal_reason.as_ref(),
            "Authentication failed"
        );
        Self::Auth {
            message: "Invalid username or password".to_string(),
            reference,
        }
    }

    /// Create an Auth error for a missing or unknown session token.
    pub fn not_logged_in() -> Self {
        let reference = generate_reference_code();
        tracing::debug!(reference = %reference, "Request without a valid session");
        Self::Auth {
            message: "Not logged in".to_string(),
            reference,
        }
    }

    /// Create a Configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        let reference = generate_reference_code();
        let message = message.into();
        tracing::error!(reference = %reference, detail = %message, "Configuration error");
        Self::Configuration { message, reference }
    }

    /// Create a SourceUnavailable error.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        let reference = generate_reference_code();
        let message = message.into();
        tracing::warn!(reference = %reference, detail = %message, "Content source unavailable");
        Self::SourceUnavailable { message, reference }
    }

    /// Create a NotFound error for a named file.
    pub fn not_found(name: impl AsRef<str>) -> Self {
        let reference = generate_reference_code();
        tracing::info!(reference = %reference, file = %name.as_ref(), "File not found");
        Self::NotFound {
            message: format!("File not found: {}", name.as_ref()),
            reference,
        }
    }

    /// Create a Preview error.
    pub fn preview(message: impl Into<String>) -> Self {
        let reference = generate_reference_code();
        let message = message.into();
        tracing::warn!(reference = %reference, detail = %message, "Preview failed");
        Self::Preview { message, reference }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PortalError::Auth { .. } => StatusCode::UNAUTHORIZED,
            PortalError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            PortalError::SourceUnavailable { .. } => StatusCode::BAD_GATEWAY,
            PortalError::NotFound { .. } => StatusCode::NOT_FOUND,
            PortalError::Preview { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Get the reference code for this error.
    pub fn reference(&self) -> &str {
        match self {
            PortalError::Auth { reference, .. } => reference,
            PortalError::Configuration { reference, .. } => reference,
            PortalError::SourceUnavailable { reference, .. } => reference,
            PortalError::NotFound { reference, .. } => reference,
            PortalError::Preview { reference, .. } => reference,
        }
    }

    /// Get the user-facing message.
    pub fn message(&self) -> &str {
        match self {
            PortalError::Auth { message, .. } => message,
            PortalError::Configuration { message, .. } => message,
            PortalError::SourceUnavailable { message, .. } => message,
            PortalError::NotFound { message, .. } => message,
            PortalError::Preview { message, .. } => message,
        }
    }
}

impl std::fmt::Display for PortalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth { message, .. } => write!(f, "Auth error: {}", message),
            Self::Configuration { message, .. } => write!(f, "Configuration error: {}", message),
            Self::SourceUnavailable { message, .. } => {
                write!(f, "Content source unavailable: {}", message)
            }
            Self::NotFound { message, .. } => write!(f, "{}", message),
            Self::Preview { message, .. } => write!(f, "Preview error: {}", message),
        }
    }
}

impl std::error::Error for PortalError {}

/// User-facing error response structure (JSON format).
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: PortalError,
    pub status: u16,
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let response = ErrorResponse {
            status: status.as_u16(),
            error: self,
        };

        let body = serde_json::to_string(&response).unwrap_or_else(|_| {
            r#"{"error":{"error_type":"configuration","message":"An unexpected error occurred","reference":"ERR-FALLBACK"},"status":500}"#.to_string()
        });

        (status, [("content-type", "application/json")], body).into_response()
    }
}

/// Result alias for handler and adapter code.
pub type PortalResult<T> = Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_code_format() {
        let code = generate_reference_code();
        assert!(code.starts_with("ERR-"));
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 6);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PortalError::auth("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            PortalError::configuration("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            PortalError::source_unavailable("x").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(PortalError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            PortalError::preview("x").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_not_found_names_the_file() {
        let err = PortalError::not_found("lecture-3.pdf");
        assert!(err.message().contains("lecture-3.pdf"));
    }

    #[test]
    fn test_serialized_shape() {
        let err = PortalError::source_unavailable("upstream returned 503");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error_type"], "source_unavailable");
        assert!(json["reference"].as_str().unwrap().starts_with("ERR-"));
    }
}
