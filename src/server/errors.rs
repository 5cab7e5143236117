//! HTTP error responses
//!
//! Every API error body has the shape `{"error": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::error;

use crate::vault::VaultError;

/// Message for malformed or incomplete request bodies
pub const INVALID_REQUEST: &str = "invalid request";

/// Message when no key was given
pub const MISSING_ID: &str = "missing id";

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl VaultError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            VaultError::Sealed => StatusCode::SERVICE_UNAVAILABLE,
            VaultError::NotFound(_) => StatusCode::NOT_FOUND,
            VaultError::AlreadyInitialized => StatusCode::CONFLICT,
            VaultError::ReservedKey(_)
            | VaultError::NotInitialized
            | VaultError::NotUnsealed
            | VaultError::InsufficientShares { .. }
            | VaultError::InvalidShares => StatusCode::BAD_REQUEST,
            VaultError::InvalidSplit { .. }
            | VaultError::Crypto(_)
            | VaultError::Io(_)
            | VaultError::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for VaultError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            VaultError::NotFound(_) => "not found".to_string(),
            e if status.is_server_error() && !matches!(e, VaultError::Sealed) => {
                error!("Vault operation failed: {}", e);
                "internal error".to_string()
            }
            e => e.to_string(),
        };
        error_response(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CryptoError;

    fn decryption_failure() -> VaultError {
        VaultError::Crypto(CryptoError::Decryption(chacha20poly1305::Error))
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            VaultError::Sealed.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            VaultError::NotFound("k".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            VaultError::AlreadyInitialized.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            VaultError::ReservedKey(".vault_check".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            VaultError::InsufficientShares {
                required: 2,
                provided: 1
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            decryption_failure().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let response = decryption_failure().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
