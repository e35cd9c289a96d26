//! Error types for certistore-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use certistore_common::CertificateError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Certificate operation failed
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Session provider or other infrastructure failure (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<certistore_common::Error> for ApiError {
    fn from(err: certistore_common::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Certificate(err) => match err {
                CertificateError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
                CertificateError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                CertificateError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                CertificateError::StorageWriteFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_WRITE_FAILED")
                }
                CertificateError::StorageDeleteFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_DELETE_FAILED")
                }
                CertificateError::MetadataReadFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "METADATA_READ_FAILED")
                }
                CertificateError::MetadataWriteFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "METADATA_WRITE_FAILED")
                }
                CertificateError::MetadataUpdateFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "METADATA_UPDATE_FAILED")
                }
                CertificateError::MetadataDeleteFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "METADATA_DELETE_FAILED")
                }
            },
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!("{}: {}", code, self);
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(CertificateError::Unauthenticated), StatusCode::UNAUTHORIZED),
            (ApiError::from(CertificateError::NotFound("x".into())), StatusCode::NOT_FOUND),
            (ApiError::from(CertificateError::InvalidInput("x".into())), StatusCode::BAD_REQUEST),
            (
                ApiError::from(CertificateError::StorageDeleteFailed("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
