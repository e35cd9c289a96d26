//! Common error types for CertiStore

use thiserror::Error;

/// Common result type for CertiStore backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure errors raised by the record store, object store,
/// session provider and configuration loading
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of a certificate operation.
///
/// Every variant carries a single human-readable message. The storage and
/// metadata variants identify which step of the two-step upload/delete
/// sequence failed, so callers can tell a clean failure from a documented
/// inconsistency.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CertificateError {
    /// No authenticated principal at operation start
    #[error("Not signed in")]
    Unauthenticated,

    /// Upload request is missing required parts
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Target record is absent or owned by another principal
    #[error("Certificate not found: {0}")]
    NotFound(String),

    /// Object store write failed; no metadata was written
    #[error("Failed to store file: {0}")]
    StorageWriteFailed(String),

    /// Object store delete failed; the metadata record was left intact
    #[error("Failed to delete file: {0}")]
    StorageDeleteFailed(String),

    /// Record store read failed
    #[error("Failed to load certificates: {0}")]
    MetadataReadFailed(String),

    /// Record store insert failed after the file was stored
    #[error("Failed to save certificate: {0}")]
    MetadataWriteFailed(String),

    /// Record store update failed
    #[error("Failed to update certificate: {0}")]
    MetadataUpdateFailed(String),

    /// Record store delete failed after the file was removed
    #[error("Failed to delete certificate record: {0}")]
    MetadataDeleteFailed(String),
}
