//! # CertiStore Common Library
//!
//! Shared code for the CertiStore services including:
//! - Certificate and session models
//! - Record store (SQLite) and object store (filesystem) backends
//! - Certificate CRUD operations
//! - Skill and monthly aggregation
//! - Configuration loading
//! - Timestamp utilities

pub mod aggregation;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod records;
pub mod session;
pub mod storage;
pub mod time;

pub use error::{CertificateError, Error, Result};
pub use models::{Certificate, CertificateFields, CertificateId, NewCertificate, PrincipalId, Session};
pub use records::{CertificateService, NewUpload};
