//! Certificate and session models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity of an authenticated principal (opaque, issued by the session provider)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller context passed explicitly to every certificate operation
///
/// Resolved from the session provider per request; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Authenticated(PrincipalId),
    Anonymous,
}

impl Session {
    /// Principal of an authenticated session
    pub fn principal(&self) -> Option<&PrincipalId> {
        match self {
            Session::Authenticated(principal) => Some(principal),
            Session::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }
}

/// Server-assigned certificate identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(Uuid);

impl CertificateId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CertificateId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One certificate's metadata plus its owning principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    pub owner_id: PrincipalId,
    pub title: String,
    pub company: String,
    /// Comma-separated skill tags as entered by the user
    pub skills: String,
    /// Public URL of the stored file
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

/// Record to insert; id and timestamp are assigned by the record store
#[derive(Debug, Clone, PartialEq)]
pub struct NewCertificate {
    pub owner_id: PrincipalId,
    pub title: String,
    pub company: String,
    pub skills: String,
    pub file_url: String,
}

/// Editable subset of a certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateFields {
    pub title: String,
    pub company: String,
    pub skills: String,
}
