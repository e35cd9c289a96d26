//! Record store and session persistence (SQLite)

use async_trait::async_trait;

use crate::models::{Certificate, CertificateFields, CertificateId, NewCertificate, PrincipalId};
use crate::Result;

pub mod certificates;
pub mod init;
pub mod sessions;

pub use certificates::SqliteRecordStore;
pub use init::init_database;
pub use sessions::{issue_session, SqliteSessionProvider};

/// Structured certificate persistence
///
/// Every read and write takes the owner explicitly and must only ever see
/// or touch rows belonging to that owner.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record, assigning its id and creation timestamp
    async fn insert(&self, record: NewCertificate) -> Result<Certificate>;

    /// All records of `owner`, newest first
    async fn select_by_owner(&self, owner: &PrincipalId) -> Result<Vec<Certificate>>;

    /// Record `id` if it belongs to `owner`
    async fn select_one(&self, owner: &PrincipalId, id: &CertificateId) -> Result<Option<Certificate>>;

    /// Overwrite the editable fields; `false` if no owned record matched
    async fn update_fields(
        &self,
        owner: &PrincipalId,
        id: &CertificateId,
        fields: &CertificateFields,
    ) -> Result<bool>;

    /// Remove the record; `false` if no owned record matched
    async fn delete_by_id(&self, owner: &PrincipalId, id: &CertificateId) -> Result<bool>;
}
