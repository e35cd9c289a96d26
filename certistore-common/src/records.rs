//! Certificate CRUD operations
//!
//! Each certificate spans two backends: the file lives in the object store and
//! the metadata row in the record store. Upload and delete therefore run as
//! two strictly sequential steps:
//!
//! - **upload**: put object → insert record. If the insert fails the object is
//!   deleted again (compensation). If that also fails the orphaned key is
//!   logged and named in the error; it is never reported as success.
//! - **delete**: delete object → delete record. A failed object delete leaves
//!   the record in place so the delete can be retried. A failed record delete
//!   after the object is gone is reported as `MetadataDeleteFailed`; retrying
//!   is safe because deleting an absent object succeeds.
//!
//! Nothing is retried automatically. Every operation takes the caller's
//! [`Session`] explicitly and fails with `Unauthenticated` when it is anonymous.

use std::sync::Arc;
use tracing::{info, warn};

use crate::db::RecordStore;
use crate::error::CertificateError;
use crate::models::{Certificate, CertificateFields, CertificateId, NewCertificate, PrincipalId, Session};
use crate::storage::{self, ObjectStore};

type OpResult<T> = std::result::Result<T, CertificateError>;

/// Upload form contents
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub title: String,
    pub company: String,
    pub skills: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct CertificateService {
    records: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStore>,
}

fn require_principal(session: &Session) -> OpResult<&PrincipalId> {
    session.principal().ok_or(CertificateError::Unauthenticated)
}

impl CertificateService {
    pub fn new(records: Arc<dyn RecordStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { records, objects }
    }

    /// Store the file, then its metadata record
    pub async fn upload(&self, session: &Session, upload: NewUpload) -> OpResult<CertificateId> {
        let owner = require_principal(session)?;

        if upload.file_name.trim().is_empty() {
            return Err(CertificateError::InvalidInput("A file name is required".to_string()));
        }
        if upload.bytes.is_empty() {
            return Err(CertificateError::InvalidInput("Please select a file".to_string()));
        }

        let key = storage::file_key(owner, &upload.file_name);

        // Phase 1: object store
        self.objects
            .put(&key, &upload.bytes)
            .await
            .map_err(|e| CertificateError::StorageWriteFailed(e.to_string()))?;

        // Phase 2: record store
        let record = NewCertificate {
            owner_id: owner.clone(),
            title: upload.title,
            company: upload.company,
            skills: upload.skills,
            file_url: self.objects.url_for(&key),
        };

        match self.records.insert(record).await {
            Ok(certificate) => {
                info!("Uploaded certificate {} for {} ({})", certificate.id, owner, key);
                Ok(certificate.id)
            }
            Err(insert_err) => {
                warn!("Metadata insert failed for {}: {}; removing stored file", key, insert_err);
                match self.objects.delete(&key).await {
                    Ok(()) => Err(CertificateError::MetadataWriteFailed(insert_err.to_string())),
                    Err(cleanup_err) => {
                        warn!("Could not remove orphaned file {}: {}", key, cleanup_err);
                        Err(CertificateError::MetadataWriteFailed(format!(
                            "{} (orphaned file {} left in storage)",
                            insert_err, key
                        )))
                    }
                }
            }
        }
    }

    /// The caller's certificates, newest first
    pub async fn list(&self, session: &Session) -> OpResult<Vec<Certificate>> {
        let owner = require_principal(session)?;

        let mut certificates = self
            .records
            .select_by_owner(owner)
            .await
            .map_err(|e| CertificateError::MetadataReadFailed(e.to_string()))?;

        // Stable, so equal timestamps keep the store's order
        certificates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(certificates)
    }

    /// Replace title, company and skills of an owned certificate
    pub async fn update(
        &self,
        session: &Session,
        id: &CertificateId,
        fields: CertificateFields,
    ) -> OpResult<()> {
        let owner = require_principal(session)?;

        let updated = self
            .records
            .update_fields(owner, id, &fields)
            .await
            .map_err(|e| CertificateError::MetadataUpdateFailed(e.to_string()))?;

        if !updated {
            return Err(CertificateError::NotFound(id.to_string()));
        }

        info!("Updated certificate {} for {}", id, owner);
        Ok(())
    }

    /// Remove the stored file, then the metadata record
    pub async fn delete(&self, session: &Session, id: &CertificateId) -> OpResult<()> {
        let owner = require_principal(session)?;

        let certificate = self
            .records
            .select_one(owner, id)
            .await
            .map_err(|e| CertificateError::MetadataReadFailed(e.to_string()))?
            .ok_or_else(|| CertificateError::NotFound(id.to_string()))?;

        let key = self.objects.key_from_url(&certificate.file_url).ok_or_else(|| {
            CertificateError::StorageDeleteFailed(format!(
                "Cannot resolve storage key from {}",
                certificate.file_url
            ))
        })?;

        // Keys are always `{owner}/...`; anything else was misresolved and
        // deleting it would "succeed" against an absent object
        if !key.starts_with(&format!("{}/", owner)) {
            return Err(CertificateError::StorageDeleteFailed(format!(
                "Storage key {} resolved from {} is not under {}",
                key, certificate.file_url, owner
            )));
        }

        // Phase 1: object store; the record stays if this fails
        self.objects
            .delete(&key)
            .await
            .map_err(|e| CertificateError::StorageDeleteFailed(e.to_string()))?;

        // Phase 2: record store
        match self.records.delete_by_id(owner, id).await {
            Ok(true) => {
                info!("Deleted certificate {} for {}", id, owner);
                Ok(())
            }
            Ok(false) => {
                warn!("Certificate {} vanished after its file {} was removed", id, key);
                Err(CertificateError::NotFound(id.to_string()))
            }
            Err(e) => {
                warn!("File {} removed but record {} remains: {}", key, id, e);
                Err(CertificateError::MetadataDeleteFailed(e.to_string()))
            }
        }
    }

    /// Public URL for a stored file reference (full URL or bare key)
    pub fn public_url(&self, file_reference: &str) -> String {
        match self.objects.key_from_url(file_reference) {
            Some(key) => self.objects.url_for(&key),
            None => self.objects.url_for(file_reference),
        }
    }
}
