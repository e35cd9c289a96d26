//! SQLite record store for certificate metadata

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::RecordStore;
use crate::models::{Certificate, CertificateFields, CertificateId, NewCertificate, PrincipalId};
use crate::{time, Error, Result};

type CertificateRow = (String, String, String, String, String, String, i64);

const SELECT_COLUMNS: &str =
    "SELECT id, owner_id, title, company, skills, file_url, created_at FROM certificates";

#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a record with an explicit creation timestamp
    ///
    /// [`RecordStore::insert`] always stamps the current time. Tests use this
    /// to place records in specific months.
    pub async fn insert_with_timestamp(
        &self,
        record: NewCertificate,
        created_at: DateTime<Utc>,
    ) -> Result<Certificate> {
        let id = CertificateId::generate();

        sqlx::query(
            r#"
            INSERT INTO certificates (id, owner_id, title, company, skills, file_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(record.owner_id.as_str())
        .bind(&record.title)
        .bind(&record.company)
        .bind(&record.skills)
        .bind(&record.file_url)
        .bind(time::to_millis(created_at))
        .execute(&self.pool)
        .await?;

        debug!("Inserted certificate {} for {}", id, record.owner_id);

        // Stored precision is milliseconds
        let created_at = time::from_millis(time::to_millis(created_at)).unwrap_or(created_at);

        Ok(Certificate {
            id,
            owner_id: record.owner_id,
            title: record.title,
            company: record.company,
            skills: record.skills,
            file_url: record.file_url,
            created_at,
        })
    }
}

fn row_to_certificate(row: CertificateRow) -> Result<Certificate> {
    let (id, owner_id, title, company, skills, file_url, created_at) = row;

    let id = id
        .parse::<CertificateId>()
        .map_err(|e| Error::Internal(format!("Corrupt certificate id {:?}: {}", id, e)))?;
    let created_at = time::from_millis(created_at)
        .ok_or_else(|| Error::Internal(format!("Corrupt created_at {} for {}", created_at, id)))?;

    Ok(Certificate {
        id,
        owner_id: PrincipalId::new(owner_id),
        title,
        company,
        skills,
        file_url,
        created_at,
    })
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert(&self, record: NewCertificate) -> Result<Certificate> {
        self.insert_with_timestamp(record, time::now()).await
    }

    async fn select_by_owner(&self, owner: &PrincipalId) -> Result<Vec<Certificate>> {
        let rows = sqlx::query_as::<_, CertificateRow>(&format!(
            "{} WHERE owner_id = ? ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_certificate).collect()
    }

    async fn select_one(&self, owner: &PrincipalId, id: &CertificateId) -> Result<Option<Certificate>> {
        let row = sqlx::query_as::<_, CertificateRow>(&format!(
            "{} WHERE id = ? AND owner_id = ?",
            SELECT_COLUMNS
        ))
        .bind(id.to_string())
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_certificate).transpose()
    }

    async fn update_fields(
        &self,
        owner: &PrincipalId,
        id: &CertificateId,
        fields: &CertificateFields,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE certificates SET title = ?, company = ?, skills = ? WHERE id = ? AND owner_id = ?",
        )
        .bind(&fields.title)
        .bind(&fields.company)
        .bind(&fields.skills)
        .bind(id.to_string())
        .bind(owner.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, owner: &PrincipalId, id: &CertificateId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM certificates WHERE id = ? AND owner_id = ?")
            .bind(id.to_string())
            .bind(owner.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
