//! SQLite-backed session provider
//!
//! Sessions are opaque bearer tokens: 32 random bytes, hex encoded. Only the
//! SHA-256 digest of a token is persisted, so a leaked database does not leak
//! usable credentials.

use async_trait::async_trait;
use chrono::Duration;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::models::{PrincipalId, Session};
use crate::session::SessionProvider;
use crate::{time, Result};

#[derive(Clone)]
pub struct SqliteSessionProvider {
    pool: SqlitePool,
}

impl SqliteSessionProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Create a session for `principal` and return its bearer token
///
/// `ttl = None` issues a session that never expires.
pub async fn issue_session(
    pool: &SqlitePool,
    principal: &PrincipalId,
    ttl: Option<Duration>,
) -> Result<String> {
    let token = generate_token();
    let now = time::now();
    let expires_at = ttl.map(|ttl| time::to_millis(now + ttl));

    sqlx::query(
        "INSERT INTO sessions (token_hash, principal_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(hash_token(&token))
    .bind(principal.as_str())
    .bind(time::to_millis(now))
    .bind(expires_at)
    .execute(pool)
    .await?;

    info!("Issued session for {}", principal);
    Ok(token)
}

#[async_trait]
impl SessionProvider for SqliteSessionProvider {
    async fn current_session(&self, credential: Option<&str>) -> Result<Session> {
        let Some(token) = credential.filter(|t| !t.is_empty()) else {
            return Ok(Session::Anonymous);
        };

        let row: Option<(String, Option<i64>)> = sqlx::query_as(
            "SELECT principal_id, expires_at FROM sessions WHERE token_hash = ?",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((_, Some(expires_at))) if expires_at <= time::to_millis(time::now()) => {
                debug!("Rejected expired session");
                Ok(Session::Anonymous)
            }
            Some((principal_id, _)) => Ok(Session::Authenticated(PrincipalId::new(principal_id))),
            None => Ok(Session::Anonymous),
        }
    }

    async fn end_session(&self, credential: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_token(credential))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!("Session ended");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_hex_and_distinct() {
        let a = generate_token();
        let b = generate_token();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_token_is_stable_sha256() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
