//! Session provider interface
//!
//! Authentication itself is external; the core only needs to turn a
//! caller-supplied credential into a [`Session`]. Providers are consulted
//! on every request because sessions can end at any time.

use async_trait::async_trait;

use crate::models::Session;
use crate::Result;

/// Resolves credentials into sessions
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Session for the given credential
    ///
    /// Unknown, expired or missing credentials yield [`Session::Anonymous`];
    /// `Err` is reserved for provider failures.
    async fn current_session(&self, credential: Option<&str>) -> Result<Session>;

    /// End the session identified by the credential (sign-out)
    ///
    /// Ending an unknown session is not an error.
    async fn end_session(&self, credential: &str) -> Result<()>;
}
