//! Session middleware
//!
//! Resolves `Authorization: Bearer <token>` through the session provider on
//! every request and hands the resulting [`Session`] to handlers via request
//! extensions. A missing or unknown token yields an anonymous session; the
//! certificate operations reject those with 401.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Extension,
};
use certistore_common::{CertificateError, Session};
use tracing::debug;

use crate::{ApiResult, AppState};

/// Bearer token presented with the request, if any
#[derive(Debug, Clone)]
pub struct Credential(pub Option<String>);

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim().to_string())
    } else {
        None
    }
}

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers());
    let session = state.sessions.current_session(token.as_deref()).await?;

    if token.is_some() && !session.is_authenticated() {
        debug!("Bearer token did not resolve to a session");
    }

    request.extensions_mut().insert(session);
    request.extensions_mut().insert(Credential(token));
    Ok(next.run(request).await)
}

/// DELETE /api/session
///
/// Ends the caller's session (sign-out).
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(Credential(token)): Extension<Credential>,
) -> ApiResult<StatusCode> {
    let (Some(_), Some(token)) = (session.principal(), token) else {
        return Err(CertificateError::Unauthenticated.into());
    };

    state.sessions.end_session(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc123")).as_deref(), Some("abc123"));
        assert_eq!(bearer_token(&headers("bearer abc123")).as_deref(), Some("abc123"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
