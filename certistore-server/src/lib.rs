//! certistore-server library - HTTP API for the certificate portfolio
//!
//! Exposes certificate upload/list/edit/delete, skill and monthly statistics,
//! and public file serving on top of `certistore-common`.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{FixedOffset, Offset, Utc};
use certistore_common::session::SessionProvider;
use certistore_common::CertificateService;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Certificate CRUD operations
    pub certificates: CertificateService,
    /// Resolves bearer tokens into sessions on every request
    pub sessions: Arc<dyn SessionProvider>,
    /// Time zone used to bucket uploads per month
    pub display_offset: FixedOffset,
    /// Object store root, served publicly
    pub storage_root: PathBuf,
    /// Route path the storage root is served under (`""` for the root)
    pub files_path: String,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        certificates: CertificateService,
        sessions: Arc<dyn SessionProvider>,
        storage_root: PathBuf,
    ) -> Self {
        Self {
            certificates,
            sessions,
            display_offset: Utc.fix(),
            storage_root,
            files_path: "/files".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }

    pub fn with_display_offset(mut self, offset: FixedOffset) -> Self {
        self.display_offset = offset;
        self
    }

    /// Serve stored files under `path`, which should match the path of the
    /// public base URL
    pub fn with_files_path(mut self, path: &str) -> Self {
        self.files_path = path.trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build application router
///
/// `/health` and the stored files are public; everything under `/api` runs
/// behind the session middleware, and the certificate operations reject
/// anonymous sessions themselves.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, put};

    let api = Router::new()
        .route(
            "/api/certificates",
            get(api::list_certificates).post(api::upload_certificate),
        )
        .route(
            "/api/certificates/:id",
            put(api::update_certificate).delete(api::delete_certificate),
        )
        .route("/api/stats/skills", get(api::skill_stats))
        .route("/api/stats/monthly", get(api::monthly_stats))
        .route("/api/session", delete(api::sign_out))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::session_middleware,
        ));

    let router = Router::new().merge(api).merge(api::health_routes());

    let files = ServeDir::new(&state.storage_root);
    let router = if state.files_path.is_empty() {
        router.fallback_service(files)
    } else {
        router.nest_service(&state.files_path, files)
    };

    router
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
