//! Certificate endpoints
//!
//! - POST   /api/certificates      multipart upload (`title`, `company`, `skills`, `file`)
//! - GET    /api/certificates      caller's certificates, newest first
//! - PUT    /api/certificates/:id  edit title/company/skills
//! - DELETE /api/certificates/:id  remove file and record

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use certistore_common::{Certificate, CertificateFields, CertificateId, NewUpload, Session};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{ApiError, ApiResult, AppState};

/// Certificate as returned to clients, with a resolvable link to its file
#[derive(Debug, Serialize)]
pub struct CertificateView {
    #[serde(flatten)]
    pub certificate: Certificate,
    pub view_url: String,
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Malformed upload: {}", err))
}

fn parse_id(raw: &str) -> ApiResult<CertificateId> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid certificate id: {}", raw)))
}

/// POST /api/certificates
pub async fn upload_certificate(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut upload = NewUpload {
        title: String::new(),
        company: String::new(),
        skills: String::new(),
        file_name: String::new(),
        bytes: Vec::new(),
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => upload.title = field.text().await.map_err(multipart_error)?,
            "company" => upload.company = field.text().await.map_err(multipart_error)?,
            "skills" => upload.skills = field.text().await.map_err(multipart_error)?,
            "file" => {
                upload.file_name = field.file_name().unwrap_or_default().to_string();
                upload.bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
            }
            _ => {}
        }
    }

    let id = state.certificates.upload(&session, upload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// GET /api/certificates
pub async fn list_certificates(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<Vec<CertificateView>>> {
    let certificates = state.certificates.list(&session).await?;

    let views = certificates
        .into_iter()
        .map(|certificate| CertificateView {
            view_url: state.certificates.public_url(&certificate.file_url),
            certificate,
        })
        .collect();

    Ok(Json(views))
}

/// PUT /api/certificates/:id
pub async fn update_certificate(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(fields): Json<CertificateFields>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state.certificates.update(&session, &id, fields).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/certificates/:id
pub async fn delete_certificate(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state.certificates.delete(&session, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
