//! HTTP API handlers for certistore-server

pub mod auth;
pub mod certificates;
pub mod health;
pub mod stats;

pub use auth::{session_middleware, sign_out};
pub use certificates::{delete_certificate, list_certificates, update_certificate, upload_certificate};
pub use health::health_routes;
pub use stats::{monthly_stats, skill_stats};
