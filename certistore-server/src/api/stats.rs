//! Chart data endpoints
//!
//! Both endpoints load the caller's certificates and aggregate them in memory.

use axum::{extract::State, Extension, Json};
use certistore_common::aggregation::{monthly_histogram_in, skill_histogram, MonthlyCount, SkillCount};
use certistore_common::Session;

use crate::{ApiResult, AppState};

/// GET /api/stats/skills
pub async fn skill_stats(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<Vec<SkillCount>>> {
    let certificates = state.certificates.list(&session).await?;
    Ok(Json(skill_histogram(&certificates)))
}

/// GET /api/stats/monthly
///
/// Months are bucketed in the configured display time zone.
pub async fn monthly_stats(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<Vec<MonthlyCount>>> {
    let certificates = state.certificates.list(&session).await?;
    Ok(Json(monthly_histogram_in(&certificates, &state.display_offset)))
}
