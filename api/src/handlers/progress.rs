//! Progress, attempt history and leaderboard handlers

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiResponse, ApiResult, PageQuery};
use crate::app::{LeaderboardEntry, ProgressOverview, SubjectProgress};
use crate::domain::entities::{Attempt, SubjectId, User, XpEvent};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

/// GET /progress
pub async fn overview(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<ProgressOverview> {
    let overview = state.progress_service.overview(&user).await?;
    Ok(ApiResponse::ok(overview))
}

/// GET /progress/subjects/:id
pub async fn subject_progress(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(subject_id): Path<Uuid>,
) -> ApiResult<SubjectProgress> {
    let progress = state
        .progress_service
        .subject_progress(&user, &SubjectId(subject_id))
        .await?;
    Ok(ApiResponse::ok(progress))
}

/// GET /me/attempts
pub async fn list_attempts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<Attempt>> {
    let attempts = state
        .assessment_service
        .list_attempts(&user, query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(attempts))
}

/// GET /me/xp-history
///
/// The user's XP ledger, newest first.
pub async fn xp_history(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<XpEvent>> {
    let events = state
        .gamification_service
        .history(&user.id, query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(events))
}

/// GET /leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Vec<LeaderboardEntry>> {
    let entries = state.gamification_service.leaderboard(query.limit).await?;
    Ok(ApiResponse::ok(entries))
}
