//! Admin handlers
//!
//! User management and platform statistics. Routed behind `require_admin`.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiResponse, ApiResult, PageQuery};
use crate::app::XpAudit;
use crate::domain::entities::{User, UserId, UserRole};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub users: u64,
    pub subjects: u64,
    pub chapters: u64,
    pub quizzes: u64,
    pub exams: u64,
    pub attempts: u64,
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<User>> {
    let users = state
        .user_service
        .list_users(query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(users))
}

/// PATCH /admin/users/:id/role
pub async fn set_role(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetRoleRequest>,
) -> ApiResult<User> {
    let role: UserRole = request.role.parse().map_err(AppError::BadRequest)?;
    let user = state
        .user_service
        .set_role(&admin, &UserId(id), role)
        .await?;
    Ok(ApiResponse::with_message(user, format!("Role set to {}", role)))
}

/// GET /admin/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<StatsResponse> {
    let users = state.user_service.count().await?;
    let (subjects, chapters) = state.catalog_service.counts().await?;
    let assessments = state.assessment_service.counts().await?;

    Ok(ApiResponse::ok(StatsResponse {
        users,
        subjects,
        chapters,
        quizzes: assessments.quizzes,
        exams: assessments.exams,
        attempts: assessments.attempts,
    }))
}

/// GET /admin/users/:id/xp-audit
///
/// Compare a user's stored XP with the sum of their XP ledger.
pub async fn xp_audit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<XpAudit> {
    let audit = state.gamification_service.audit(&UserId(id)).await?;
    if !audit.consistent {
        tracing::warn!(
            user_id = %audit.user_id,
            stored_xp = audit.stored_xp,
            ledger_xp = audit.ledger_xp,
            "XP ledger mismatch"
        );
    }
    Ok(ApiResponse::ok(audit))
}
