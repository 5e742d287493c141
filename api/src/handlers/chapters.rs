//! Chapter handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiResponse, ApiResult, CreatedResult};
use crate::app::{ChapterInput, CompletionResult};
use crate::domain::entities::{Chapter, ChapterId, ChapterUpdate, SubjectId, User};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateChapterRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub order_index: Option<i32>,
    pub xp_reward: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateChapterRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub order_index: Option<i32>,
    pub xp_reward: Option<i32>,
}

/// GET /subjects/:id/chapters
pub async fn list_chapters(
    State(state): State<AppState>,
    viewer: Option<Extension<User>>,
    Path(subject_id): Path<Uuid>,
) -> ApiResult<Vec<Chapter>> {
    let viewer = viewer.map(|Extension(u)| u);
    let chapters = state
        .catalog_service
        .list_chapters(&SubjectId(subject_id), viewer.as_ref())
        .await?;
    Ok(ApiResponse::ok(chapters))
}

/// GET /chapters/:id
pub async fn get_chapter(
    State(state): State<AppState>,
    viewer: Option<Extension<User>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Chapter> {
    let viewer = viewer.map(|Extension(u)| u);
    let chapter = state
        .catalog_service
        .get_chapter(&ChapterId(id), viewer.as_ref())
        .await?;
    Ok(ApiResponse::ok(chapter))
}

/// POST /subjects/:id/chapters (admin)
pub async fn create_chapter(
    State(state): State<AppState>,
    Path(subject_id): Path<Uuid>,
    Json(request): Json<CreateChapterRequest>,
) -> CreatedResult<Chapter> {
    let chapter = state
        .catalog_service
        .create_chapter(
            &SubjectId(subject_id),
            ChapterInput {
                title: request.title,
                content: request.content,
                order_index: request.order_index,
                xp_reward: request.xp_reward,
            },
        )
        .await?;

    Ok(ApiResponse::created(chapter))
}

/// PATCH /chapters/:id (admin)
pub async fn update_chapter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateChapterRequest>,
) -> ApiResult<Chapter> {
    let chapter = state
        .catalog_service
        .update_chapter(
            &ChapterId(id),
            ChapterUpdate {
                title: request.title,
                content: request.content,
                order_index: request.order_index,
                xp_reward: request.xp_reward,
            },
        )
        .await?;

    Ok(ApiResponse::ok(chapter))
}

/// DELETE /chapters/:id (admin)
pub async fn delete_chapter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.catalog_service.delete_chapter(&ChapterId(id)).await?;
    Ok(ApiResponse::with_message((), "Chapter deleted"))
}

/// POST /chapters/:id/complete
///
/// Idempotent. XP is only awarded the first time.
pub async fn complete_chapter(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<CompletionResult> {
    let result = state
        .progress_service
        .complete_chapter(&user, &ChapterId(id))
        .await?;

    let message = if result.newly_completed {
        "Chapter completed"
    } else {
        "Chapter already completed"
    };
    Ok(ApiResponse::with_message(result, message))
}
