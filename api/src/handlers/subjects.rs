//! Subject handlers
//!
//! Public catalog browsing and admin subject management.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{double_option, ApiResponse, ApiResult, CreatedResult};
use crate::app::SubjectInput;
use crate::domain::entities::{Chapter, ChapterId, Subject, SubjectId, SubjectUpdate, User};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSubjectRequest {
    pub title: String,
    /// Derived from the title when omitted
    pub slug: Option<String>,
    pub description: Option<String>,
    pub order_index: Option<i32>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSubjectRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    /// `null` clears the description
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub order_index: Option<i32>,
    pub is_published: Option<bool>,
}

/// Chapter as listed inside a subject (content omitted)
#[derive(Debug, Serialize)]
pub struct ChapterSummary {
    pub id: ChapterId,
    pub title: String,
    pub order_index: i32,
    pub xp_reward: i32,
}

impl From<Chapter> for ChapterSummary {
    fn from(c: Chapter) -> Self {
        Self {
            id: c.id,
            title: c.title,
            order_index: c.order_index,
            xp_reward: c.xp_reward,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubjectDetail {
    #[serde(flatten)]
    pub subject: Subject,
    pub chapters: Vec<ChapterSummary>,
}

/// GET /subjects
///
/// Students and anonymous visitors see published subjects; admins see all.
pub async fn list_subjects(
    State(state): State<AppState>,
    viewer: Option<Extension<User>>,
) -> ApiResult<Vec<Subject>> {
    let viewer = viewer.map(|Extension(u)| u);
    let subjects = state.catalog_service.list_subjects(viewer.as_ref()).await?;
    Ok(ApiResponse::ok(subjects))
}

/// GET /subjects/:id
pub async fn get_subject(
    State(state): State<AppState>,
    viewer: Option<Extension<User>>,
    Path(id): Path<Uuid>,
) -> ApiResult<SubjectDetail> {
    let viewer = viewer.map(|Extension(u)| u);
    let (subject, chapters) = state
        .catalog_service
        .subject_with_chapters(&SubjectId(id), viewer.as_ref())
        .await?;

    Ok(ApiResponse::ok(SubjectDetail {
        subject,
        chapters: chapters.into_iter().map(ChapterSummary::from).collect(),
    }))
}

/// POST /subjects (admin)
pub async fn create_subject(
    State(state): State<AppState>,
    Json(request): Json<CreateSubjectRequest>,
) -> CreatedResult<Subject> {
    let subject = state
        .catalog_service
        .create_subject(SubjectInput {
            title: request.title,
            slug: request.slug,
            description: request.description,
            order_index: request.order_index,
            is_published: request.is_published,
        })
        .await?;

    Ok(ApiResponse::created(subject))
}

/// PATCH /subjects/:id (admin)
pub async fn update_subject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSubjectRequest>,
) -> ApiResult<Subject> {
    let subject = state
        .catalog_service
        .update_subject(
            &SubjectId(id),
            SubjectUpdate {
                title: request.title,
                slug: request.slug,
                description: request.description,
                order_index: request.order_index,
                is_published: request.is_published,
            },
        )
        .await?;

    Ok(ApiResponse::ok(subject))
}

/// DELETE /subjects/:id (admin)
///
/// Chapters, quizzes and the final exam go with it.
pub async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.catalog_service.delete_subject(&SubjectId(id)).await?;
    Ok(ApiResponse::with_message((), "Subject deleted"))
}
