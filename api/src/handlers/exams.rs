//! Final exam handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::quizzes::{into_questions, QuestionInput, SubmitRequest};
use super::{ApiResponse, ApiResult};
use crate::app::{ExamInput, Submission};
use crate::domain::entities::{FinalExam, FinalExamId, QuestionView, SubjectId, User};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReplaceExamRequest {
    pub title: String,
    pub passing_score: Option<u32>,
    pub time_limit_minutes: Option<u32>,
    pub xp_reward: Option<i32>,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
}

/// Final exam without its answer key
#[derive(Debug, Serialize)]
pub struct ExamView {
    pub id: FinalExamId,
    pub subject_id: SubjectId,
    pub title: String,
    pub passing_score: u32,
    pub time_limit_minutes: Option<u32>,
    pub xp_reward: i32,
    pub question_count: usize,
    pub questions: Vec<QuestionView>,
    pub created_at: DateTime<Utc>,
}

impl From<&FinalExam> for ExamView {
    fn from(e: &FinalExam) -> Self {
        Self {
            id: e.id,
            subject_id: e.subject_id,
            title: e.title.clone(),
            passing_score: e.passing_score,
            time_limit_minutes: e.time_limit_minutes,
            xp_reward: e.xp_reward,
            question_count: e.questions.len(),
            questions: e.question_views(),
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ExamBody {
    Full(FinalExam),
    Public(ExamView),
}

/// GET /subjects/:id/exam
pub async fn get_subject_exam(
    State(state): State<AppState>,
    viewer: Option<Extension<User>>,
    Path(subject_id): Path<Uuid>,
) -> ApiResult<ExamBody> {
    let viewer = viewer.map(|Extension(u)| u);
    let exam = state
        .assessment_service
        .get_subject_exam(&SubjectId(subject_id), viewer.as_ref())
        .await?;

    let body = if viewer.as_ref().is_some_and(User::is_admin) {
        ExamBody::Full(exam)
    } else {
        ExamBody::Public(ExamView::from(&exam))
    };
    Ok(ApiResponse::ok(body))
}

/// PUT /subjects/:id/exam (admin)
///
/// Creates the subject's final exam, replacing any existing one.
pub async fn replace_exam(
    State(state): State<AppState>,
    Path(subject_id): Path<Uuid>,
    Json(request): Json<ReplaceExamRequest>,
) -> ApiResult<FinalExam> {
    let exam = state
        .assessment_service
        .replace_exam(
            &SubjectId(subject_id),
            ExamInput {
                title: request.title,
                passing_score: request.passing_score,
                time_limit_minutes: request.time_limit_minutes,
                xp_reward: request.xp_reward,
                questions: into_questions(request.questions),
            },
        )
        .await?;

    Ok(ApiResponse::ok(exam))
}

/// DELETE /exams/:id (admin)
pub async fn delete_exam(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    state.assessment_service.delete_exam(&FinalExamId(id)).await?;
    Ok(ApiResponse::with_message((), "Final exam deleted"))
}

/// POST /exams/:id/submit
pub async fn submit_exam(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitRequest>,
) -> ApiResult<Submission> {
    let submission = state
        .assessment_service
        .submit_exam(&user, &FinalExamId(id), &request.answers, request.started_at)
        .await?;

    let message = if submission.attempt.timed_out {
        "Time limit exceeded"
    } else if submission.grade.passed {
        "Final exam passed"
    } else {
        "Final exam not passed"
    };
    Ok(ApiResponse::with_message(submission, message))
}
