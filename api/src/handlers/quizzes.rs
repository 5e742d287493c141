//! Quiz handlers
//!
//! Learners only ever receive the public view of a quiz; the answer key is
//! revealed per question in the submission feedback.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiResponse, ApiResult, CreatedResult};
use crate::app::{QuizInput, Submission};
use crate::domain::entities::{
    Answer, ChapterId, Question, QuestionView, Quiz, QuizId, QuizUpdate, User,
};
use crate::AppState;

/// Question as authored by an admin; the id is generated when omitted
#[derive(Debug, Deserialize)]
pub struct QuestionInput {
    pub id: Option<Uuid>,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub explanation: Option<String>,
}

impl From<QuestionInput> for Question {
    fn from(q: QuestionInput) -> Self {
        Question {
            id: q.id.unwrap_or_else(Uuid::new_v4),
            prompt: q.prompt.trim().to_string(),
            options: q.options,
            correct_option: q.correct_option,
            explanation: q.explanation.filter(|e| !e.trim().is_empty()),
        }
    }
}

pub(crate) fn into_questions(inputs: Vec<QuestionInput>) -> Vec<Question> {
    inputs.into_iter().map(Question::from).collect()
}

#[derive(Debug, Deserialize)]
pub struct CreateQuizRequest {
    pub title: String,
    pub passing_score: Option<u32>,
    pub xp_reward: Option<i32>,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuizRequest {
    pub title: Option<String>,
    pub passing_score: Option<u32>,
    pub xp_reward: Option<i32>,
    /// Replaces the whole question list
    pub questions: Option<Vec<QuestionInput>>,
}

/// Answers to a quiz or exam
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub answers: Vec<Answer>,
    /// When the learner opened the exam; used for time limits
    pub started_at: Option<DateTime<Utc>>,
}

/// Quiz without its answer key
#[derive(Debug, Serialize)]
pub struct QuizView {
    pub id: QuizId,
    pub chapter_id: ChapterId,
    pub title: String,
    pub passing_score: u32,
    pub xp_reward: i32,
    pub question_count: usize,
    pub questions: Vec<QuestionView>,
}

impl From<&Quiz> for QuizView {
    fn from(q: &Quiz) -> Self {
        Self {
            id: q.id,
            chapter_id: q.chapter_id,
            title: q.title.clone(),
            passing_score: q.passing_score,
            xp_reward: q.xp_reward,
            question_count: q.questions.len(),
            questions: q.question_views(),
        }
    }
}

/// Admins get the full quiz, everyone else the public view
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QuizBody {
    Full(Quiz),
    Public(QuizView),
}

impl QuizBody {
    fn for_viewer(quiz: Quiz, viewer: Option<&User>) -> Self {
        if viewer.is_some_and(User::is_admin) {
            QuizBody::Full(quiz)
        } else {
            QuizBody::Public(QuizView::from(&quiz))
        }
    }
}

/// GET /chapters/:id/quizzes
pub async fn list_quizzes(
    State(state): State<AppState>,
    viewer: Option<Extension<User>>,
    Path(chapter_id): Path<Uuid>,
) -> ApiResult<Vec<QuizBody>> {
    let viewer = viewer.map(|Extension(u)| u);
    let quizzes = state
        .assessment_service
        .list_quizzes(&ChapterId(chapter_id), viewer.as_ref())
        .await?;

    Ok(ApiResponse::ok(
        quizzes
            .into_iter()
            .map(|q| QuizBody::for_viewer(q, viewer.as_ref()))
            .collect(),
    ))
}

/// GET /quizzes/:id
pub async fn get_quiz(
    State(state): State<AppState>,
    viewer: Option<Extension<User>>,
    Path(id): Path<Uuid>,
) -> ApiResult<QuizBody> {
    let viewer = viewer.map(|Extension(u)| u);
    let quiz = state
        .assessment_service
        .get_quiz(&QuizId(id), viewer.as_ref())
        .await?;
    Ok(ApiResponse::ok(QuizBody::for_viewer(quiz, viewer.as_ref())))
}

/// POST /chapters/:id/quizzes (admin)
pub async fn create_quiz(
    State(state): State<AppState>,
    Path(chapter_id): Path<Uuid>,
    Json(request): Json<CreateQuizRequest>,
) -> CreatedResult<Quiz> {
    let quiz = state
        .assessment_service
        .create_quiz(
            &ChapterId(chapter_id),
            QuizInput {
                title: request.title,
                passing_score: request.passing_score,
                xp_reward: request.xp_reward,
                questions: into_questions(request.questions),
            },
        )
        .await?;

    Ok(ApiResponse::created(quiz))
}

/// PATCH /quizzes/:id (admin)
pub async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateQuizRequest>,
) -> ApiResult<Quiz> {
    let quiz = state
        .assessment_service
        .update_quiz(
            &QuizId(id),
            QuizUpdate {
                title: request.title,
                passing_score: request.passing_score,
                xp_reward: request.xp_reward,
                questions: request.questions.map(into_questions),
            },
        )
        .await?;

    Ok(ApiResponse::ok(quiz))
}

/// DELETE /quizzes/:id (admin)
pub async fn delete_quiz(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    state.assessment_service.delete_quiz(&QuizId(id)).await?;
    Ok(ApiResponse::with_message((), "Quiz deleted"))
}

/// POST /quizzes/:id/submit
pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitRequest>,
) -> ApiResult<Submission> {
    let submission = state
        .assessment_service
        .submit_quiz(&user, &QuizId(id), &request.answers)
        .await?;

    let message = if submission.grade.passed {
        "Quiz passed"
    } else {
        "Quiz not passed"
    };
    Ok(ApiResponse::with_message(submission, message))
}
