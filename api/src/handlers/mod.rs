//! HTTP handlers
//!
//! Axum request handlers for the API endpoints. Every successful response is
//! wrapped in the `{"success": true, "data": ...}` envelope.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

pub mod admin;
pub mod auth;
pub mod chapters;
pub mod exams;
pub mod progress;
pub mod quizzes;
pub mod subjects;

pub use admin::{list_users, set_role, stats, xp_audit};
pub use auth::{login, logout, me, register};
pub use chapters::{
    complete_chapter, create_chapter, delete_chapter, get_chapter, list_chapters, update_chapter,
};
pub use exams::{delete_exam, get_subject_exam, replace_exam, submit_exam};
pub use progress::{leaderboard, list_attempts, overview, subject_progress, xp_history};
pub use quizzes::{create_quiz, delete_quiz, get_quiz, list_quizzes, submit_quiz, update_quiz};
pub use subjects::{create_subject, delete_subject, get_subject, list_subjects, update_subject};

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: None,
        })
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: Some(message.into()),
        })
    }

    pub fn created(data: T) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Self::ok(data))
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;
pub type CreatedResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

/// Query parameters for paginated lists
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
/// Use together with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        description: Option<Option<String>>,
    }

    #[test]
    fn envelope_omits_empty_message() {
        let Json(body) = ApiResponse::ok(vec![1, 2]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("message").is_none());
    }

    #[test]
    fn envelope_with_message() {
        let Json(body) = ApiResponse::with_message((), "Done");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["message"], "Done");
        assert!(json["data"].is_null());
    }

    #[test]
    fn page_query_defaults() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 20);
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn double_option_distinguishes_null_from_missing() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"description": "x"}"#).unwrap();

        assert_eq!(missing.description, None);
        assert_eq!(null.description, Some(None));
        assert_eq!(set.description, Some(Some("x".to_string())));
    }
}
