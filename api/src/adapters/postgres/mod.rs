//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod attempt_repo;
pub mod chapter_repo;
pub mod completion_repo;
pub mod final_exam_repo;
pub mod quiz_repo;
pub mod subject_repo;
pub mod user_repo;
pub mod xp_event_repo;

#[cfg(test)]
mod integration_tests;

pub use attempt_repo::PostgresAttemptRepository;
pub use chapter_repo::PostgresChapterRepository;
pub use completion_repo::PostgresCompletionRepository;
pub use final_exam_repo::PostgresFinalExamRepository;
pub use quiz_repo::PostgresQuizRepository;
pub use subject_repo::PostgresSubjectRepository;
pub use user_repo::PostgresUserRepository;
pub use xp_event_repo::PostgresXpEventRepository;

use sea_orm::{DbErr, SqlErr};

use crate::domain::entities::Question;
use crate::error::DomainError;

/// Map a SeaORM error to a domain error, keeping not-found and unique
/// violations distinguishable from generic database failures
pub(crate) fn db_err(e: DbErr) -> DomainError {
    if let Some(SqlErr::UniqueConstraintViolation(msg)) = e.sql_err() {
        return DomainError::AlreadyExists(msg);
    }
    match e {
        DbErr::RecordNotFound(msg) => DomainError::NotFound(msg),
        DbErr::RecordNotUpdated => DomainError::NotFound("Record not found".to_string()),
        e => DomainError::Database(e.to_string()),
    }
}

/// Serialize a question list for a JSONB column
pub(crate) fn questions_to_json(questions: &[Question]) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(questions)
        .map_err(|e| DomainError::Internal(format!("Failed to encode questions: {}", e)))
}

/// Deserialize a question list from a JSONB column
pub(crate) fn questions_from_json(value: serde_json::Value) -> Result<Vec<Question>, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::Internal(format!("Corrupt question data: {}", e)))
}
