//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod postgres;

pub use postgres::{
    PostgresAttemptRepository, PostgresChapterRepository, PostgresCompletionRepository,
    PostgresFinalExamRepository, PostgresQuizRepository, PostgresSubjectRepository,
    PostgresUserRepository, PostgresXpEventRepository,
};
