//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{
    AppliedXp, AssessmentKind, Attempt, Chapter, ChapterCompletion, ChapterId, ChapterUpdate,
    FinalExam, FinalExamId, NewAttempt, NewChapter, NewChapterCompletion, NewFinalExam, NewQuiz,
    NewSubject, NewUser, Quiz, QuizId, QuizUpdate, Subject, SubjectId, SubjectUpdate, User,
    UserId, UserRole, XpClaim, XpEvent, XpGrant,
};
use crate::error::DomainError;

/// Repository for User entities
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Find a user by username (case-insensitive)
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by session token hash
    async fn find_by_token_hash(&self, hash: &str) -> Result<Option<User>, DomainError>;

    /// Create a new user
    async fn create(&self, user: &NewUser) -> Result<User, DomainError>;

    /// Replace (or clear) the session token hash
    async fn set_token_hash(&self, id: &UserId, hash: Option<&str>) -> Result<(), DomainError>;

    /// Update the last seen timestamp
    async fn update_last_seen(&self, id: &UserId) -> Result<(), DomainError>;

    /// Change a user's role
    async fn update_role(&self, id: &UserId, role: UserRole) -> Result<(), DomainError>;

    /// Get top users by XP
    async fn find_top_by_xp(&self, limit: i64) -> Result<Vec<User>, DomainError>;

    /// List users ordered by creation time
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, DomainError>;

    /// Count all users
    async fn count(&self) -> Result<u64, DomainError>;
}

/// Repository for Subject entities
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    async fn find_by_id(&self, id: &SubjectId) -> Result<Option<Subject>, DomainError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Subject>, DomainError>;

    /// List subjects ordered by `order_index`, optionally including unpublished ones
    async fn list(&self, include_unpublished: bool) -> Result<Vec<Subject>, DomainError>;

    async fn create(&self, subject: &NewSubject) -> Result<Subject, DomainError>;

    async fn update(&self, id: &SubjectId, update: &SubjectUpdate)
        -> Result<Subject, DomainError>;

    /// Delete a subject together with its chapters, quizzes and exam
    async fn delete(&self, id: &SubjectId) -> Result<(), DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}

/// Repository for Chapter entities
#[async_trait]
pub trait ChapterRepository: Send + Sync {
    async fn find_by_id(&self, id: &ChapterId) -> Result<Option<Chapter>, DomainError>;

    /// Chapters of a subject ordered by `order_index`
    async fn find_by_subject(&self, subject_id: &SubjectId) -> Result<Vec<Chapter>, DomainError>;

    async fn create(&self, chapter: &NewChapter) -> Result<Chapter, DomainError>;

    async fn update(&self, id: &ChapterId, update: &ChapterUpdate)
        -> Result<Chapter, DomainError>;

    /// Delete a chapter together with its quizzes
    async fn delete(&self, id: &ChapterId) -> Result<(), DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}

/// Repository for Quiz entities
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn find_by_id(&self, id: &QuizId) -> Result<Option<Quiz>, DomainError>;

    async fn find_by_chapter(&self, chapter_id: &ChapterId) -> Result<Vec<Quiz>, DomainError>;

    /// Quizzes of any of the given chapters
    async fn find_by_chapters(&self, chapter_ids: &[ChapterId]) -> Result<Vec<Quiz>, DomainError>;

    async fn create(&self, quiz: &NewQuiz) -> Result<Quiz, DomainError>;

    async fn update(&self, id: &QuizId, update: &QuizUpdate) -> Result<Quiz, DomainError>;

    async fn delete(&self, id: &QuizId) -> Result<(), DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}

/// Repository for FinalExam entities
#[async_trait]
pub trait FinalExamRepository: Send + Sync {
    async fn find_by_id(&self, id: &FinalExamId) -> Result<Option<FinalExam>, DomainError>;

    async fn find_by_subject(&self, subject_id: &SubjectId)
        -> Result<Option<FinalExam>, DomainError>;

    /// Create the subject's exam, replacing any existing one
    async fn replace(&self, exam: &NewFinalExam) -> Result<FinalExam, DomainError>;

    async fn delete(&self, id: &FinalExamId) -> Result<(), DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}

/// Repository for assessment attempts
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn record(&self, attempt: NewAttempt) -> Result<Attempt, DomainError>;

    /// A user's attempts, newest first
    async fn find_by_user(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Attempt>, DomainError>;

    /// A user's attempts of one kind within a subject, newest first
    async fn find_by_user_and_subject(
        &self,
        user_id: &UserId,
        kind: AssessmentKind,
        subject_id: &SubjectId,
    ) -> Result<Vec<Attempt>, DomainError>;

    /// Distinct assessment ids of the given kind the user has passed
    async fn find_passed_ids(
        &self,
        user_id: &UserId,
        kind: AssessmentKind,
    ) -> Result<Vec<Uuid>, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}

/// Repository for chapter completions
#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Record a completion. Returns `None` when the chapter was already completed.
    async fn create_if_absent(
        &self,
        completion: &NewChapterCompletion,
    ) -> Result<Option<ChapterCompletion>, DomainError>;

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<ChapterCompletion>, DomainError>;

    async fn find_by_user_and_subject(
        &self,
        user_id: &UserId,
        subject_id: &SubjectId,
    ) -> Result<Vec<ChapterCompletion>, DomainError>;
}

/// Repository for the XP ledger
#[async_trait]
pub trait XpEventRepository: Send + Sync {
    /// Apply an award atomically.
    ///
    /// The user's row is locked, `plan` computes the new stats and events
    /// from it, and both are written in one transaction. With a `claim`,
    /// returns `None` without writing anything when the ledger already
    /// holds an event for that key.
    async fn apply_award(
        &self,
        user_id: &UserId,
        claim: Option<XpClaim>,
        plan: &(dyn for<'u> Fn(&'u User) -> XpGrant + Send + Sync),
    ) -> Result<Option<AppliedXp>, DomainError>;

    /// A user's XP events, newest first
    async fn find_by_user_paginated(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<XpEvent>, DomainError>;

    /// Sum of all deltas for a user (should equal the user's XP)
    async fn sum_delta_by_user(&self, user_id: &UserId) -> Result<i64, DomainError>;
}
