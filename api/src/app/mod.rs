//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and ports.

pub mod assessment_service;
pub mod catalog_service;
pub mod credentials;
pub mod gamification_service;
pub mod progress_service;
pub mod user_service;
pub mod validation;
pub mod xp_config;

pub use assessment_service::{AssessmentService, ExamInput, QuizInput, Submission};
pub use catalog_service::{CatalogService, ChapterInput, SubjectInput};
pub use credentials::PasswordHasher;
pub use gamification_service::{GamificationService, LeaderboardEntry, XpAudit, XpSummary};
pub use progress_service::{CompletionResult, ProgressOverview, ProgressService, SubjectProgress};
pub use user_service::UserService;
