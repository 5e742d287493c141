//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

#[macro_use]
mod id;

pub mod attempt;
pub mod chapter;
pub mod completion;
pub mod final_exam;
pub mod level;
pub mod question;
pub mod quiz;
pub mod subject;
pub mod user;
pub mod xp_event;

pub use attempt::{AssessmentKind, Attempt, AttemptId, NewAttempt};
pub use chapter::{Chapter, ChapterId, ChapterUpdate, NewChapter};
pub use completion::{ChapterCompletion, NewChapterCompletion};
pub use final_exam::{FinalExam, FinalExamId, NewFinalExam};
pub use level::{Level, Streak};
pub use question::{grade, validate_questions, Answer, Grade, Question, QuestionView};
pub use quiz::{NewQuiz, Quiz, QuizId, QuizUpdate};
pub use subject::{NewSubject, Subject, SubjectId, SubjectUpdate};
pub use user::{NewUser, User, UserId, UserRole, UserStats};
pub use xp_event::{AppliedXp, NewXpEvent, XpClaim, XpEvent, XpEventId, XpEventKind, XpGrant};
