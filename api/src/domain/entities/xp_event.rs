//! XP event domain entity
//!
//! Ledger of every XP award. The user's `xp` column is always the sum of
//! the deltas recorded here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{User, UserId, UserStats};

entity_id!(
    /// Unique identifier for an XP event
    XpEventId
);

/// Why XP was awarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpEventKind {
    /// First completion of a chapter
    ChapterCompleted,
    /// First passing attempt of a quiz
    QuizPassed,
    /// Perfect score on the first passing quiz attempt
    PerfectQuiz,
    /// First passing attempt of a final exam
    ExamPassed,
    /// Streak reached a multiple of seven days
    StreakBonus,
}

impl std::fmt::Display for XpEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XpEventKind::ChapterCompleted => write!(f, "chapter_completed"),
            XpEventKind::QuizPassed => write!(f, "quiz_passed"),
            XpEventKind::PerfectQuiz => write!(f, "perfect_quiz"),
            XpEventKind::ExamPassed => write!(f, "exam_passed"),
            XpEventKind::StreakBonus => write!(f, "streak_bonus"),
        }
    }
}

impl std::str::FromStr for XpEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chapter_completed" => Ok(XpEventKind::ChapterCompleted),
            "quiz_passed" => Ok(XpEventKind::QuizPassed),
            "perfect_quiz" => Ok(XpEventKind::PerfectQuiz),
            "exam_passed" => Ok(XpEventKind::ExamPassed),
            "streak_bonus" => Ok(XpEventKind::StreakBonus),
            _ => Err(format!("Unknown XP event kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct XpEvent {
    pub id: XpEventId,
    pub user_id: UserId,
    pub kind: XpEventKind,
    pub delta: i32,
    pub xp_after: i32,
    /// Chapter, quiz or exam that triggered the award
    pub reference_id: Option<Uuid>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data needed to record an XP event
#[derive(Debug, Clone)]
pub struct NewXpEvent {
    pub user_id: UserId,
    pub kind: XpEventKind,
    pub delta: i32,
    pub xp_after: i32,
    pub reference_id: Option<Uuid>,
    pub details: Option<String>,
}

/// Ledger key that makes an award one-shot: at most one event per
/// `(user, kind, reference_id)` is ever written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpClaim {
    pub kind: XpEventKind,
    pub reference_id: Uuid,
}

/// New stats and ledger entries planned against a user's current row
#[derive(Debug, Clone)]
pub struct XpGrant {
    pub stats: UserStats,
    pub events: Vec<NewXpEvent>,
}

/// Outcome of an award applied by the repository
#[derive(Debug, Clone)]
pub struct AppliedXp {
    /// The user row as it was before the award
    pub before: User,
    pub stats: UserStats,
    pub events: Vec<XpEvent>,
}
