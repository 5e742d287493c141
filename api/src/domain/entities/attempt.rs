//! Assessment attempt entity
//!
//! Every quiz or exam submission is recorded, passed or not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::question::Grade;
use super::subject::SubjectId;
use super::user::UserId;

entity_id!(
    /// Unique identifier for an attempt
    AttemptId
);

/// Which kind of assessment an attempt belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Quiz,
    FinalExam,
}

impl std::fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssessmentKind::Quiz => write!(f, "quiz"),
            AssessmentKind::FinalExam => write!(f, "final_exam"),
        }
    }
}

impl std::str::FromStr for AssessmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiz" => Ok(AssessmentKind::Quiz),
            "final_exam" => Ok(AssessmentKind::FinalExam),
            _ => Err(format!("Unknown assessment kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub id: AttemptId,
    pub user_id: UserId,
    pub kind: AssessmentKind,
    pub assessment_id: Uuid,
    /// Subject the assessment belongs to; survives exam replacement
    pub subject_id: SubjectId,
    pub score: u32,
    pub correct: u32,
    pub total: u32,
    pub passed: bool,
    pub timed_out: bool,
    pub xp_awarded: i32,
    pub created_at: DateTime<Utc>,
}

/// Data needed to record an attempt
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: UserId,
    pub kind: AssessmentKind,
    pub assessment_id: Uuid,
    /// Subject the assessment belongs to; survives exam replacement
    pub subject_id: SubjectId,
    pub score: u32,
    pub correct: u32,
    pub total: u32,
    pub passed: bool,
    pub timed_out: bool,
    pub xp_awarded: i32,
}

impl NewAttempt {
    /// An on-time attempt with the given grade and no XP
    pub fn graded(
        user_id: UserId,
        kind: AssessmentKind,
        assessment_id: Uuid,
        subject_id: SubjectId,
        grade: &Grade,
    ) -> Self {
        NewAttempt {
            user_id,
            kind,
            assessment_id,
            subject_id,
            score: grade.score,
            correct: grade.correct,
            total: grade.total,
            passed: grade.passed,
            timed_out: false,
            xp_awarded: 0,
        }
    }
}
