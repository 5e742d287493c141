//! Final exam domain entity
//!
//! Each subject has at most one final exam. It unlocks once every chapter of
//! the subject is completed.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::question::{Question, QuestionView};
use super::subject::SubjectId;

entity_id!(
    /// Unique identifier for a final exam
    FinalExamId
);

/// Default pass mark for final exams (percent)
pub const DEFAULT_EXAM_PASSING_SCORE: u32 = 70;

/// Default XP awarded for passing a final exam for the first time
pub const DEFAULT_EXAM_XP: i32 = 100;

/// Grace period added to the time limit for network latency
pub const TIME_LIMIT_GRACE_SECONDS: i64 = 60;

/// Longest allowed time limit (one week)
pub const MAX_TIME_LIMIT_MINUTES: u32 = 7 * 24 * 60;

#[derive(Debug, Clone, Serialize)]
pub struct FinalExam {
    pub id: FinalExamId,
    pub subject_id: SubjectId,
    pub title: String,
    pub passing_score: u32,
    pub time_limit_minutes: Option<u32>,
    pub xp_reward: i32,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

impl FinalExam {
    pub fn question_views(&self) -> Vec<QuestionView> {
        self.questions.iter().map(Question::view).collect()
    }

    /// Whether a submission started at `started_at` and received at `now`
    /// exceeded the time limit (including grace)
    pub fn is_overtime(&self, started_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.time_limit_minutes {
            Some(limit) => {
                let allowed = Duration::minutes(i64::from(limit))
                    + Duration::seconds(TIME_LIMIT_GRACE_SECONDS);
                now - started_at > allowed
            }
            None => false,
        }
    }
}

/// Data needed to create (or replace) a subject's final exam
#[derive(Debug, Clone)]
pub struct NewFinalExam {
    pub subject_id: SubjectId,
    pub title: String,
    pub passing_score: u32,
    pub time_limit_minutes: Option<u32>,
    pub xp_reward: i32,
    pub questions: Vec<Question>,
}
