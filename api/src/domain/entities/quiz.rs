//! Quiz domain entity
//!
//! A short graded check attached to a chapter.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::chapter::ChapterId;
use super::question::{Question, QuestionView};

entity_id!(
    /// Unique identifier for a quiz
    QuizId
);

/// Default pass mark for quizzes (percent)
pub const DEFAULT_QUIZ_PASSING_SCORE: u32 = 60;

/// Default XP awarded for passing a quiz for the first time
pub const DEFAULT_QUIZ_XP: i32 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct Quiz {
    pub id: QuizId,
    pub chapter_id: ChapterId,
    pub title: String,
    pub passing_score: u32,
    pub xp_reward: i32,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    pub fn question_views(&self) -> Vec<QuestionView> {
        self.questions.iter().map(Question::view).collect()
    }
}

/// Data needed to create a new quiz
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub chapter_id: ChapterId,
    pub title: String,
    pub passing_score: u32,
    pub xp_reward: i32,
    pub questions: Vec<Question>,
}

/// Partial update of a quiz; `questions` replaces the whole list
#[derive(Debug, Clone, Default)]
pub struct QuizUpdate {
    pub title: Option<String>,
    pub passing_score: Option<u32>,
    pub xp_reward: Option<i32>,
    pub questions: Option<Vec<Question>>,
}

impl QuizUpdate {
    pub fn apply(&self, quiz: &mut Quiz) {
        if let Some(title) = &self.title {
            quiz.title = title.clone();
        }
        if let Some(passing_score) = self.passing_score {
            quiz.passing_score = passing_score;
        }
        if let Some(xp_reward) = self.xp_reward {
            quiz.xp_reward = xp_reward;
        }
        if let Some(questions) = &self.questions {
            quiz.questions = questions.clone();
        }
        quiz.updated_at = Utc::now();
    }
}
