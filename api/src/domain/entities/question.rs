//! Multiple-choice questions and grading
//!
//! Quizzes and final exams share the same question format and scoring rules.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Allowed number of options per question
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 8;

/// A multiple-choice question with exactly one correct option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option: usize,
        explanation: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt: prompt.into(),
            options,
            correct_option,
            explanation,
        }
    }

    /// Learner-facing view without the answer key
    pub fn view(&self) -> QuestionView {
        QuestionView {
            id: self.id,
            prompt: self.prompt.clone(),
            options: self.options.clone(),
        }
    }

    fn validate(&self, position: usize) -> Result<(), String> {
        let n = position + 1;
        if self.prompt.trim().is_empty() {
            return Err(format!("Question {} has an empty prompt", n));
        }
        if self.options.len() < MIN_OPTIONS || self.options.len() > MAX_OPTIONS {
            return Err(format!(
                "Question {} must have between {} and {} options",
                n, MIN_OPTIONS, MAX_OPTIONS
            ));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(format!("Question {} has a blank option", n));
        }
        if self.correct_option >= self.options.len() {
            return Err(format!(
                "Question {} has correct_option {} out of range",
                n, self.correct_option
            ));
        }
        Ok(())
    }
}

/// Validate a question list; the message names the first offending question
pub fn validate_questions(questions: &[Question]) -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();
    for (i, q) in questions.iter().enumerate() {
        q.validate(i)?;
        if !seen.insert(q.id) {
            return Err(format!("Duplicate question id {}", q.id));
        }
    }
    Ok(())
}

/// Question as shown to learners before submission
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub prompt: String,
    pub options: Vec<String>,
}

/// A learner's answer to one question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: Uuid,
    pub selected_option: usize,
}

/// Per-question result revealed after submission
#[derive(Debug, Clone, Serialize)]
pub struct QuestionFeedback {
    pub question_id: Uuid,
    pub selected_option: Option<usize>,
    pub correct_option: usize,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Outcome of grading a submission
#[derive(Debug, Clone, Serialize)]
pub struct Grade {
    pub correct: u32,
    pub total: u32,
    /// Rounded percentage (0-100)
    pub score: u32,
    pub passed: bool,
    pub feedback: Vec<QuestionFeedback>,
}

impl Grade {
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

/// Grade answers against the question list.
///
/// Unanswered questions and answers to unknown question ids count as wrong.
/// When a question is answered more than once the first answer is used.
pub fn grade(questions: &[Question], answers: &[Answer], passing_score: u32) -> Grade {
    let mut selected: HashMap<Uuid, usize> = HashMap::new();
    for answer in answers {
        selected
            .entry(answer.question_id)
            .or_insert(answer.selected_option);
    }

    let feedback: Vec<QuestionFeedback> = questions
        .iter()
        .map(|q| {
            let choice = selected.get(&q.id).copied();
            QuestionFeedback {
                question_id: q.id,
                selected_option: choice,
                correct_option: q.correct_option,
                is_correct: choice == Some(q.correct_option),
                explanation: q.explanation.clone(),
            }
        })
        .collect();

    let total = questions.len() as u32;
    let correct = feedback.iter().filter(|f| f.is_correct).count() as u32;
    let score = percent(correct, total);

    Grade {
        correct,
        total,
        score,
        passed: total > 0 && score >= passing_score,
        feedback,
    }
}

/// Round-half-up integer percentage; 0 when `total` is 0
pub fn percent(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (part, total) = (u64::from(part), u64::from(total));
    ((200 * part + total) / (2 * total)) as u32
}
