//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::Utc;

use crate::domain::entities::final_exam::{DEFAULT_EXAM_PASSING_SCORE, DEFAULT_EXAM_XP};
use crate::domain::entities::quiz::{DEFAULT_QUIZ_PASSING_SCORE, DEFAULT_QUIZ_XP};
use crate::domain::entities::{
    Answer, Chapter, ChapterId, FinalExam, FinalExamId, Question, Quiz, QuizId, Subject,
    SubjectId, User, UserId, UserRole,
};

/// Create a test student with default values
pub fn test_user() -> User {
    test_user_named("test-user")
}

/// Create a test student with a specific username
pub fn test_user_named(username: &str) -> User {
    User {
        id: UserId::new(),
        username: username.to_string(),
        email: format!("{}@example.com", username.to_lowercase()),
        role: UserRole::Student,
        password_hash: "hash".to_string(),
        password_salt: "salt".to_string(),
        token_hash: None,
        xp: 0,
        level: 1,
        current_streak: 0,
        longest_streak: 0,
        last_activity_on: None,
        created_at: Utc::now(),
        last_seen_at: None,
    }
}

/// Create a test admin
pub fn test_admin() -> User {
    User {
        role: UserRole::Admin,
        ..test_user_named("test-admin")
    }
}

/// Create a published subject
pub fn test_subject() -> Subject {
    let id = SubjectId::new();
    Subject {
        id,
        title: "Test Subject".to_string(),
        slug: format!("test-subject-{}", &id.0.simple().to_string()[..8]),
        description: Some("A subject for tests".to_string()),
        order_index: 0,
        is_published: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Create a subject that only admins can see
pub fn test_unpublished_subject() -> Subject {
    Subject {
        title: "Draft Subject".to_string(),
        is_published: false,
        ..test_subject()
    }
}

/// Create a chapter in the given subject
pub fn test_chapter(subject_id: SubjectId) -> Chapter {
    Chapter {
        id: ChapterId::new(),
        subject_id,
        title: "Test Chapter".to_string(),
        content: "# Heading\n\nSome content.".to_string(),
        order_index: 0,
        xp_reward: 15,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Create a three-option question whose answer is `correct`
pub fn test_question(correct: usize) -> Question {
    Question::new(
        "Which option is right?",
        vec!["first".to_string(), "second".to_string(), "third".to_string()],
        correct,
        Some("Because the fixture says so".to_string()),
    )
}

/// Create a two-question quiz in the given chapter
pub fn test_quiz(chapter_id: ChapterId) -> Quiz {
    Quiz {
        id: QuizId::new(),
        chapter_id,
        title: "Test Quiz".to_string(),
        passing_score: DEFAULT_QUIZ_PASSING_SCORE,
        xp_reward: DEFAULT_QUIZ_XP,
        questions: vec![test_question(0), test_question(1)],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Create a three-question final exam without a time limit
pub fn test_exam(subject_id: SubjectId) -> FinalExam {
    FinalExam {
        id: FinalExamId::new(),
        subject_id,
        title: "Test Final".to_string(),
        passing_score: DEFAULT_EXAM_PASSING_SCORE,
        time_limit_minutes: None,
        xp_reward: DEFAULT_EXAM_XP,
        questions: vec![test_question(2), test_question(0), test_question(1)],
        created_at: Utc::now(),
    }
}

/// Answer every question, either all correctly or all wrong
pub fn answers_for(questions: &[Question], correct: bool) -> Vec<Answer> {
    questions
        .iter()
        .map(|q| Answer {
            question_id: q.id,
            selected_option: if correct {
                q.correct_option
            } else {
                (q.correct_option + 1) % q.options.len()
            },
        })
        .collect()
}
