//! Assessment service
//!
//! Quizzes and final exams: authoring, grading submissions and awarding XP
//! for the first passing attempt.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::catalog_service::CatalogService;
use crate::app::gamification_service::{GamificationService, XpAward, XpReason};
use crate::app::validation;
use crate::app::xp_config::XP_PERFECT_QUIZ_BONUS;
use crate::domain::entities::{
    grade, validate_questions, Answer, AssessmentKind, Attempt, Chapter, ChapterId, FinalExam,
    FinalExamId, Grade, NewAttempt, NewFinalExam, NewQuiz, Question, Quiz, QuizId, QuizUpdate,
    SubjectId, User, XpEventKind,
};
use crate::domain::entities::final_exam::{DEFAULT_EXAM_PASSING_SCORE, DEFAULT_EXAM_XP};
use crate::domain::entities::quiz::{DEFAULT_QUIZ_PASSING_SCORE, DEFAULT_QUIZ_XP};
use crate::domain::ports::{
    AttemptRepository, ChapterRepository, CompletionRepository, FinalExamRepository,
    QuizRepository, SubjectRepository, UserRepository, XpEventRepository,
};
use crate::error::{AppError, DomainError};

/// Admin input for a new quiz
#[derive(Debug, Clone, Default)]
pub struct QuizInput {
    pub title: String,
    pub passing_score: Option<u32>,
    pub xp_reward: Option<i32>,
    pub questions: Vec<Question>,
}

/// Admin input for a subject's final exam
#[derive(Debug, Clone, Default)]
pub struct ExamInput {
    pub title: String,
    pub passing_score: Option<u32>,
    pub time_limit_minutes: Option<u32>,
    pub xp_reward: Option<i32>,
    pub questions: Vec<Question>,
}

/// Result of grading a submission
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub attempt: Attempt,
    pub grade: Grade,
    /// True when this attempt is the user's first pass of the assessment
    pub first_pass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<XpAward>,
}

/// Totals shown on the admin dashboard
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AssessmentCounts {
    pub quizzes: u64,
    pub exams: u64,
    pub attempts: u64,
}

/// Service for quizzes, final exams and attempts
pub struct AssessmentService<SR, CR, QR, ER, AR, CPR, UR, XR>
where
    SR: SubjectRepository,
    CR: ChapterRepository,
    QR: QuizRepository,
    ER: FinalExamRepository,
    AR: AttemptRepository,
    CPR: CompletionRepository,
    UR: UserRepository,
    XR: XpEventRepository,
{
    catalog: Arc<CatalogService<SR, CR>>,
    quizzes: Arc<QR>,
    exams: Arc<ER>,
    attempts: Arc<AR>,
    completions: Arc<CPR>,
    gamification: Arc<GamificationService<UR, XR>>,
}

impl<SR, CR, QR, ER, AR, CPR, UR, XR> AssessmentService<SR, CR, QR, ER, AR, CPR, UR, XR>
where
    SR: SubjectRepository,
    CR: ChapterRepository,
    QR: QuizRepository,
    ER: FinalExamRepository,
    AR: AttemptRepository,
    CPR: CompletionRepository,
    UR: UserRepository,
    XR: XpEventRepository,
{
    pub fn new(
        catalog: Arc<CatalogService<SR, CR>>,
        quizzes: Arc<QR>,
        exams: Arc<ER>,
        attempts: Arc<AR>,
        completions: Arc<CPR>,
        gamification: Arc<GamificationService<UR, XR>>,
    ) -> Self {
        Self {
            catalog,
            quizzes,
            exams,
            attempts,
            completions,
            gamification,
        }
    }

    // ------------------------------------------------------------------
    // Quizzes
    // ------------------------------------------------------------------

    pub async fn list_quizzes(
        &self,
        chapter_id: &ChapterId,
        viewer: Option<&User>,
    ) -> Result<Vec<Quiz>, AppError> {
        self.catalog.get_chapter(chapter_id, viewer).await?;
        Ok(self.quizzes.find_by_chapter(chapter_id).await?)
    }

    /// Get a quiz whose chapter the viewer is allowed to see
    pub async fn get_quiz(&self, id: &QuizId, viewer: Option<&User>) -> Result<Quiz, AppError> {
        Ok(self.visible_quiz(id, viewer).await?.0)
    }

    async fn visible_quiz(
        &self,
        id: &QuizId,
        viewer: Option<&User>,
    ) -> Result<(Quiz, Chapter), AppError> {
        let not_found = || AppError::NotFound(format!("Quiz {} not found", id));

        let quiz = self.quizzes.find_by_id(id).await?.ok_or_else(not_found)?;
        let chapter = self
            .catalog
            .get_chapter(&quiz.chapter_id, viewer)
            .await
            .map_err(|_| not_found())?;

        Ok((quiz, chapter))
    }

    pub async fn create_quiz(
        &self,
        chapter_id: &ChapterId,
        input: QuizInput,
    ) -> Result<Quiz, AppError> {
        let title = input.title.trim().to_string();
        let passing_score = input.passing_score.unwrap_or(DEFAULT_QUIZ_PASSING_SCORE);
        let xp_reward = input.xp_reward.unwrap_or(DEFAULT_QUIZ_XP);
        validate_assessment(&title, passing_score, xp_reward, &input.questions)?;

        self.catalog.require_chapter(chapter_id).await?;

        let quiz = self
            .quizzes
            .create(&NewQuiz {
                chapter_id: *chapter_id,
                title,
                passing_score,
                xp_reward,
                questions: input.questions,
            })
            .await?;

        tracing::info!(
            quiz_id = %quiz.id,
            chapter_id = %chapter_id,
            questions = quiz.questions.len(),
            "Quiz created"
        );

        Ok(quiz)
    }

    pub async fn update_quiz(&self, id: &QuizId, mut update: QuizUpdate) -> Result<Quiz, AppError> {
        if let Some(title) = update.title.as_mut() {
            *title = title.trim().to_string();
            validation::title(title)?;
        }
        if let Some(score) = update.passing_score {
            validation::passing_score(score)?;
        }
        if let Some(xp) = update.xp_reward {
            validation::xp_reward(xp)?;
        }
        if let Some(questions) = &update.questions {
            validate_questions(questions).map_err(DomainError::Validation)?;
        }

        if self.quizzes.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Quiz {} not found", id)));
        }

        Ok(self.quizzes.update(id, &update).await?)
    }

    pub async fn delete_quiz(&self, id: &QuizId) -> Result<(), AppError> {
        self.quizzes.delete(id).await?;
        tracing::info!(quiz_id = %id, "Quiz deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Final exams
    // ------------------------------------------------------------------

    /// Create the subject's final exam, replacing any previous one
    pub async fn replace_exam(
        &self,
        subject_id: &SubjectId,
        input: ExamInput,
    ) -> Result<FinalExam, AppError> {
        let title = input.title.trim().to_string();
        let passing_score = input.passing_score.unwrap_or(DEFAULT_EXAM_PASSING_SCORE);
        let xp_reward = input.xp_reward.unwrap_or(DEFAULT_EXAM_XP);
        validate_assessment(&title, passing_score, xp_reward, &input.questions)?;
        if let Some(minutes) = input.time_limit_minutes {
            validation::time_limit(minutes)?;
        }

        self.catalog.require_subject(subject_id).await?;

        let exam = self
            .exams
            .replace(&NewFinalExam {
                subject_id: *subject_id,
                title,
                passing_score,
                time_limit_minutes: input.time_limit_minutes,
                xp_reward,
                questions: input.questions,
            })
            .await?;

        tracing::info!(exam_id = %exam.id, subject_id = %subject_id, "Final exam replaced");

        Ok(exam)
    }

    pub async fn get_subject_exam(
        &self,
        subject_id: &SubjectId,
        viewer: Option<&User>,
    ) -> Result<FinalExam, AppError> {
        self.catalog.get_subject(subject_id, viewer).await?;
        self.exams
            .find_by_subject(subject_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Subject {} has no final exam", subject_id))
            })
    }

    pub async fn delete_exam(&self, id: &FinalExamId) -> Result<(), AppError> {
        self.exams.delete(id).await?;
        tracing::info!(exam_id = %id, "Final exam deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Submissions
    // ------------------------------------------------------------------

    /// Grade a quiz submission.
    ///
    /// XP is awarded only on the first passing attempt; a perfect first pass
    /// earns an additional bonus.
    pub async fn submit_quiz(
        &self,
        user: &User,
        quiz_id: &QuizId,
        answers: &[Answer],
    ) -> Result<Submission, AppError> {
        let (quiz, chapter) = self.visible_quiz(quiz_id, Some(user)).await?;
        ensure_has_questions(&quiz.questions)?;

        let grade = grade(&quiz.questions, answers, quiz.passing_score);

        let xp = if grade.passed {
            let mut reasons = vec![
                XpReason::new(XpEventKind::QuizPassed, quiz.xp_reward, quiz.id.0)
                    .with_details(quiz.title.clone()),
            ];
            if grade.is_perfect() {
                reasons.push(
                    XpReason::new(XpEventKind::PerfectQuiz, XP_PERFECT_QUIZ_BONUS, quiz.id.0)
                        .with_details(quiz.title.clone()),
                );
            }
            self.gamification.award_xp(&user.id, reasons).await?
        } else {
            None
        };

        let attempt = NewAttempt {
            xp_awarded: xp.as_ref().map_or(0, XpAward::activity_xp),
            ..NewAttempt::graded(
                user.id,
                AssessmentKind::Quiz,
                quiz.id.0,
                chapter.subject_id,
                &grade,
            )
        };
        let attempt = self.record(attempt).await?;

        Ok(Submission {
            attempt,
            grade,
            first_pass: xp.is_some(),
            xp,
        })
    }

    /// Grade a final exam submission received now
    pub async fn submit_exam(
        &self,
        user: &User,
        exam_id: &FinalExamId,
        answers: &[Answer],
        started_at: Option<DateTime<Utc>>,
    ) -> Result<Submission, AppError> {
        self.submit_exam_at(user, exam_id, answers, started_at, Utc::now())
            .await
    }

    /// Grade a final exam submission received at `now`.
    ///
    /// Every chapter of the subject must be completed first. A submission
    /// past the time limit is recorded as timed out and never passes.
    pub async fn submit_exam_at(
        &self,
        user: &User,
        exam_id: &FinalExamId,
        answers: &[Answer],
        started_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Submission, AppError> {
        let not_found = || AppError::NotFound(format!("Final exam {} not found", exam_id));

        let exam = self.exams.find_by_id(exam_id).await?.ok_or_else(not_found)?;
        let (_, chapters) = self
            .catalog
            .subject_with_chapters(&exam.subject_id, Some(user))
            .await
            .map_err(|_| not_found())?;
        ensure_has_questions(&exam.questions)?;

        let completed: HashSet<ChapterId> = self
            .completions
            .find_by_user_and_subject(&user.id, &exam.subject_id)
            .await?
            .into_iter()
            .map(|c| c.chapter_id)
            .collect();
        if chapters.iter().any(|c| !completed.contains(&c.id)) {
            return Err(AppError::Domain(DomainError::Forbidden(
                "Complete every chapter of this subject before taking its final exam".to_string(),
            )));
        }

        let timed_out = started_at.is_some_and(|start| exam.is_overtime(start, now));
        let mut grade = grade(&exam.questions, answers, exam.passing_score);
        if timed_out {
            grade.passed = false;
            tracing::info!(
                user_id = %user.id,
                exam_id = %exam.id,
                "Exam submitted after time limit"
            );
        }

        // Keyed on the subject: a replaced exam does not pay out again
        let xp = if grade.passed {
            self.gamification
                .award_xp(
                    &user.id,
                    vec![XpReason::new(
                        XpEventKind::ExamPassed,
                        exam.xp_reward,
                        exam.subject_id.0,
                    )
                    .with_details(exam.title.clone())],
                )
                .await?
        } else {
            None
        };

        let attempt = NewAttempt {
            timed_out,
            xp_awarded: xp.as_ref().map_or(0, XpAward::activity_xp),
            ..NewAttempt::graded(
                user.id,
                AssessmentKind::FinalExam,
                exam.id.0,
                exam.subject_id,
                &grade,
            )
        };
        let attempt = self.record(attempt).await?;

        Ok(Submission {
            attempt,
            grade,
            first_pass: xp.is_some(),
            xp,
        })
    }

    /// The user's attempts, newest first
    pub async fn list_attempts(
        &self,
        user: &User,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Attempt>, AppError> {
        Ok(self
            .attempts
            .find_by_user(&user.id, limit.clamp(1, 100), offset.max(0))
            .await?)
    }

    pub async fn counts(&self) -> Result<AssessmentCounts, AppError> {
        Ok(AssessmentCounts {
            quizzes: self.quizzes.count().await?,
            exams: self.exams.count().await?,
            attempts: self.attempts.count().await?,
        })
    }

    async fn record(&self, attempt: NewAttempt) -> Result<Attempt, AppError> {
        let attempt = self.attempts.record(attempt).await?;

        tracing::debug!(
            user_id = %attempt.user_id,
            kind = %attempt.kind,
            assessment_id = %attempt.assessment_id,
            score = attempt.score,
            passed = attempt.passed,
            "Attempt recorded"
        );

        Ok(attempt)
    }
}

fn validate_assessment(
    title: &str,
    passing_score: u32,
    xp_reward: i32,
    questions: &[Question],
) -> Result<(), AppError> {
    validation::title(title)?;
    validation::passing_score(passing_score)?;
    validation::xp_reward(xp_reward)?;
    validate_questions(questions).map_err(DomainError::Validation)?;
    Ok(())
}

fn ensure_has_questions(questions: &[Question]) -> Result<(), AppError> {
    if questions.is_empty() {
        return Err(AppError::BadRequest(
            "This assessment has no questions yet".to_string(),
        ));
    }
    Ok(())
}
