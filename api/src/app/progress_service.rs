//! Progress service
//!
//! Chapter completion and per-subject progress. A subject's progress counts
//! chapters, quizzes and its final exam (if any) as equal units.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::app::catalog_service::CatalogService;
use crate::app::gamification_service::{GamificationService, XpAward, XpReason, XpSummary};
use crate::domain::entities::question::percent;
use crate::domain::entities::{
    AssessmentKind, ChapterCompletion, ChapterId, NewChapterCompletion, Subject, SubjectId, User,
    XpEventKind,
};
use crate::domain::ports::{
    AttemptRepository, ChapterRepository, CompletionRepository, FinalExamRepository,
    QuizRepository, SubjectRepository, UserRepository, XpEventRepository,
};
use crate::error::AppError;

/// Result of marking a chapter complete
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResult {
    pub chapter_id: ChapterId,
    /// False when the chapter had already been completed
    pub newly_completed: bool,
    /// Present when this call paid out the chapter's XP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<XpAward>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectProgress {
    pub subject_id: SubjectId,
    pub subject_title: String,
    pub chapters_completed: u32,
    pub chapters_total: u32,
    pub completed_chapter_ids: Vec<ChapterId>,
    pub quizzes_passed: u32,
    pub quizzes_total: u32,
    pub has_exam: bool,
    pub exam_passed: bool,
    pub best_exam_score: Option<u32>,
    pub exam_unlocked: bool,
    pub percent: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressOverview {
    pub xp: XpSummary,
    pub subjects: Vec<SubjectProgress>,
}

/// Quizzes a user has passed, fetched once per request
struct Passed {
    quizzes: HashSet<Uuid>,
}

/// Service for chapter completion and progress reports
pub struct ProgressService<SR, CR, QR, ER, AR, CPR, UR, XR>
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

impl<SR, CR, QR, ER, AR, CPR, UR, XR> ProgressService<SR, CR, QR, ER, AR, CPR, UR, XR>
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

    /// Mark a chapter as read. Idempotent; the chapter's XP is paid once.
    ///
    /// The award is retried on every call, so a completion whose award
    /// failed earlier still earns its XP.
    pub async fn complete_chapter(
        &self,
        user: &User,
        chapter_id: &ChapterId,
    ) -> Result<CompletionResult, AppError> {
        let chapter = self.catalog.get_chapter(chapter_id, Some(user)).await?;

        let newly_completed = self
            .completions
            .create_if_absent(&NewChapterCompletion {
                user_id: user.id,
                chapter_id: chapter.id,
                subject_id: chapter.subject_id,
            })
            .await?
            .is_some();

        if newly_completed {
            tracing::info!(user_id = %user.id, chapter_id = %chapter.id, "Chapter completed");
        }

        let xp = self
            .gamification
            .award_xp(
                &user.id,
                vec![XpReason::new(
                    XpEventKind::ChapterCompleted,
                    chapter.xp_reward,
                    chapter.id.0,
                )
                .with_details(chapter.title.clone())],
            )
            .await?;

        if !newly_completed && xp.is_some() {
            tracing::warn!(
                user_id = %user.id,
                chapter_id = %chapter.id,
                "Chapter XP recovered for an earlier completion"
            );
        }

        Ok(CompletionResult {
            chapter_id: chapter.id,
            newly_completed,
            xp,
        })
    }

    /// Progress of one user through one subject
    pub async fn subject_progress(
        &self,
        user: &User,
        subject_id: &SubjectId,
    ) -> Result<SubjectProgress, AppError> {
        let subject = self.catalog.get_subject(subject_id, Some(user)).await?;
        let completions = self
            .completions
            .find_by_user_and_subject(&user.id, subject_id)
            .await?;
        let passed = self.passed(user).await?;

        self.progress_for(user, subject, &completions, &passed).await
    }

    /// Progress across every subject the user can see, plus their XP summary
    pub async fn overview(&self, user: &User) -> Result<ProgressOverview, AppError> {
        let subjects = self.catalog.list_subjects(Some(user)).await?;
        let completions = self.completions.find_by_user(&user.id).await?;
        let passed = self.passed(user).await?;

        let mut progress = Vec::with_capacity(subjects.len());
        for subject in subjects {
            let subject_completions: Vec<ChapterCompletion> = completions
                .iter()
                .filter(|c| c.subject_id == subject.id)
                .cloned()
                .collect();
            progress.push(
                self.progress_for(user, subject, &subject_completions, &passed)
                    .await?,
            );
        }

        Ok(ProgressOverview {
            xp: XpSummary::for_user(user, Utc::now().date_naive()),
            subjects: progress,
        })
    }

    async fn passed(&self, user: &User) -> Result<Passed, AppError> {
        Ok(Passed {
            quizzes: self
                .attempts
                .find_passed_ids(&user.id, AssessmentKind::Quiz)
                .await?
                .into_iter()
                .collect(),
        })
    }

    async fn progress_for(
        &self,
        user: &User,
        subject: Subject,
        completions: &[ChapterCompletion],
        passed: &Passed,
    ) -> Result<SubjectProgress, AppError> {
        let (subject, chapters) = self
            .catalog
            .subject_with_chapters(&subject.id, Some(user))
            .await?;
        let chapter_ids: Vec<ChapterId> = chapters.iter().map(|c| c.id).collect();
        let quizzes = self.quizzes.find_by_chapters(&chapter_ids).await?;
        let exam = self.exams.find_by_subject(&subject.id).await?;

        // Completions of chapters deleted since no longer count
        let done: HashSet<ChapterId> = completions.iter().map(|c| c.chapter_id).collect();
        let completed_chapter_ids: Vec<ChapterId> = chapter_ids
            .iter()
            .copied()
            .filter(|id| done.contains(id))
            .collect();

        let chapters_completed = completed_chapter_ids.len() as u32;
        let chapters_total = chapters.len() as u32;
        let quizzes_total = quizzes.len() as u32;
        let quizzes_passed = quizzes
            .iter()
            .filter(|q| passed.quizzes.contains(&q.id.0))
            .count() as u32;

        // Exam attempts count per subject, across replaced exam versions
        let (exam_passed, best_exam_score) = if exam.is_some() {
            let attempts = self
                .attempts
                .find_by_user_and_subject(&user.id, AssessmentKind::FinalExam, &subject.id)
                .await?;
            (
                attempts.iter().any(|a| a.passed),
                attempts.iter().map(|a| a.score).max(),
            )
        } else {
            (false, None)
        };

        let has_exam = exam.is_some();
        let units_total = chapters_total + quizzes_total + u32::from(has_exam);
        let units_done = chapters_completed + quizzes_passed + u32::from(exam_passed);

        Ok(SubjectProgress {
            subject_id: subject.id,
            subject_title: subject.title,
            chapters_completed,
            chapters_total,
            completed_chapter_ids,
            quizzes_passed,
            quizzes_total,
            has_exam,
            exam_passed,
            best_exam_score,
            exam_unlocked: has_exam && chapters_completed == chapters_total,
            percent: percent(units_done, units_total),
            completed: is_complete(units_done, units_total),
        })
    }
}

/// Every unit done; the rounded percentage can read 100 before that
fn is_complete(units_done: u32, units_total: u32) -> bool {
    units_total > 0 && units_done == units_total
}
