//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::domain::entities::{
    AppliedXp, AssessmentKind, Attempt, AttemptId, Chapter, ChapterCompletion, ChapterId,
    ChapterUpdate, FinalExam, FinalExamId, NewAttempt, NewChapter, NewChapterCompletion,
    NewFinalExam, NewQuiz, NewSubject, NewUser, Quiz, QuizId, QuizUpdate, Subject, SubjectId,
    SubjectUpdate, User, UserId, UserRole, XpClaim, XpEvent, XpEventId, XpGrant,
};
use crate::domain::ports::{
    AttemptRepository, ChapterRepository, CompletionRepository, FinalExamRepository,
    QuizRepository, SubjectRepository, UserRepository, XpEventRepository,
};
use crate::error::DomainError;

fn page<T: Clone>(items: &[T], limit: i64, offset: i64) -> Vec<T> {
    items
        .iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

// ============================================================================
// In-Memory User Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a user for testing
    pub fn with_user(self, user: User) -> Self {
        self.users.write().unwrap().insert(user.id, user);
        self
    }

    fn find_where(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.users.read().unwrap().values().find(|u| pred(u)).cloned()
    }

    fn modify(&self, id: &UserId, f: impl FnOnce(&mut User)) -> Result<(), DomainError> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("User {}", id)))?;
        f(user);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self.find_where(|u| u.username.eq_ignore_ascii_case(username)))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.find_where(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn find_by_token_hash(&self, hash: &str) -> Result<Option<User>, DomainError> {
        Ok(self.find_where(|u| u.token_hash.as_deref() == Some(hash)))
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, DomainError> {
        let mut users = self.users.write().unwrap();
        if users.values().any(|u| {
            u.username.eq_ignore_ascii_case(&new_user.username)
                || u.email.eq_ignore_ascii_case(&new_user.email)
        }) {
            return Err(DomainError::AlreadyExists("User".to_string()));
        }

        let user = User {
            id: UserId::new(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            role: new_user.role,
            password_hash: new_user.password_hash.clone(),
            password_salt: new_user.password_salt.clone(),
            token_hash: Some(new_user.token_hash.clone()),
            xp: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_activity_on: None,
            created_at: Utc::now(),
            last_seen_at: None,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_token_hash(&self, id: &UserId, hash: Option<&str>) -> Result<(), DomainError> {
        self.modify(id, |u| u.token_hash = hash.map(str::to_string))
    }

    async fn update_last_seen(&self, id: &UserId) -> Result<(), DomainError> {
        self.modify(id, |u| u.last_seen_at = Some(Utc::now()))
    }

    async fn update_role(&self, id: &UserId, role: UserRole) -> Result<(), DomainError> {
        self.modify(id, |u| u.role = role)
    }

    async fn find_top_by_xp(&self, limit: i64) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<User> = self.users.read().unwrap().values().cloned().collect();
        users.sort_by(|a, b| b.xp.cmp(&a.xp).then(a.created_at.cmp(&b.created_at)));
        Ok(page(&users, limit, 0))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<User> = self.users.read().unwrap().values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(page(&users, limit, offset))
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.users.read().unwrap().len() as u64)
    }
}

// ============================================================================
// In-Memory Subject Repository
// ============================================================================

#[derive(Default)]
pub struct InMemorySubjectRepository {
    subjects: Arc<RwLock<HashMap<SubjectId, Subject>>>,
}

impl InMemorySubjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(self, subject: Subject) -> Self {
        self.subjects.write().unwrap().insert(subject.id, subject);
        self
    }
}

#[async_trait]
impl SubjectRepository for InMemorySubjectRepository {
    async fn find_by_id(&self, id: &SubjectId) -> Result<Option<Subject>, DomainError> {
        Ok(self.subjects.read().unwrap().get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Subject>, DomainError> {
        Ok(self
            .subjects
            .read()
            .unwrap()
            .values()
            .find(|s| s.slug == slug)
            .cloned())
    }

    async fn list(&self, include_unpublished: bool) -> Result<Vec<Subject>, DomainError> {
        let mut subjects: Vec<Subject> = self
            .subjects
            .read()
            .unwrap()
            .values()
            .filter(|s| include_unpublished || s.is_published)
            .cloned()
            .collect();
        subjects.sort_by_key(|s| (s.order_index, s.created_at));
        Ok(subjects)
    }

    async fn create(&self, new_subject: &NewSubject) -> Result<Subject, DomainError> {
        let mut subjects = self.subjects.write().unwrap();
        if subjects.values().any(|s| s.slug == new_subject.slug) {
            return Err(DomainError::AlreadyExists(new_subject.slug.clone()));
        }
        let subject = Subject {
            id: SubjectId::new(),
            title: new_subject.title.clone(),
            slug: new_subject.slug.clone(),
            description: new_subject.description.clone(),
            order_index: new_subject.order_index,
            is_published: new_subject.is_published,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        subjects.insert(subject.id, subject.clone());
        Ok(subject)
    }

    async fn update(&self, id: &SubjectId, update: &SubjectUpdate) -> Result<Subject, DomainError> {
        let mut subjects = self.subjects.write().unwrap();
        let subject = subjects
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Subject {}", id)))?;
        update.apply(subject);
        Ok(subject.clone())
    }

    async fn delete(&self, id: &SubjectId) -> Result<(), DomainError> {
        self.subjects
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("Subject {}", id)))
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.subjects.read().unwrap().len() as u64)
    }
}

// ============================================================================
// In-Memory Chapter Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryChapterRepository {
    chapters: Arc<RwLock<HashMap<ChapterId, Chapter>>>,
}

impl InMemoryChapterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chapter(self, chapter: Chapter) -> Self {
        self.chapters.write().unwrap().insert(chapter.id, chapter);
        self
    }
}

#[async_trait]
impl ChapterRepository for InMemoryChapterRepository {
    async fn find_by_id(&self, id: &ChapterId) -> Result<Option<Chapter>, DomainError> {
        Ok(self.chapters.read().unwrap().get(id).cloned())
    }

    async fn find_by_subject(&self, subject_id: &SubjectId) -> Result<Vec<Chapter>, DomainError> {
        let mut chapters: Vec<Chapter> = self
            .chapters
            .read()
            .unwrap()
            .values()
            .filter(|c| c.subject_id == *subject_id)
            .cloned()
            .collect();
        chapters.sort_by_key(|c| (c.order_index, c.created_at));
        Ok(chapters)
    }

    async fn create(&self, new_chapter: &NewChapter) -> Result<Chapter, DomainError> {
        let chapter = Chapter {
            id: ChapterId::new(),
            subject_id: new_chapter.subject_id,
            title: new_chapter.title.clone(),
            content: new_chapter.content.clone(),
            order_index: new_chapter.order_index,
            xp_reward: new_chapter.xp_reward,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.chapters
            .write()
            .unwrap()
            .insert(chapter.id, chapter.clone());
        Ok(chapter)
    }

    async fn update(&self, id: &ChapterId, update: &ChapterUpdate) -> Result<Chapter, DomainError> {
        let mut chapters = self.chapters.write().unwrap();
        let chapter = chapters
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Chapter {}", id)))?;
        update.apply(chapter);
        Ok(chapter.clone())
    }

    async fn delete(&self, id: &ChapterId) -> Result<(), DomainError> {
        self.chapters
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("Chapter {}", id)))
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.chapters.read().unwrap().len() as u64)
    }
}

// ============================================================================
// In-Memory Quiz Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: Arc<RwLock<HashMap<QuizId, Quiz>>>,
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quiz(self, quiz: Quiz) -> Self {
        self.quizzes.write().unwrap().insert(quiz.id, quiz);
        self
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_by_id(&self, id: &QuizId) -> Result<Option<Quiz>, DomainError> {
        Ok(self.quizzes.read().unwrap().get(id).cloned())
    }

    async fn find_by_chapter(&self, chapter_id: &ChapterId) -> Result<Vec<Quiz>, DomainError> {
        self.find_by_chapters(std::slice::from_ref(chapter_id)).await
    }

    async fn find_by_chapters(&self, chapter_ids: &[ChapterId]) -> Result<Vec<Quiz>, DomainError> {
        let mut quizzes: Vec<Quiz> = self
            .quizzes
            .read()
            .unwrap()
            .values()
            .filter(|q| chapter_ids.contains(&q.chapter_id))
            .cloned()
            .collect();
        quizzes.sort_by_key(|q| q.created_at);
        Ok(quizzes)
    }

    async fn create(&self, new_quiz: &NewQuiz) -> Result<Quiz, DomainError> {
        let quiz = Quiz {
            id: QuizId::new(),
            chapter_id: new_quiz.chapter_id,
            title: new_quiz.title.clone(),
            passing_score: new_quiz.passing_score,
            xp_reward: new_quiz.xp_reward,
            questions: new_quiz.questions.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.quizzes.write().unwrap().insert(quiz.id, quiz.clone());
        Ok(quiz)
    }

    async fn update(&self, id: &QuizId, update: &QuizUpdate) -> Result<Quiz, DomainError> {
        let mut quizzes = self.quizzes.write().unwrap();
        let quiz = quizzes
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Quiz {}", id)))?;
        update.apply(quiz);
        Ok(quiz.clone())
    }

    async fn delete(&self, id: &QuizId) -> Result<(), DomainError> {
        self.quizzes
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("Quiz {}", id)))
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.quizzes.read().unwrap().len() as u64)
    }
}

// ============================================================================
// In-Memory Final Exam Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryFinalExamRepository {
    exams: Arc<RwLock<HashMap<FinalExamId, FinalExam>>>,
}

impl InMemoryFinalExamRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exam(self, exam: FinalExam) -> Self {
        self.exams.write().unwrap().insert(exam.id, exam);
        self
    }
}

#[async_trait]
impl FinalExamRepository for InMemoryFinalExamRepository {
    async fn find_by_id(&self, id: &FinalExamId) -> Result<Option<FinalExam>, DomainError> {
        Ok(self.exams.read().unwrap().get(id).cloned())
    }

    async fn find_by_subject(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Option<FinalExam>, DomainError> {
        Ok(self
            .exams
            .read()
            .unwrap()
            .values()
            .find(|e| e.subject_id == *subject_id)
            .cloned())
    }

    async fn replace(&self, new_exam: &NewFinalExam) -> Result<FinalExam, DomainError> {
        let exam = FinalExam {
            id: FinalExamId::new(),
            subject_id: new_exam.subject_id,
            title: new_exam.title.clone(),
            passing_score: new_exam.passing_score,
            time_limit_minutes: new_exam.time_limit_minutes,
            xp_reward: new_exam.xp_reward,
            questions: new_exam.questions.clone(),
            created_at: Utc::now(),
        };
        let mut exams = self.exams.write().unwrap();
        exams.retain(|_, e| e.subject_id != new_exam.subject_id);
        exams.insert(exam.id, exam.clone());
        Ok(exam)
    }

    async fn delete(&self, id: &FinalExamId) -> Result<(), DomainError> {
        self.exams
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("Final exam {}", id)))
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.exams.read().unwrap().len() as u64)
    }
}

// ============================================================================
// In-Memory Attempt Repository
// ============================================================================

/// Attempts are kept in insertion order; queries return newest first
#[derive(Default)]
pub struct InMemoryAttemptRepository {
    attempts: Arc<RwLock<Vec<Attempt>>>,
}

impl InMemoryAttemptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(&self, pred: impl Fn(&Attempt) -> bool) -> Vec<Attempt> {
        self.attempts
            .read()
            .unwrap()
            .iter()
            .rev()
            .filter(|a| pred(a))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AttemptRepository for InMemoryAttemptRepository {
    async fn record(&self, new_attempt: NewAttempt) -> Result<Attempt, DomainError> {
        let attempt = Attempt {
            id: AttemptId::new(),
            user_id: new_attempt.user_id,
            kind: new_attempt.kind,
            assessment_id: new_attempt.assessment_id,
            subject_id: new_attempt.subject_id,
            score: new_attempt.score,
            correct: new_attempt.correct,
            total: new_attempt.total,
            passed: new_attempt.passed,
            timed_out: new_attempt.timed_out,
            xp_awarded: new_attempt.xp_awarded,
            created_at: Utc::now(),
        };
        self.attempts.write().unwrap().push(attempt.clone());
        Ok(attempt)
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Attempt>, DomainError> {
        Ok(page(
            &self.newest_first(|a| a.user_id == *user_id),
            limit,
            offset,
        ))
    }

    async fn find_by_user_and_subject(
        &self,
        user_id: &UserId,
        kind: AssessmentKind,
        subject_id: &SubjectId,
    ) -> Result<Vec<Attempt>, DomainError> {
        Ok(self.newest_first(|a| {
            a.user_id == *user_id && a.kind == kind && a.subject_id == *subject_id
        }))
    }

    async fn find_passed_ids(
        &self,
        user_id: &UserId,
        kind: AssessmentKind,
    ) -> Result<Vec<Uuid>, DomainError> {
        let mut ids: Vec<Uuid> = self
            .newest_first(|a| a.user_id == *user_id && a.kind == kind && a.passed)
            .into_iter()
            .map(|a| a.assessment_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.attempts.read().unwrap().len() as u64)
    }
}

// ============================================================================
// In-Memory Completion Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryCompletionRepository {
    completions: Arc<RwLock<Vec<ChapterCompletion>>>,
}

impl InMemoryCompletionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletionRepository for InMemoryCompletionRepository {
    async fn create_if_absent(
        &self,
        completion: &NewChapterCompletion,
    ) -> Result<Option<ChapterCompletion>, DomainError> {
        let mut completions = self.completions.write().unwrap();
        if completions
            .iter()
            .any(|c| c.user_id == completion.user_id && c.chapter_id == completion.chapter_id)
        {
            return Ok(None);
        }
        let created = ChapterCompletion {
            user_id: completion.user_id,
            chapter_id: completion.chapter_id,
            subject_id: completion.subject_id,
            completed_at: Utc::now(),
        };
        completions.push(created.clone());
        Ok(Some(created))
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<ChapterCompletion>, DomainError> {
        Ok(self
            .completions
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn find_by_user_and_subject(
        &self,
        user_id: &UserId,
        subject_id: &SubjectId,
    ) -> Result<Vec<ChapterCompletion>, DomainError> {
        Ok(self
            .completions
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == *user_id && c.subject_id == *subject_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// In-Memory XP Event Repository
// ============================================================================

/// Ledger that writes stats into the users of an `InMemoryUserRepository`
pub struct InMemoryXpEventRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    events: Arc<RwLock<Vec<XpEvent>>>,
}

impl InMemoryXpEventRepository {
    /// Share the user map so awards land on the same rows the services read
    pub fn for_users(users: &InMemoryUserRepository) -> Self {
        Self {
            users: users.users.clone(),
            events: Arc::default(),
        }
    }
}

#[async_trait]
impl XpEventRepository for InMemoryXpEventRepository {
    async fn apply_award(
        &self,
        user_id: &UserId,
        claim: Option<XpClaim>,
        plan: &(dyn for<'u> Fn(&'u User) -> XpGrant + Send + Sync),
    ) -> Result<Option<AppliedXp>, DomainError> {
        // Both locks held for the whole award, like the row lock in Postgres
        let mut users = self.users.write().unwrap();
        let mut events = self.events.write().unwrap();

        let user = users
            .get_mut(user_id)
            .ok_or_else(|| DomainError::NotFound(format!("User not found: {}", user_id)))?;

        if let Some(claim) = claim {
            let claimed = events.iter().any(|e| {
                e.user_id == *user_id
                    && e.kind == claim.kind
                    && e.reference_id == Some(claim.reference_id)
            });
            if claimed {
                return Ok(None);
            }
        }

        let before = user.clone();
        let grant = plan(&before);

        user.xp = grant.stats.xp;
        user.level = grant.stats.level;
        user.current_streak = grant.stats.current_streak;
        user.longest_streak = grant.stats.longest_streak;
        user.last_activity_on = grant.stats.last_activity_on;

        let created: Vec<XpEvent> = grant
            .events
            .into_iter()
            .map(|event| XpEvent {
                id: XpEventId::new(),
                user_id: event.user_id,
                kind: event.kind,
                delta: event.delta,
                xp_after: event.xp_after,
                reference_id: event.reference_id,
                details: event.details,
                created_at: Utc::now(),
            })
            .collect();
        events.extend(created.iter().cloned());

        Ok(Some(AppliedXp {
            before,
            stats: grant.stats,
            events: created,
        }))
    }

    async fn find_by_user_paginated(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<XpEvent>, DomainError> {
        let events: Vec<XpEvent> = self
            .events
            .read()
            .unwrap()
            .iter()
            .rev()
            .filter(|e| e.user_id == *user_id)
            .cloned()
            .collect();
        Ok(page(&events, limit, offset))
    }

    async fn sum_delta_by_user(&self, user_id: &UserId) -> Result<i64, DomainError> {
        Ok(self
            .events
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == *user_id)
            .map(|e| i64::from(e.delta))
            .sum())
    }
}
