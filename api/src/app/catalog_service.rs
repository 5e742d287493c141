//! Catalog service
//!
//! Subjects and chapters: listing for learners, authoring for admins.
//! Unpublished subjects (and everything inside them) are invisible to non-admins.

use std::sync::Arc;

use crate::app::validation;
use crate::app::xp_config::DEFAULT_CHAPTER_XP;
use crate::domain::entities::{
    Chapter, ChapterId, ChapterUpdate, NewChapter, NewSubject, Subject, SubjectId, SubjectUpdate,
    User,
};
use crate::domain::ports::{ChapterRepository, SubjectRepository};
use crate::error::{AppError, DomainError};

/// Admin input for a new subject
#[derive(Debug, Clone, Default)]
pub struct SubjectInput {
    pub title: String,
    /// Derived from the title when absent
    pub slug: Option<String>,
    pub description: Option<String>,
    pub order_index: Option<i32>,
    pub is_published: bool,
}

/// Admin input for a new chapter
#[derive(Debug, Clone, Default)]
pub struct ChapterInput {
    pub title: String,
    pub content: String,
    /// Appended after the last chapter when absent
    pub order_index: Option<i32>,
    pub xp_reward: Option<i32>,
}

pub(crate) fn is_admin(viewer: Option<&User>) -> bool {
    viewer.is_some_and(User::is_admin)
}

/// Service for subjects and chapters
pub struct CatalogService<SR, CR>
where
    SR: SubjectRepository,
    CR: ChapterRepository,
{
    subjects: Arc<SR>,
    chapters: Arc<CR>,
}

impl<SR, CR> CatalogService<SR, CR>
where
    SR: SubjectRepository,
    CR: ChapterRepository,
{
    pub fn new(subjects: Arc<SR>, chapters: Arc<CR>) -> Self {
        Self { subjects, chapters }
    }

    // ------------------------------------------------------------------
    // Subjects
    // ------------------------------------------------------------------

    pub async fn list_subjects(&self, viewer: Option<&User>) -> Result<Vec<Subject>, AppError> {
        Ok(self.subjects.list(is_admin(viewer)).await?)
    }

    /// Get a subject the viewer is allowed to see
    pub async fn get_subject(
        &self,
        id: &SubjectId,
        viewer: Option<&User>,
    ) -> Result<Subject, AppError> {
        self.subjects
            .find_by_id(id)
            .await?
            .filter(|s| s.visible_to(is_admin(viewer)))
            .ok_or_else(|| AppError::NotFound(format!("Subject {} not found", id)))
    }

    /// Get a subject with its ordered chapters
    pub async fn subject_with_chapters(
        &self,
        id: &SubjectId,
        viewer: Option<&User>,
    ) -> Result<(Subject, Vec<Chapter>), AppError> {
        let subject = self.get_subject(id, viewer).await?;
        let chapters = self.chapters.find_by_subject(id).await?;
        Ok((subject, chapters))
    }

    /// Get a subject regardless of visibility (authoring paths)
    pub async fn require_subject(&self, id: &SubjectId) -> Result<Subject, AppError> {
        self.subjects
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Subject {} not found", id)))
    }

    pub async fn create_subject(&self, input: SubjectInput) -> Result<Subject, AppError> {
        let title = input.title.trim().to_string();
        validation::title(&title)?;

        let slug = match input.slug {
            Some(slug) => slug.trim().to_string(),
            None => validation::slugify(&title),
        };
        validation::slug(&slug)?;

        if self.subjects.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::Domain(DomainError::AlreadyExists(format!(
                "Subject with slug '{}' already exists",
                slug
            ))));
        }

        let subject = self
            .subjects
            .create(&NewSubject {
                title,
                slug,
                description: input.description.filter(|d| !d.trim().is_empty()),
                order_index: input.order_index.unwrap_or(0),
                is_published: input.is_published,
            })
            .await?;

        tracing::info!(subject_id = %subject.id, slug = %subject.slug, "Subject created");

        Ok(subject)
    }

    pub async fn update_subject(
        &self,
        id: &SubjectId,
        mut update: SubjectUpdate,
    ) -> Result<Subject, AppError> {
        if let Some(title) = update.title.as_mut() {
            *title = title.trim().to_string();
            validation::title(title)?;
        }
        if let Some(slug) = &update.slug {
            validation::slug(slug)?;
            if let Some(other) = self.subjects.find_by_slug(slug).await? {
                if other.id != *id {
                    return Err(AppError::Domain(DomainError::AlreadyExists(format!(
                        "Subject with slug '{}' already exists",
                        slug
                    ))));
                }
            }
        }

        self.require_subject(id).await?;

        Ok(self.subjects.update(id, &update).await?)
    }

    pub async fn delete_subject(&self, id: &SubjectId) -> Result<(), AppError> {
        self.subjects.delete(id).await?;
        tracing::info!(subject_id = %id, "Subject deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Chapters
    // ------------------------------------------------------------------

    pub async fn list_chapters(
        &self,
        subject_id: &SubjectId,
        viewer: Option<&User>,
    ) -> Result<Vec<Chapter>, AppError> {
        self.get_subject(subject_id, viewer).await?;
        Ok(self.chapters.find_by_subject(subject_id).await?)
    }

    /// Get a chapter whose subject the viewer is allowed to see
    pub async fn get_chapter(
        &self,
        id: &ChapterId,
        viewer: Option<&User>,
    ) -> Result<Chapter, AppError> {
        let not_found = || AppError::NotFound(format!("Chapter {} not found", id));

        let chapter = self.chapters.find_by_id(id).await?.ok_or_else(not_found)?;
        let visible = self
            .subjects
            .find_by_id(&chapter.subject_id)
            .await?
            .is_some_and(|s| s.visible_to(is_admin(viewer)));

        if visible {
            Ok(chapter)
        } else {
            Err(not_found())
        }
    }

    /// Get a chapter regardless of visibility (authoring paths)
    pub async fn require_chapter(&self, id: &ChapterId) -> Result<Chapter, AppError> {
        self.chapters
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Chapter {} not found", id)))
    }

    pub async fn create_chapter(
        &self,
        subject_id: &SubjectId,
        input: ChapterInput,
    ) -> Result<Chapter, AppError> {
        let title = input.title.trim().to_string();
        validation::title(&title)?;
        let xp_reward = input.xp_reward.unwrap_or(DEFAULT_CHAPTER_XP);
        validation::xp_reward(xp_reward)?;

        self.require_subject(subject_id).await?;

        let order_index = match input.order_index {
            Some(i) => i,
            None => self
                .chapters
                .find_by_subject(subject_id)
                .await?
                .iter()
                .map(|c| c.order_index + 1)
                .max()
                .unwrap_or(0),
        };

        let chapter = self
            .chapters
            .create(&NewChapter {
                subject_id: *subject_id,
                title,
                content: input.content,
                order_index,
                xp_reward,
            })
            .await?;

        tracing::info!(chapter_id = %chapter.id, subject_id = %subject_id, "Chapter created");

        Ok(chapter)
    }

    pub async fn update_chapter(
        &self,
        id: &ChapterId,
        mut update: ChapterUpdate,
    ) -> Result<Chapter, AppError> {
        if let Some(title) = update.title.as_mut() {
            *title = title.trim().to_string();
            validation::title(title)?;
        }
        if let Some(xp) = update.xp_reward {
            validation::xp_reward(xp)?;
        }

        self.require_chapter(id).await?;

        Ok(self.chapters.update(id, &update).await?)
    }

    pub async fn delete_chapter(&self, id: &ChapterId) -> Result<(), AppError> {
        self.chapters.delete(id).await?;
        tracing::info!(chapter_id = %id, "Chapter deleted");
        Ok(())
    }

    pub async fn counts(&self) -> Result<(u64, u64), AppError> {
        Ok((self.subjects.count().await?, self.chapters.count().await?))
    }
}
