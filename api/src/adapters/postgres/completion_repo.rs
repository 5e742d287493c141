//! PostgreSQL adapter for CompletionRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use super::db_err;
use crate::domain::entities::{
    ChapterCompletion, ChapterId, NewChapterCompletion, SubjectId, UserId,
};
use crate::domain::ports::CompletionRepository;
use crate::entity::chapter_completions;
use crate::error::DomainError;

/// PostgreSQL implementation of CompletionRepository
pub struct PostgresCompletionRepository {
    db: DatabaseConnection,
}

impl PostgresCompletionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CompletionRepository for PostgresCompletionRepository {
    async fn create_if_absent(
        &self,
        completion: &NewChapterCompletion,
    ) -> Result<Option<ChapterCompletion>, DomainError> {
        let now = Utc::now();

        let model = chapter_completions::ActiveModel {
            user_id: Set(completion.user_id.0),
            chapter_id: Set(completion.chapter_id.0),
            subject_id: Set(completion.subject_id.0),
            completed_at: Set(now.fixed_offset()),
        };

        let inserted = chapter_completions::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    chapter_completions::Column::UserId,
                    chapter_completions::Column::ChapterId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        if inserted == 0 {
            return Ok(None);
        }

        Ok(Some(ChapterCompletion {
            user_id: completion.user_id,
            chapter_id: completion.chapter_id,
            subject_id: completion.subject_id,
            completed_at: now,
        }))
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<ChapterCompletion>, DomainError> {
        let results = chapter_completions::Entity::find()
            .filter(chapter_completions::Column::UserId.eq(user_id.0))
            .order_by_asc(chapter_completions::Column::CompletedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn find_by_user_and_subject(
        &self,
        user_id: &UserId,
        subject_id: &SubjectId,
    ) -> Result<Vec<ChapterCompletion>, DomainError> {
        let results = chapter_completions::Entity::find()
            .filter(chapter_completions::Column::UserId.eq(user_id.0))
            .filter(chapter_completions::Column::SubjectId.eq(subject_id.0))
            .order_by_asc(chapter_completions::Column::CompletedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }
}

/// Convert SeaORM model to domain entity
impl From<chapter_completions::Model> for ChapterCompletion {
    fn from(model: chapter_completions::Model) -> Self {
        ChapterCompletion {
            user_id: UserId(model.user_id),
            chapter_id: ChapterId(model.chapter_id),
            subject_id: SubjectId(model.subject_id),
            completed_at: model.completed_at.with_timezone(&Utc),
        }
    }
}
