//! PostgreSQL adapter for ChapterRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{Chapter, ChapterId, ChapterUpdate, NewChapter, SubjectId};
use crate::domain::ports::ChapterRepository;
use crate::entity::chapters;
use crate::error::DomainError;

/// PostgreSQL implementation of ChapterRepository
pub struct PostgresChapterRepository {
    db: DatabaseConnection,
}

impl PostgresChapterRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChapterRepository for PostgresChapterRepository {
    async fn find_by_id(&self, id: &ChapterId) -> Result<Option<Chapter>, DomainError> {
        let result = chapters::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_subject(&self, subject_id: &SubjectId) -> Result<Vec<Chapter>, DomainError> {
        let results = chapters::Entity::find()
            .filter(chapters::Column::SubjectId.eq(subject_id.0))
            .order_by_asc(chapters::Column::OrderIndex)
            .order_by_asc(chapters::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, chapter: &NewChapter) -> Result<Chapter, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = chapters::ActiveModel {
            id: Set(Uuid::new_v4()),
            subject_id: Set(chapter.subject_id.0),
            title: Set(chapter.title.clone()),
            content: Set(chapter.content.clone()),
            order_index: Set(chapter.order_index),
            xp_reward: Set(chapter.xp_reward),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await.map_err(db_err)?;

        Ok(result.into())
    }

    async fn update(
        &self,
        id: &ChapterId,
        update: &ChapterUpdate,
    ) -> Result<Chapter, DomainError> {
        let mut model = chapters::ActiveModel {
            id: Set(id.0),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };
        if let Some(title) = &update.title {
            model.title = Set(title.clone());
        }
        if let Some(content) = &update.content {
            model.content = Set(content.clone());
        }
        if let Some(order_index) = update.order_index {
            model.order_index = Set(order_index);
        }
        if let Some(xp_reward) = update.xp_reward {
            model.xp_reward = Set(xp_reward);
        }

        let result = model.update(&self.db).await.map_err(db_err)?;

        Ok(result.into())
    }

    async fn delete(&self, id: &ChapterId) -> Result<(), DomainError> {
        let result = chapters::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Chapter {} not found", id)));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        chapters::Entity::find().count(&self.db).await.map_err(db_err)
    }
}

/// Convert SeaORM model to domain entity
impl From<chapters::Model> for Chapter {
    fn from(model: chapters::Model) -> Self {
        Chapter {
            id: ChapterId(model.id),
            subject_id: SubjectId(model.subject_id),
            title: model.title,
            content: model.content,
            order_index: model.order_index,
            xp_reward: model.xp_reward,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
