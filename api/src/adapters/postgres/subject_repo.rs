//! PostgreSQL adapter for SubjectRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{NewSubject, Subject, SubjectId, SubjectUpdate};
use crate::domain::ports::SubjectRepository;
use crate::entity::subjects;
use crate::error::DomainError;

/// PostgreSQL implementation of SubjectRepository
pub struct PostgresSubjectRepository {
    db: DatabaseConnection,
}

impl PostgresSubjectRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubjectRepository for PostgresSubjectRepository {
    async fn find_by_id(&self, id: &SubjectId) -> Result<Option<Subject>, DomainError> {
        let result = subjects::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Subject>, DomainError> {
        let result = subjects::Entity::find()
            .filter(subjects::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn list(&self, include_unpublished: bool) -> Result<Vec<Subject>, DomainError> {
        let mut query = subjects::Entity::find();
        if !include_unpublished {
            query = query.filter(subjects::Column::IsPublished.eq(true));
        }

        let results = query
            .order_by_asc(subjects::Column::OrderIndex)
            .order_by_asc(subjects::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, subject: &NewSubject) -> Result<Subject, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = subjects::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(subject.title.clone()),
            slug: Set(subject.slug.clone()),
            description: Set(subject.description.clone()),
            order_index: Set(subject.order_index),
            is_published: Set(subject.is_published),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await.map_err(db_err)?;

        Ok(result.into())
    }

    async fn update(
        &self,
        id: &SubjectId,
        update: &SubjectUpdate,
    ) -> Result<Subject, DomainError> {
        let mut model = subjects::ActiveModel {
            id: Set(id.0),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };
        if let Some(title) = &update.title {
            model.title = Set(title.clone());
        }
        if let Some(slug) = &update.slug {
            model.slug = Set(slug.clone());
        }
        if let Some(description) = &update.description {
            model.description = Set(description.clone());
        }
        if let Some(order_index) = update.order_index {
            model.order_index = Set(order_index);
        }
        if let Some(is_published) = update.is_published {
            model.is_published = Set(is_published);
        }

        let result = model.update(&self.db).await.map_err(db_err)?;

        Ok(result.into())
    }

    async fn delete(&self, id: &SubjectId) -> Result<(), DomainError> {
        // Chapters, quizzes and the exam go with it via ON DELETE CASCADE
        let result = subjects::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Subject {} not found", id)));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        subjects::Entity::find().count(&self.db).await.map_err(db_err)
    }
}

/// Convert SeaORM model to domain entity
impl From<subjects::Model> for Subject {
    fn from(model: subjects::Model) -> Self {
        Subject {
            id: SubjectId(model.id),
            title: model.title,
            slug: model.slug,
            description: model.description,
            order_index: model.order_index,
            is_published: model.is_published,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
