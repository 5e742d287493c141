//! PostgreSQL adapter for AttemptRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{
    AssessmentKind, Attempt, AttemptId, NewAttempt, SubjectId, UserId,
};
use crate::domain::ports::AttemptRepository;
use crate::entity::attempts;
use crate::error::DomainError;

/// PostgreSQL implementation of AttemptRepository
pub struct PostgresAttemptRepository {
    db: DatabaseConnection,
}

impl PostgresAttemptRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AttemptRepository for PostgresAttemptRepository {
    async fn record(&self, attempt: NewAttempt) -> Result<Attempt, DomainError> {
        let model = attempts::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(attempt.user_id.0),
            kind: Set(attempt.kind.to_string()),
            assessment_id: Set(attempt.assessment_id),
            subject_id: Set(attempt.subject_id.0),
            score: Set(attempt.score as i32),
            correct: Set(attempt.correct as i32),
            total: Set(attempt.total as i32),
            passed: Set(attempt.passed),
            timed_out: Set(attempt.timed_out),
            xp_awarded: Set(attempt.xp_awarded),
            created_at: Set(Utc::now().fixed_offset()),
        };

        model.insert(&self.db).await.map_err(db_err)?.try_into()
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Attempt>, DomainError> {
        attempts::Entity::find()
            .filter(attempts::Column::UserId.eq(user_id.0))
            .order_by_desc(attempts::Column::CreatedAt)
            .offset(offset as u64)
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(Attempt::try_from)
            .collect()
    }

    async fn find_by_user_and_subject(
        &self,
        user_id: &UserId,
        kind: AssessmentKind,
        subject_id: &SubjectId,
    ) -> Result<Vec<Attempt>, DomainError> {
        attempts::Entity::find()
            .filter(attempts::Column::UserId.eq(user_id.0))
            .filter(attempts::Column::Kind.eq(kind.to_string()))
            .filter(attempts::Column::SubjectId.eq(subject_id.0))
            .order_by_desc(attempts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(Attempt::try_from)
            .collect()
    }

    async fn find_passed_ids(
        &self,
        user_id: &UserId,
        kind: AssessmentKind,
    ) -> Result<Vec<Uuid>, DomainError> {
        attempts::Entity::find()
            .select_only()
            .column(attempts::Column::AssessmentId)
            .distinct()
            .filter(attempts::Column::UserId.eq(user_id.0))
            .filter(attempts::Column::Kind.eq(kind.to_string()))
            .filter(attempts::Column::Passed.eq(true))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        attempts::Entity::find().count(&self.db).await.map_err(db_err)
    }
}

/// Convert SeaORM model to domain entity
impl TryFrom<attempts::Model> for Attempt {
    type Error = DomainError;

    fn try_from(model: attempts::Model) -> Result<Self, Self::Error> {
        Ok(Attempt {
            id: AttemptId(model.id),
            user_id: UserId(model.user_id),
            kind: model.kind.parse().map_err(DomainError::Internal)?,
            assessment_id: model.assessment_id,
            subject_id: SubjectId(model.subject_id),
            score: model.score.max(0) as u32,
            correct: model.correct.max(0) as u32,
            total: model.total.max(0) as u32,
            passed: model.passed,
            timed_out: model.timed_out,
            xp_awarded: model.xp_awarded,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}
