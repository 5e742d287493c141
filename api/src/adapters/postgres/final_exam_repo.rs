//! PostgreSQL adapter for FinalExamRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use super::{db_err, questions_from_json, questions_to_json};
use crate::domain::entities::{FinalExam, FinalExamId, NewFinalExam, SubjectId};
use crate::domain::ports::FinalExamRepository;
use crate::entity::final_exams;
use crate::error::DomainError;

/// PostgreSQL implementation of FinalExamRepository
pub struct PostgresFinalExamRepository {
    db: DatabaseConnection,
}

impl PostgresFinalExamRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FinalExamRepository for PostgresFinalExamRepository {
    async fn find_by_id(&self, id: &FinalExamId) -> Result<Option<FinalExam>, DomainError> {
        final_exams::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(FinalExam::try_from)
            .transpose()
    }

    async fn find_by_subject(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Option<FinalExam>, DomainError> {
        final_exams::Entity::find()
            .filter(final_exams::Column::SubjectId.eq(subject_id.0))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(FinalExam::try_from)
            .transpose()
    }

    async fn replace(&self, exam: &NewFinalExam) -> Result<FinalExam, DomainError> {
        let time_limit_minutes = exam
            .time_limit_minutes
            .map(i32::try_from)
            .transpose()
            .map_err(|_| DomainError::Validation("time_limit_minutes is too large".to_string()))?;

        let txn = self.db.begin().await.map_err(db_err)?;

        final_exams::Entity::delete_many()
            .filter(final_exams::Column::SubjectId.eq(exam.subject_id.0))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let model = final_exams::ActiveModel {
            id: Set(Uuid::new_v4()),
            subject_id: Set(exam.subject_id.0),
            title: Set(exam.title.clone()),
            passing_score: Set(exam.passing_score as i32),
            time_limit_minutes: Set(time_limit_minutes),
            xp_reward: Set(exam.xp_reward),
            questions: Set(questions_to_json(&exam.questions)?),
            created_at: Set(Utc::now().fixed_offset()),
        };
        let inserted = model.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        inserted.try_into()
    }

    async fn delete(&self, id: &FinalExamId) -> Result<(), DomainError> {
        let result = final_exams::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Final exam {} not found", id)));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        final_exams::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}

/// Convert SeaORM model to domain entity
impl TryFrom<final_exams::Model> for FinalExam {
    type Error = DomainError;

    fn try_from(model: final_exams::Model) -> Result<Self, Self::Error> {
        Ok(FinalExam {
            id: FinalExamId(model.id),
            subject_id: SubjectId(model.subject_id),
            title: model.title,
            passing_score: model.passing_score.clamp(0, 100) as u32,
            time_limit_minutes: model
                .time_limit_minutes
                .and_then(|m| u32::try_from(m).ok())
                .filter(|m| *m > 0),
            xp_reward: model.xp_reward,
            questions: questions_from_json(model.questions)?,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}
