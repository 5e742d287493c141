//! PostgreSQL adapter for QuizRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::{db_err, questions_from_json, questions_to_json};
use crate::domain::entities::{ChapterId, NewQuiz, Quiz, QuizId, QuizUpdate};
use crate::domain::ports::QuizRepository;
use crate::entity::quizzes;
use crate::error::DomainError;

/// PostgreSQL implementation of QuizRepository
pub struct PostgresQuizRepository {
    db: DatabaseConnection,
}

impl PostgresQuizRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuizRepository for PostgresQuizRepository {
    async fn find_by_id(&self, id: &QuizId) -> Result<Option<Quiz>, DomainError> {
        quizzes::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(Quiz::try_from)
            .transpose()
    }

    async fn find_by_chapter(&self, chapter_id: &ChapterId) -> Result<Vec<Quiz>, DomainError> {
        quizzes::Entity::find()
            .filter(quizzes::Column::ChapterId.eq(chapter_id.0))
            .order_by_asc(quizzes::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(Quiz::try_from)
            .collect()
    }

    async fn find_by_chapters(&self, chapter_ids: &[ChapterId]) -> Result<Vec<Quiz>, DomainError> {
        if chapter_ids.is_empty() {
            return Ok(Vec::new());
        }

        quizzes::Entity::find()
            .filter(quizzes::Column::ChapterId.is_in(chapter_ids.iter().map(|c| c.0)))
            .order_by_asc(quizzes::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(Quiz::try_from)
            .collect()
    }

    async fn create(&self, quiz: &NewQuiz) -> Result<Quiz, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = quizzes::ActiveModel {
            id: Set(Uuid::new_v4()),
            chapter_id: Set(quiz.chapter_id.0),
            title: Set(quiz.title.clone()),
            passing_score: Set(quiz.passing_score as i32),
            xp_reward: Set(quiz.xp_reward),
            questions: Set(questions_to_json(&quiz.questions)?),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(&self.db).await.map_err(db_err)?.try_into()
    }

    async fn update(&self, id: &QuizId, update: &QuizUpdate) -> Result<Quiz, DomainError> {
        let mut model = quizzes::ActiveModel {
            id: Set(id.0),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };
        if let Some(title) = &update.title {
            model.title = Set(title.clone());
        }
        if let Some(passing_score) = update.passing_score {
            model.passing_score = Set(passing_score as i32);
        }
        if let Some(xp_reward) = update.xp_reward {
            model.xp_reward = Set(xp_reward);
        }
        if let Some(questions) = &update.questions {
            model.questions = Set(questions_to_json(questions)?);
        }

        model.update(&self.db).await.map_err(db_err)?.try_into()
    }

    async fn delete(&self, id: &QuizId) -> Result<(), DomainError> {
        let result = quizzes::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Quiz {} not found", id)));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        quizzes::Entity::find().count(&self.db).await.map_err(db_err)
    }
}

/// Convert SeaORM model to domain entity
impl TryFrom<quizzes::Model> for Quiz {
    type Error = DomainError;

    fn try_from(model: quizzes::Model) -> Result<Self, Self::Error> {
        Ok(Quiz {
            id: QuizId(model.id),
            chapter_id: ChapterId(model.chapter_id),
            title: model.title,
            passing_score: model.passing_score.clamp(0, 100) as u32,
            xp_reward: model.xp_reward,
            questions: questions_from_json(model.questions)?,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}
