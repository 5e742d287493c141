//! PostgreSQL adapter for UserRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{Level, NewUser, User, UserId, UserRole};
use crate::domain::ports::UserRepository;
use crate::entity::users;
use crate::error::DomainError;

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_by_lower(
        &self,
        column: users::Column,
        value: &str,
    ) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col(column))).eq(value.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.find_by_lower(users::Column::Username, username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.find_by_lower(users::Column::Email, email).await
    }

    async fn find_by_token_hash(&self, hash: &str) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find()
            .filter(users::Column::TokenHash.eq(hash))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            role: Set(user.role.to_string()),
            password_hash: Set(user.password_hash.clone()),
            password_salt: Set(user.password_salt.clone()),
            token_hash: Set(Some(user.token_hash.clone())),
            xp: Set(0),
            level: Set(1),
            current_streak: Set(0),
            longest_streak: Set(0),
            last_activity_on: Set(None),
            created_at: Set(now),
            last_seen_at: Set(None),
        };

        let result = model.insert(&self.db).await.map_err(db_err)?;

        Ok(result.into())
    }

    async fn set_token_hash(&self, id: &UserId, hash: Option<&str>) -> Result<(), DomainError> {
        users::ActiveModel {
            id: Set(id.0),
            token_hash: Set(hash.map(str::to_string)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn update_last_seen(&self, id: &UserId) -> Result<(), DomainError> {
        let now = Utc::now().fixed_offset();

        users::ActiveModel {
            id: Set(id.0),
            last_seen_at: Set(Some(now)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn update_role(&self, id: &UserId, role: UserRole) -> Result<(), DomainError> {
        users::ActiveModel {
            id: Set(id.0),
            role: Set(role.to_string()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn find_top_by_xp(&self, limit: i64) -> Result<Vec<User>, DomainError> {
        let results = users::Entity::find()
            .order_by_desc(users::Column::Xp)
            .order_by_asc(users::Column::CreatedAt)
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, DomainError> {
        let results = users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .offset(offset as u64)
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        users::Entity::find().count(&self.db).await.map_err(db_err)
    }
}

/// Convert SeaORM model to domain entity
impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: UserId(model.id),
            username: model.username,
            email: model.email,
            role: model.role.parse().unwrap_or(UserRole::Student),
            password_hash: model.password_hash,
            password_salt: model.password_salt,
            token_hash: model.token_hash,
            xp: model.xp,
            level: if model.level > 0 {
                model.level
            } else {
                Level::from_xp(model.xp).level
            },
            current_streak: model.current_streak,
            longest_streak: model.longest_streak,
            last_activity_on: model.last_activity_on,
            created_at: model.created_at.with_timezone(&Utc),
            last_seen_at: model.last_seen_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}
