//! PostgreSQL adapter for XpEventRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{
    AppliedXp, User, UserId, XpClaim, XpEvent, XpEventId, XpEventKind, XpGrant,
};
use crate::domain::ports::XpEventRepository;
use crate::entity::{users, xp_events};
use crate::error::DomainError;

/// PostgreSQL implementation of XpEventRepository
pub struct PostgresXpEventRepository {
    db: DatabaseConnection,
}

impl PostgresXpEventRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl XpEventRepository for PostgresXpEventRepository {
    async fn apply_award(
        &self,
        user_id: &UserId,
        claim: Option<XpClaim>,
        plan: &(dyn for<'u> Fn(&'u User) -> XpGrant + Send + Sync),
    ) -> Result<Option<AppliedXp>, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        // Row lock serializes concurrent awards for the same user
        let before: User = users::Entity::find_by_id(user_id.0)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::NotFound(format!("User not found: {}", user_id)))?
            .into();

        if let Some(claim) = claim {
            let claimed = xp_events::Entity::find()
                .filter(xp_events::Column::UserId.eq(user_id.0))
                .filter(xp_events::Column::Kind.eq(claim.kind.to_string()))
                .filter(xp_events::Column::ReferenceId.eq(claim.reference_id))
                .count(&txn)
                .await
                .map_err(db_err)?;
            if claimed > 0 {
                txn.rollback().await.map_err(db_err)?;
                return Ok(None);
            }
        }

        let grant = plan(&before);

        users::ActiveModel {
            id: Set(user_id.0),
            xp: Set(grant.stats.xp),
            level: Set(grant.stats.level),
            current_streak: Set(grant.stats.current_streak),
            longest_streak: Set(grant.stats.longest_streak),
            last_activity_on: Set(grant.stats.last_activity_on),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err)?;

        let now = Utc::now().fixed_offset();
        let mut events: Vec<XpEvent> = Vec::with_capacity(grant.events.len());
        for event in grant.events {
            let model = xp_events::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(event.user_id.0),
                kind: Set(event.kind.to_string()),
                delta: Set(event.delta),
                xp_after: Set(event.xp_after),
                reference_id: Set(event.reference_id),
                details: Set(event.details),
                created_at: Set(now),
            };
            events.push(model.insert(&txn).await.map_err(db_err)?.into());
        }

        txn.commit().await.map_err(db_err)?;

        Ok(Some(AppliedXp {
            before,
            stats: grant.stats,
            events,
        }))
    }

    async fn find_by_user_paginated(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<XpEvent>, DomainError> {
        let results = xp_events::Entity::find()
            .filter(xp_events::Column::UserId.eq(user_id.0))
            .order_by_desc(xp_events::Column::CreatedAt)
            .order_by_desc(xp_events::Column::XpAfter)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn sum_delta_by_user(&self, user_id: &UserId) -> Result<i64, DomainError> {
        use sea_orm::sea_query::Expr;

        // SUM over int4 yields bigint (NULL when there are no rows)
        let result: Option<Option<i64>> = xp_events::Entity::find()
            .filter(xp_events::Column::UserId.eq(user_id.0))
            .select_only()
            .column_as(Expr::col(xp_events::Column::Delta).sum(), "sum")
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.flatten().unwrap_or(0))
    }
}

/// Convert SeaORM model to domain entity
impl From<xp_events::Model> for XpEvent {
    fn from(model: xp_events::Model) -> Self {
        XpEvent {
            id: XpEventId(model.id),
            user_id: UserId(model.user_id),
            kind: model.kind.parse().unwrap_or(XpEventKind::ChapterCompleted),
            delta: model.delta,
            xp_after: model.xp_after,
            reference_id: model.reference_id,
            details: model.details,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
