//! Gamification service
//!
//! Handles XP awards, levels, streaks and the leaderboard.
//! All XP changes go through this service to ensure ledger logging and consistency.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::app::xp_config::{
    LEADERBOARD_DEFAULT_LIMIT, LEADERBOARD_MAX_LIMIT, STREAK_BONUS_INTERVAL, XP_STREAK_BONUS,
};
use crate::domain::entities::{
    AppliedXp, Level, NewXpEvent, Streak, User, UserId, UserStats, XpClaim, XpEvent,
    XpEventKind, XpGrant,
};
use crate::domain::ports::{UserRepository, XpEventRepository};
use crate::error::AppError;

/// Result of an XP award
#[derive(Debug, Clone, Serialize)]
pub struct XpAward {
    pub user_id: UserId,
    pub old_xp: i32,
    pub new_xp: i32,
    /// Total XP gained including bonuses
    pub gained: i32,
    pub level: Level,
    pub leveled_up: bool,
    pub streak: Streak,
    pub events: Vec<XpEvent>,
}

impl XpAward {
    fn from_applied(user_id: UserId, applied: AppliedXp) -> Self {
        let old_xp = applied.before.xp;
        let new_xp = applied.stats.xp;
        let level = Level::from_xp(new_xp);
        XpAward {
            user_id,
            old_xp,
            new_xp,
            gained: new_xp - old_xp,
            leveled_up: level.level > Level::from_xp(old_xp).level,
            level,
            streak: Streak {
                current: applied.stats.current_streak,
                longest: applied.stats.longest_streak,
                last_activity_on: applied.stats.last_activity_on,
            },
            events: applied.events,
        }
    }

    /// XP earned by the activity itself, without a streak bonus it triggered
    pub fn activity_xp(&self) -> i32 {
        self.events
            .iter()
            .filter(|e| e.kind != XpEventKind::StreakBonus)
            .map(|e| e.delta)
            .sum()
    }
}

/// One line of an award: what it is for and how much it is worth
#[derive(Debug, Clone)]
pub struct XpReason {
    pub kind: XpEventKind,
    pub delta: i32,
    /// Chapter, quiz or subject the award is for. Referenced reasons are
    /// always written to the ledger, even at zero XP, so they pay out once.
    pub reference_id: Option<Uuid>,
    pub details: Option<String>,
}

impl XpReason {
    pub fn new(kind: XpEventKind, delta: i32, reference_id: Uuid) -> Self {
        XpReason {
            kind,
            delta,
            reference_id: Some(reference_id),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// XP/level/streak snapshot for profile screens
#[derive(Debug, Clone, Serialize)]
pub struct XpSummary {
    pub xp: i32,
    pub level: i32,
    pub level_floor_xp: i32,
    pub next_level_xp: i32,
    pub xp_to_next_level: i32,
    pub level_progress_percent: u8,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_on: Option<NaiveDate>,
}

impl XpSummary {
    pub fn for_user(user: &User, today: NaiveDate) -> Self {
        let level = Level::from_xp(user.xp);
        let streak = Streak {
            current: user.current_streak,
            longest: user.longest_streak,
            last_activity_on: user.last_activity_on,
        };
        XpSummary {
            xp: user.xp,
            level: level.level,
            level_floor_xp: level.floor_xp,
            next_level_xp: level.next_level_xp,
            xp_to_next_level: level.xp_to_next(user.xp),
            level_progress_percent: level.progress_percent(user.xp),
            current_streak: streak.as_of(today),
            longest_streak: user.longest_streak,
            last_activity_on: user.last_activity_on,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: UserId,
    pub username: String,
    pub xp: i32,
    pub level: i32,
    pub current_streak: i32,
}

/// Comparison of the stored XP column with the ledger
#[derive(Debug, Clone, Serialize)]
pub struct XpAudit {
    pub user_id: UserId,
    pub stored_xp: i32,
    pub ledger_xp: i64,
    pub consistent: bool,
}

/// Service for XP, levels and streaks
pub struct GamificationService<UR, XR>
where
    UR: UserRepository,
    XR: XpEventRepository,
{
    users: Arc<UR>,
    xp_events: Arc<XR>,
}

impl<UR, XR> GamificationService<UR, XR>
where
    UR: UserRepository,
    XR: XpEventRepository,
{
    pub fn new(users: Arc<UR>, xp_events: Arc<XR>) -> Self {
        Self { users, xp_events }
    }

    /// Award XP for an activity happening now
    pub async fn award_xp(
        &self,
        user_id: &UserId,
        reasons: Vec<XpReason>,
    ) -> Result<Option<XpAward>, AppError> {
        self.award_xp_on(user_id, reasons, Utc::now().date_naive())
            .await
    }

    /// Award XP for an activity on `today`.
    ///
    /// This is the single point through which all XP modifications flow.
    /// The first referenced reason claims the award: if the ledger already
    /// has it, nothing is written and `None` is returned. Stats and ledger
    /// entries are written together by the repository.
    pub async fn award_xp_on(
        &self,
        user_id: &UserId,
        reasons: Vec<XpReason>,
        today: NaiveDate,
    ) -> Result<Option<XpAward>, AppError> {
        if let Some(bad) = reasons.iter().find(|r| r.delta < 0) {
            return Err(AppError::Internal(format!(
                "Negative XP award of {} for {}",
                bad.delta, bad.kind
            )));
        }

        let claim = reasons.iter().find_map(|r| {
            r.reference_id.map(|reference_id| XpClaim {
                kind: r.kind,
                reference_id,
            })
        });

        let applied = self
            .xp_events
            .apply_award(user_id, claim, &|user: &User| {
                plan_award(user, &reasons, today)
            })
            .await?;

        let Some(applied) = applied else {
            tracing::debug!(user_id = %user_id, ?claim, "XP already awarded");
            return Ok(None);
        };
        let award = XpAward::from_applied(*user_id, applied);

        tracing::info!(
            user_id = %user_id,
            old_xp = award.old_xp,
            new_xp = award.new_xp,
            streak = award.streak.current,
            events = award.events.len(),
            "XP awarded"
        );
        if award.leveled_up {
            tracing::info!(
                user_id = %user_id,
                level = award.level.level,
                "User leveled up"
            );
        }

        Ok(Some(award))
    }

    /// Top users by XP
    pub async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>, AppError> {
        let limit = limit
            .unwrap_or(LEADERBOARD_DEFAULT_LIMIT)
            .clamp(1, LEADERBOARD_MAX_LIMIT);
        let today = Utc::now().date_naive();

        let users = self.users.find_top_by_xp(limit).await?;

        Ok(users
            .into_iter()
            .enumerate()
            .map(|(i, u)| LeaderboardEntry {
                rank: i + 1,
                user_id: u.id,
                level: Level::from_xp(u.xp).level,
                current_streak: Streak {
                    current: u.current_streak,
                    longest: u.longest_streak,
                    last_activity_on: u.last_activity_on,
                }
                .as_of(today),
                username: u.username,
                xp: u.xp,
            })
            .collect())
    }

    /// A user's XP ledger, newest first
    pub async fn history(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<XpEvent>, AppError> {
        Ok(self
            .xp_events
            .find_by_user_paginated(user_id, limit.clamp(1, 100), offset.max(0))
            .await?)
    }

    /// Compare a user's XP column with the sum of their ledger
    pub async fn audit(&self, user_id: &UserId) -> Result<XpAudit, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        let ledger_xp = self.xp_events.sum_delta_by_user(user_id).await?;

        Ok(XpAudit {
            user_id: user.id,
            stored_xp: user.xp,
            ledger_xp,
            consistent: i64::from(user.xp) == ledger_xp,
        })
    }
}

/// New stats and ledger entries for `reasons` applied to `user` on `today`.
///
/// The activity advances the daily streak; a streak extended to a multiple
/// of the bonus interval earns an extra entry.
fn plan_award(user: &User, reasons: &[XpReason], today: NaiveDate) -> XpGrant {
    let previous = Streak {
        current: user.current_streak,
        longest: user.longest_streak,
        last_activity_on: user.last_activity_on,
    };
    let streak = previous.record(today);

    let mut xp = user.xp;
    let mut events = Vec::new();
    for reason in reasons {
        if reason.delta == 0 && reason.reference_id.is_none() {
            continue;
        }
        xp = xp.saturating_add(reason.delta);
        events.push(NewXpEvent {
            user_id: user.id,
            kind: reason.kind,
            delta: reason.delta,
            xp_after: xp,
            reference_id: reason.reference_id,
            details: reason.details.clone(),
        });
    }

    if streak.extended_from(&previous) && streak.current % STREAK_BONUS_INTERVAL == 0 {
        xp = xp.saturating_add(XP_STREAK_BONUS);
        events.push(NewXpEvent {
            user_id: user.id,
            kind: XpEventKind::StreakBonus,
            delta: XP_STREAK_BONUS,
            xp_after: xp,
            reference_id: None,
            details: Some(format!("{}-day streak", streak.current)),
        });
    }

    XpGrant {
        stats: UserStats {
            xp,
            level: Level::from_xp(xp).level,
            current_streak: streak.current,
            longest_streak: streak.longest,
            last_activity_on: streak.last_activity_on,
        },
        events,
    }
}
