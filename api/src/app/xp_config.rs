//! XP configuration constants
//!
//! Defines the XP values and limits of the gamification system.

/// XP awarded for completing a chapter when it does not set its own reward
pub const DEFAULT_CHAPTER_XP: i32 = 10;

/// Upper bound for any configurable XP reward
pub const MAX_XP_REWARD: i32 = 1000;

/// Bonus XP for a perfect score on the first passing quiz attempt
pub const XP_PERFECT_QUIZ_BONUS: i32 = 10;

/// Bonus XP when a streak reaches a multiple of `STREAK_BONUS_INTERVAL`
pub const XP_STREAK_BONUS: i32 = 25;

/// Streak length (days) between streak bonuses
pub const STREAK_BONUS_INTERVAL: i32 = 7;

/// Default leaderboard size
pub const LEADERBOARD_DEFAULT_LIMIT: i64 = 10;

/// Maximum leaderboard size
pub const LEADERBOARD_MAX_LIMIT: i64 = 100;
