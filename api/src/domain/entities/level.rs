//! Levels and streaks
//!
//! The level curve is triangular: reaching level `L` requires
//! `50 * L * (L - 1)` total XP, so each level costs 100 XP more than the last.

use chrono::NaiveDate;
use serde::Serialize;

/// XP multiplier of the level curve
pub const LEVEL_XP_FACTOR: i64 = 50;

/// A user level derived from total XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Level {
    pub level: i32,
    /// XP at which this level started
    pub floor_xp: i32,
    /// XP at which the next level starts
    pub next_level_xp: i32,
}

impl Level {
    /// Total XP needed to reach `level`
    pub fn threshold(level: i32) -> i32 {
        let l = i64::from(level.max(1));
        (LEVEL_XP_FACTOR * l * (l - 1)).min(i64::from(i32::MAX)) as i32
    }

    /// Get level from total XP
    pub fn from_xp(xp: i32) -> Self {
        let xp = xp.max(0);
        let mut level = 1;
        while Self::threshold(level + 1) <= xp && Self::threshold(level + 1) < i32::MAX {
            level += 1;
        }
        Level {
            level,
            floor_xp: Self::threshold(level),
            next_level_xp: Self::threshold(level + 1),
        }
    }

    /// XP still missing to reach the next level
    pub fn xp_to_next(&self, xp: i32) -> i32 {
        (self.next_level_xp - xp).max(0)
    }

    /// Percent progress through the current level (0-100)
    pub fn progress_percent(&self, xp: i32) -> u8 {
        let span = self.next_level_xp - self.floor_xp;
        if span <= 0 {
            return 100;
        }
        let into = (xp - self.floor_xp).clamp(0, span);
        ((i64::from(into) * 100) / i64::from(span)) as u8
    }
}

/// Daily activity streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub current: i32,
    pub longest: i32,
    pub last_activity_on: Option<NaiveDate>,
}

impl Streak {
    /// Register activity on `today` and return the updated streak
    pub fn record(self, today: NaiveDate) -> Self {
        let current = match self.last_activity_on {
            Some(last) if last == today => self.current.max(1),
            Some(last) if last.succ_opt() == Some(today) => self.current + 1,
            // Clock skew: activity dated before the last one keeps the streak
            Some(last) if last > today => self.current.max(1),
            _ => 1,
        };

        Streak {
            current,
            longest: self.longest.max(current),
            last_activity_on: Some(self.last_activity_on.map_or(today, |l| l.max(today))),
        }
    }

    /// Whether this activity extended the streak compared to `previous`
    pub fn extended_from(&self, previous: &Streak) -> bool {
        self.current > previous.current
    }

    /// Streak as it should be displayed on `today`: a streak whose last
    /// activity is older than yesterday is broken
    pub fn as_of(&self, today: NaiveDate) -> i32 {
        match self.last_activity_on {
            Some(last) if last == today || last.succ_opt() == Some(today) => self.current,
            _ => 0,
        }
    }
}
