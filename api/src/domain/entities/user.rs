//! User domain entity
//!
//! Represents a learner or administrator of the platform.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::level::Level;

entity_id!(
    /// Unique identifier for a user
    UserId
);

/// Access role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "student"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    #[serde(skip_serializing)]
    pub token_hash: Option<String>,
    pub xp: i32,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Current gamification state as a value object
    pub fn stats(&self) -> UserStats {
        UserStats {
            xp: self.xp,
            level: self.level,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            last_activity_on: self.last_activity_on,
        }
    }

    /// Level derived from XP (authoritative over the stored column)
    pub fn computed_level(&self) -> Level {
        Level::from_xp(self.xp)
    }
}

/// Data needed to create a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub password_hash: String,
    pub password_salt: String,
    pub token_hash: String,
}

/// Gamification counters persisted on the user row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub xp: i32,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_on: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display_and_parse() {
        assert_eq!(UserRole::Student.to_string(), "student");
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("Student".parse::<UserRole>().unwrap(), UserRole::Student);
        assert!("instructor".parse::<UserRole>().is_err());
    }

    #[test]
    fn secrets_are_not_serialized() {
        let user = User {
            id: UserId::new(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            role: UserRole::Student,
            password_hash: "hash".to_string(),
            password_salt: "salt".to_string(),
            token_hash: Some("token".to_string()),
            xp: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_activity_on: None,
            created_at: Utc::now(),
            last_seen_at: None,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("password_salt"));
        assert!(!json.contains("token_hash"));
        assert!(json.contains("\"role\":\"student\""));
    }

    #[test]
    fn user_id_display() {
        let id = UserId(uuid::Uuid::nil());
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000000");
    }
}
