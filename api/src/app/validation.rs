//! Input validation shared by the services

use std::sync::OnceLock;

use regex::Regex;

use crate::app::xp_config::MAX_XP_REWARD;
use crate::domain::entities::final_exam::MAX_TIME_LIMIT_MINUTES;
use crate::error::{AppError, DomainError};

pub const MAX_TITLE_LEN: usize = 200;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

fn username_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{3,32}$").expect("valid username regex"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("valid email regex")
    })
}

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"))
}

fn invalid(msg: impl Into<String>) -> AppError {
    AppError::Domain(DomainError::Validation(msg.into()))
}

pub fn username(name: &str) -> Result<(), AppError> {
    if username_re().is_match(name) {
        Ok(())
    } else {
        Err(invalid(
            "Username must be 3-32 characters of letters, digits, '_' or '-'",
        ))
    }
}

pub fn email(email: &str) -> Result<(), AppError> {
    if email.len() <= 254 && email_re().is_match(email) {
        Ok(())
    } else {
        Err(invalid("Email address is not valid"))
    }
}

pub fn password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        Ok(())
    } else {
        Err(invalid(format!(
            "Password must be between {} and {} characters",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        )))
    }
}

pub fn title(title: &str) -> Result<(), AppError> {
    let len = title.trim().chars().count();
    if len == 0 || len > MAX_TITLE_LEN {
        return Err(invalid(format!(
            "Title must be between 1 and {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

pub fn slug(slug: &str) -> Result<(), AppError> {
    if slug.len() <= 100 && slug_re().is_match(slug) {
        Ok(())
    } else {
        Err(invalid(
            "Slug must be lowercase letters and digits separated by single hyphens",
        ))
    }
}

pub fn xp_reward(xp: i32) -> Result<(), AppError> {
    if (0..=MAX_XP_REWARD).contains(&xp) {
        Ok(())
    } else {
        Err(invalid(format!(
            "xp_reward must be between 0 and {}",
            MAX_XP_REWARD
        )))
    }
}

pub fn passing_score(score: u32) -> Result<(), AppError> {
    if score <= 100 {
        Ok(())
    } else {
        Err(invalid("passing_score must be between 0 and 100"))
    }
}

pub fn time_limit(minutes: u32) -> Result<(), AppError> {
    if (1..=MAX_TIME_LIMIT_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(invalid(format!(
            "time_limit_minutes must be between 1 and {}",
            MAX_TIME_LIMIT_MINUTES
        )))
    }
}

/// Derive a URL slug from a title ("Intro to C++!" -> "intro-to-c")
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug.truncate(100);
    slug.trim_end_matches('-').to_string()
}
