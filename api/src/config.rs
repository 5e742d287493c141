use std::env;

use anyhow::Context;

use crate::app::credentials::DEFAULT_PASSWORD_ITERATIONS;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Server-side secret mixed into every password hash (HMAC key)
    pub password_pepper: String,
    /// Usernames that are granted the admin role on registration
    pub admin_usernames: Vec<String>,
    /// Sustained requests per second on the auth routes
    pub auth_rate_per_second: u64,
    /// Burst size on the auth routes
    pub auth_rate_burst: u32,
    /// PBKDF2 iteration count for password hashes
    pub password_iterations: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_or("PORT", 8080)?,
            password_pepper: env::var("PASSWORD_PEPPER")
                .unwrap_or_else(|_| "dev-pepper-not-for-production".to_string()),
            admin_usernames: env::var("ADMIN_USERNAMES")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            auth_rate_per_second: parse_or("AUTH_RATE_PER_SECOND", 2)?,
            auth_rate_burst: parse_or("AUTH_RATE_BURST", 5)?,
            password_iterations: parse_or("PASSWORD_ITERATIONS", DEFAULT_PASSWORD_ITERATIONS)?,
        })
    }

    /// Rate limiting is disabled when either knob is zero
    pub fn auth_rate_limited(&self) -> bool {
        self.auth_rate_per_second > 0 && self.auth_rate_burst > 0
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
