//! User service
//!
//! Handles registration, login, session tokens and role management.

use std::collections::HashSet;
use std::sync::Arc;

use crate::app::credentials::{generate_token, hash_token, PasswordHasher};
use crate::app::validation;
use crate::domain::entities::{NewUser, User, UserId, UserRole};
use crate::domain::ports::UserRepository;
use crate::error::{AppError, DomainError};

/// Service for managing users
pub struct UserService<UR>
where
    UR: UserRepository,
{
    users: Arc<UR>,
    hasher: PasswordHasher,
    admin_usernames: HashSet<String>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    pub fn new(users: Arc<UR>, hasher: PasswordHasher, admin_usernames: Vec<String>) -> Self {
        Self {
            users,
            hasher,
            admin_usernames: admin_usernames
                .into_iter()
                .map(|u| u.to_lowercase())
                .collect(),
        }
    }

    /// Register a new user
    ///
    /// Returns (user, session_token) - the token is only shown once
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AppError> {
        let username = username.trim();
        let email = email.trim().to_lowercase();

        validation::username(username)?;
        validation::email(&email)?;
        validation::password(password)?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::Domain(DomainError::AlreadyExists(format!(
                "Username '{}' is already taken",
                username
            ))));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Domain(DomainError::AlreadyExists(
                "Email is already registered".to_string(),
            )));
        }

        let (password_hash, password_salt) = self.hash_new_password(password).await?;
        let token = generate_token();

        let role = if self.admin_usernames.contains(&username.to_lowercase()) {
            UserRole::Admin
        } else {
            UserRole::Student
        };

        let user = self
            .users
            .create(&NewUser {
                username: username.to_string(),
                email,
                role,
                password_hash,
                password_salt,
                token_hash: hash_token(&token),
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        Ok((user, token))
    }

    /// Log in with username or email. Issues a new token, invalidating the previous one.
    pub async fn login(&self, login: &str, password: &str) -> Result<(User, String), AppError> {
        let login = login.trim();
        let user = if login.contains('@') {
            self.users.find_by_email(login).await?
        } else {
            self.users.find_by_username(login).await?
        };

        let Some(user) = user else {
            return Err(invalid_credentials());
        };

        if !self.verify_password(&user, password).await? {
            tracing::warn!(user_id = %user.id, "Failed login attempt");
            return Err(invalid_credentials());
        }

        let token = generate_token();
        self.users
            .set_token_hash(&user.id, Some(&hash_token(&token)))
            .await?;

        Ok((user, token))
    }

    /// Revoke the user's current token
    pub async fn logout(&self, id: &UserId) -> Result<(), AppError> {
        self.users.set_token_hash(id, None).await?;
        Ok(())
    }

    /// Resolve a bearer token to a user
    pub async fn authenticate(&self, token: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.find_by_token_hash(&hash_token(token)).await?)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AppError> {
        Ok(self.users.find_by_id(id).await?)
    }

    /// Update user's last seen timestamp
    pub async fn touch(&self, id: &UserId) -> Result<(), AppError> {
        self.users.update_last_seen(id).await?;
        Ok(())
    }

    /// List users (admin)
    pub async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        Ok(self
            .users
            .list(limit.clamp(1, 100), offset.max(0))
            .await?)
    }

    /// Change a user's role (admin). Admins cannot demote themselves.
    pub async fn set_role(
        &self,
        actor: &User,
        target: &UserId,
        role: UserRole,
    ) -> Result<User, AppError> {
        if actor.id == *target && role != UserRole::Admin {
            return Err(AppError::Domain(DomainError::Conflict(
                "Admins cannot remove their own admin role".to_string(),
            )));
        }

        let mut user = self
            .users
            .find_by_id(target)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", target)))?;

        self.users.update_role(target, role).await?;
        user.role = role;

        tracing::info!(actor = %actor.id, user_id = %target, role = %role, "Role changed");

        Ok(user)
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        Ok(self.users.count().await?)
    }

    async fn hash_new_password(&self, password: &str) -> Result<(String, String), AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash_new(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    async fn verify_password(&self, user: &User, password: &str) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let salt = user.password_salt.clone();
        let expected = user.password_hash.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &salt, &expected))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }
}

fn invalid_credentials() -> AppError {
    AppError::Domain(DomainError::Unauthorized(
        "Invalid username or password".to_string(),
    ))
}
