//! Account handlers
//!
//! Registration, login, logout and the current user's profile.

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{ApiResponse, ApiResult, CreatedResult};
use crate::app::XpSummary;
use crate::domain::entities::User;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address
    #[serde(alias = "username", alias = "email")]
    pub login: String,
    pub password: String,
}

/// Issued on registration and login. The token is only shown once.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub stats: XpSummary,
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> CreatedResult<SessionResponse> {
    let (user, token) = state
        .user_service
        .register(&request.username, &request.email, &request.password)
        .await?;

    Ok(ApiResponse::created(SessionResponse { user, token }))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<SessionResponse> {
    let (user, token) = state
        .user_service
        .login(&request.login, &request.password)
        .await?;

    Ok(ApiResponse::ok(SessionResponse { user, token }))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<()> {
    state.user_service.logout(&user.id).await?;
    Ok(ApiResponse::with_message((), "Logged out"))
}

/// GET /me
pub async fn me(Extension(user): Extension<User>) -> ApiResult<MeResponse> {
    let stats = XpSummary::for_user(&user, Utc::now().date_naive());
    Ok(ApiResponse::ok(MeResponse { user, stats }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_login_with_username_alias() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"username": "ada", "password": "pw"}"#).unwrap();
        assert_eq!(request.login, "ada");

        let request: LoginRequest =
            serde_json::from_str(r#"{"email": "ada@example.com", "password": "pw"}"#).unwrap();
        assert_eq!(request.login, "ada@example.com");
    }

    #[test]
    fn parse_register_requires_all_fields() {
        let result: Result<RegisterRequest, _> =
            serde_json::from_str(r#"{"username": "ada", "password": "pw"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn session_response_hides_secrets() {
        let user = crate::test_utils::test_user();
        let json = serde_json::to_string(&SessionResponse {
            user,
            token: "lh-token".to_string(),
        })
        .unwrap();

        assert!(json.contains("lh-token"));
        assert!(!json.contains("password"));
        assert!(!json.contains("token_hash"));
    }
}
