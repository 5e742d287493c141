//! Session token authentication middleware

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};

use crate::domain::entities::User;
use crate::error::{AppError, DomainError};
use crate::AppState;

/// Extract the session token from the Authorization header
fn extract_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Update last seen in the background (fire and forget, log errors)
fn touch_in_background(state: &AppState, user: &User) {
    let user_id = user.id;
    let user_service = state.user_service.clone();
    tokio::spawn(async move {
        if let Err(e) = user_service.touch(&user_id).await {
            tracing::warn!(error = %e, user_id = %user_id, "Failed to update last_seen");
        }
    });
}

/// Authentication middleware
///
/// Validates the session token and injects the User into request extensions.
/// Routes that require authentication should use this middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request).ok_or(AppError::Unauthorized)?;

    let user = state
        .user_service
        .authenticate(token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    touch_in_background(&state, &user);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Optional authentication middleware
///
/// Like auth_middleware but doesn't fail if no auth is provided.
/// Handlers see the user through `Option<Extension<User>>`.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(&request) {
        match state.user_service.authenticate(token).await {
            Ok(Some(user)) => {
                touch_in_background(&state, &user);
                request.extensions_mut().insert(user);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Optional authentication failed"),
        }
    }

    next.run(request).await
}

/// Admin guard
///
/// Must run after `auth_middleware`; rejects non-admin users with 403.
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let is_admin = request
        .extensions()
        .get::<User>()
        .map(User::is_admin)
        .ok_or(AppError::Unauthorized)?;

    if !is_admin {
        return Err(AppError::Domain(DomainError::Forbidden(
            "Admin role required".to_string(),
        )));
    }

    Ok(next.run(request).await)
}
