//! LearnHub API Server
//!
//! Backend of an e-learning platform: subjects, chapters, quizzes, final exams,
//! progress tracking and gamification (XP, levels, streaks).
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use sea_orm::Database;
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{
    PostgresAttemptRepository, PostgresChapterRepository, PostgresCompletionRepository,
    PostgresFinalExamRepository, PostgresQuizRepository, PostgresSubjectRepository,
    PostgresUserRepository, PostgresXpEventRepository,
};
use app::{
    AssessmentService, CatalogService, GamificationService, PasswordHasher, ProgressService,
    UserService,
};
use config::Config;
use error::AppError;

pub type Catalog = CatalogService<PostgresSubjectRepository, PostgresChapterRepository>;
pub type Gamification = GamificationService<PostgresUserRepository, PostgresXpEventRepository>;
pub type Assessments = AssessmentService<
    PostgresSubjectRepository,
    PostgresChapterRepository,
    PostgresQuizRepository,
    PostgresFinalExamRepository,
    PostgresAttemptRepository,
    PostgresCompletionRepository,
    PostgresUserRepository,
    PostgresXpEventRepository,
>;
pub type Progress = ProgressService<
    PostgresSubjectRepository,
    PostgresChapterRepository,
    PostgresQuizRepository,
    PostgresFinalExamRepository,
    PostgresAttemptRepository,
    PostgresCompletionRepository,
    PostgresUserRepository,
    PostgresXpEventRepository,
>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService<PostgresUserRepository>>,
    pub catalog_service: Arc<Catalog>,
    pub gamification_service: Arc<Gamification>,
    pub assessment_service: Arc<Assessments>,
    pub progress_service: Arc<Progress>,
    pub config: Config,
}

impl AppState {
    /// Wire the PostgreSQL adapters into the application services
    pub fn new(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let user_repo = Arc::new(PostgresUserRepository::new(db.clone()));
        let subject_repo = Arc::new(PostgresSubjectRepository::new(db.clone()));
        let chapter_repo = Arc::new(PostgresChapterRepository::new(db.clone()));
        let quiz_repo = Arc::new(PostgresQuizRepository::new(db.clone()));
        let exam_repo = Arc::new(PostgresFinalExamRepository::new(db.clone()));
        let attempt_repo = Arc::new(PostgresAttemptRepository::new(db.clone()));
        let completion_repo = Arc::new(PostgresCompletionRepository::new(db.clone()));
        let xp_event_repo = Arc::new(PostgresXpEventRepository::new(db));

        let user_service = Arc::new(UserService::new(
            user_repo.clone(),
            PasswordHasher::new(config.password_pepper.clone(), config.password_iterations),
            config.admin_usernames.clone(),
        ));

        let catalog_service = Arc::new(CatalogService::new(subject_repo, chapter_repo));

        let gamification_service =
            Arc::new(GamificationService::new(user_repo, xp_event_repo));

        let assessment_service = Arc::new(AssessmentService::new(
            catalog_service.clone(),
            quiz_repo.clone(),
            exam_repo.clone(),
            attempt_repo.clone(),
            completion_repo.clone(),
            gamification_service.clone(),
        ));

        let progress_service = Arc::new(ProgressService::new(
            catalog_service.clone(),
            quiz_repo,
            exam_repo,
            attempt_repo,
            completion_repo,
            gamification_service.clone(),
        ));

        Self {
            user_service,
            catalog_service,
            gamification_service,
            assessment_service,
            progress_service,
            config,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Build the HTTP router
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Rate-limited routes (registration, login)
    let mut auth_routes = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login));

    if state.config.auth_rate_limited() {
        // Uses PeerIpKeyExtractor to get client IP from socket connection
        // (SmartIpKeyExtractor requires X-Forwarded-For headers from reverse proxy)
        let governor_config = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(PeerIpKeyExtractor)
                .per_second(state.config.auth_rate_per_second)
                .burst_size(state.config.auth_rate_burst)
                .finish()
                .context("Invalid rate limit configuration")?,
        );
        auth_routes = auth_routes.route_layer(GovernorLayer {
            config: governor_config,
        });
    }

    // Catalog reads (optional auth: admins also see unpublished content)
    let catalog_routes = Router::new()
        .route("/subjects", get(handlers::list_subjects))
        .route("/subjects/:id", get(handlers::get_subject))
        .route("/subjects/:id/chapters", get(handlers::list_chapters))
        .route("/subjects/:id/exam", get(handlers::get_subject_exam))
        .route("/chapters/:id", get(handlers::get_chapter))
        .route("/chapters/:id/quizzes", get(handlers::list_quizzes))
        .route("/quizzes/:id", get(handlers::get_quiz))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::optional_auth_middleware,
        ));

    // Learner routes
    let user_routes = Router::new()
        .route("/auth/logout", post(handlers::logout))
        .route("/me", get(handlers::me))
        .route("/me/attempts", get(handlers::list_attempts))
        .route("/me/xp-history", get(handlers::xp_history))
        .route("/progress", get(handlers::overview))
        .route("/progress/subjects/:id", get(handlers::subject_progress))
        .route("/chapters/:id/complete", post(handlers::complete_chapter))
        .route("/quizzes/:id/submit", post(handlers::submit_quiz))
        .route("/exams/:id/submit", post(handlers::submit_exam))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    // Authoring and administration (layers run bottom-up: auth, then admin check).
    // Route layers only wrap matched routes, so unknown paths still reach the fallback.
    let admin_routes = Router::new()
        .route("/subjects", post(handlers::create_subject))
        .route(
            "/subjects/:id",
            patch(handlers::update_subject).delete(handlers::delete_subject),
        )
        .route("/subjects/:id/chapters", post(handlers::create_chapter))
        .route("/subjects/:id/exam", put(handlers::replace_exam))
        .route(
            "/chapters/:id",
            patch(handlers::update_chapter).delete(handlers::delete_chapter),
        )
        .route("/chapters/:id/quizzes", post(handlers::create_quiz))
        .route(
            "/quizzes/:id",
            patch(handlers::update_quiz).delete(handlers::delete_quiz),
        )
        .route("/exams/:id", delete(handlers::delete_exam))
        .route("/admin/users", get(handlers::list_users))
        .route("/admin/users/:id/role", patch(handlers::set_role))
        .route("/admin/users/:id/xp-audit", get(handlers::xp_audit))
        .route("/admin/stats", get(handlers::stats))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Ok(Router::new()
        .route("/health", get(health))
        .route("/leaderboard", get(handlers::leaderboard))
        .merge(auth_routes)
        .merge(catalog_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .fallback(route_not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,learnhub_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LearnHub API...");

    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = build_router(AppState::new(db, config))?;

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
