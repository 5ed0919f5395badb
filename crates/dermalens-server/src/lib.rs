//! DermaLens HTTP server: shared state, routing, and module wiring.

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod services;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::routing::{delete, get, post};
use axum::Router;
use dermalens_core::SkinAnalyzer;

use crate::auth::JwtService;
use crate::config::ServerConfig;

/// Shared server state accessible from all handlers.
pub struct ServerState {
    pub config: ServerConfig,
    pub db: Mutex<rusqlite::Connection>,
    pub analyzer: Arc<dyn SkinAnalyzer>,
    pub jwt: JwtService,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        conn: rusqlite::Connection,
        analyzer: Arc<dyn SkinAnalyzer>,
    ) -> Self {
        let jwt = JwtService::new(&config.jwt_secret, config.token_ttl_minutes);
        Self {
            config,
            db: Mutex::new(conn),
            analyzer,
            jwt,
        }
    }

    /// Acquires the database lock, converting poison errors to AppError.
    pub fn db_lock(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, error::AppError> {
        self.db.lock().map_err(|e| {
            tracing::error!("DB lock poisoned: {}", e);
            error::AppError::Internal("database lock error".into())
        })
    }
}

/// Builds the application router over the shared state.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/analyze", post(handlers::analysis::analyze))
        .route("/history", get(handlers::analysis::history))
        .route("/get-analysis/{id}", get(handlers::analysis::get_analysis))
        .route("/delete-analysis/{id}", delete(handlers::analysis::delete_analysis))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/health", get(handlers::health))
        .with_state(state)
}
