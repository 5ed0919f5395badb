//! Registration and login endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::auth;
use crate::db;
use crate::dto::{ok, ApiResponse, AuthData, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::ServerState;

const MIN_PASSWORD_LEN: usize = 8;

pub async fn register(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthData>>, AppError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username must not be empty".into()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = auth::hash_password(&req.password)?;

    let user = {
        let conn = state.db_lock()?;
        db::create_user(&conn, username, &password_hash).map_err(|e| {
            if e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
                AppError::Conflict("username already taken".into())
            } else {
                AppError::Database(e.to_string())
            }
        })?
    };

    let token = state
        .jwt
        .generate_token(&user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!(user_id = %user.id, "User registered");

    Ok(ok(
        "Account created successfully",
        AuthData {
            token,
            user_id: user.id,
            username: user.username,
        },
    ))
}

pub async fn login(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>, AppError> {
    let user = {
        let conn = state.db_lock()?;
        db::find_user(&conn, req.username.trim())
            .map_err(|e| AppError::Database(e.to_string()))?
    };

    let Some(user) = user else {
        return Err(AppError::Unauthorized("invalid username or password".into()));
    };

    if !auth::verify_password(&req.password, &user.password_hash) {
        return Err(AppError::Unauthorized("invalid username or password".into()));
    }

    let token = state
        .jwt
        .generate_token(&user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!(user_id = %user.id, "User logged in");

    Ok(ok(
        "Login successful",
        AuthData {
            token,
            user_id: user.id,
            username: user.username,
        },
    ))
}
