//! Analysis endpoints: upload-and-analyze, history, fetch, delete.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use tracing::info;

use crate::auth::CurrentUser;
use crate::db;
use crate::dto::{
    ok, ok_empty, AnalysisRecord, AnalyzeData, ApiResponse, HistoryData, HistoryQuery,
};
use crate::error::AppError;
use crate::services;
use crate::ServerState;

/// Uploads a skin image and runs the full analysis flow.
pub async fn analyze(
    State(state): State<Arc<ServerState>>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<AnalyzeData>>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let filename = field.file_name().unwrap_or("upload").to_string();
            let data = field.bytes().await?;
            upload = Some((filename, content_type, data));
            break;
        }
    }

    let (filename, content_type, data) =
        upload.ok_or_else(|| AppError::Validation("no 'image' field in request".into()))?;

    if !content_type.starts_with("image/") {
        return Err(AppError::Validation("file must be an image".into()));
    }

    info!(
        user_id = %user.id,
        file = %filename,
        size = data.len(),
        "Analyzing upload"
    );

    let (stored_name, path) = services::analysis::save_upload(&state, &user, &filename, &data)?;
    let result = services::analysis::analyze_upload(&state, &user, &stored_name, &path).await?;

    Ok(ok("Image analyzed successfully", result))
}

/// Returns the caller's analysis history with pagination.
pub async fn history(
    State(state): State<Arc<ServerState>>,
    user: CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<HistoryData>>, AppError> {
    let conn = state.db_lock()?;

    let total =
        db::count_analyses(&conn, &user.id).map_err(|e| AppError::Database(e.to_string()))?;
    let items = db::list_analyses(&conn, &user.id, query.skip, query.limit)
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(ok(
        "Analysis history retrieved successfully",
        HistoryData {
            items,
            total,
            skip: query.skip,
            limit: query.limit,
        },
    ))
}

/// Returns a single analysis owned by the caller.
pub async fn get_analysis(
    State(state): State<Arc<ServerState>>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AnalysisRecord>>, AppError> {
    let conn = state.db_lock()?;

    let record = db::get_analysis(&conn, &user.id, id)
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("analysis not found".into()))?;

    Ok(ok("Analysis retrieved successfully", record))
}

/// Deletes a single analysis owned by the caller.
pub async fn delete_analysis(
    State(state): State<Arc<ServerState>>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let conn = state.db_lock()?;

    if !db::delete_analysis(&conn, &user.id, id).map_err(|e| AppError::Database(e.to_string()))? {
        return Err(AppError::NotFound("analysis not found".into()));
    }

    info!(user_id = %user.id, id, "Analysis deleted");

    Ok(ok_empty("Analysis deleted successfully"))
}
