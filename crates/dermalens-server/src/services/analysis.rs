//! Upload storage and the analyze-persist-cleanup flow.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use dermalens_core::report;
use tracing::{info, warn};

use crate::auth::CurrentUser;
use crate::db;
use crate::dto::{AnalyzeData, SkinProfileSummary};
use crate::error::AppError;
use crate::ServerState;

/// Saves uploaded bytes under a per-user, timestamp-qualified name.
/// Returns the stored filename and its full path.
pub fn save_upload(
    state: &ServerState,
    user: &CurrentUser,
    original_name: &str,
    data: &[u8],
) -> Result<(String, PathBuf), AppError> {
    fs::create_dir_all(&state.config.upload_dir)
        .map_err(|e| AppError::Internal(format!("failed to create upload directory: {e}")))?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let extension = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let filename = format!("{}_{}{}", user.id, timestamp, extension);
    let path = state.config.upload_dir.join(&filename);

    fs::write(&path, data)
        .map_err(|e| AppError::Internal(format!("failed to save file: {e}")))?;

    Ok((filename, path))
}

/// Runs the analyzer on a saved upload and persists the result.
///
/// The uploaded file is removed again on any failure past this point; a
/// record is only ever created from a fully validated report.
pub async fn analyze_upload(
    state: &ServerState,
    user: &CurrentUser,
    filename: &str,
    path: &Path,
) -> Result<AnalyzeData, AppError> {
    match run_analysis(state, user, filename, path).await {
        Ok(data) => Ok(data),
        Err(e) => {
            discard_upload(path);
            Err(e)
        }
    }
}

async fn run_analysis(
    state: &ServerState,
    user: &CurrentUser,
    filename: &str,
    path: &Path,
) -> Result<AnalyzeData, AppError> {
    let timeout = Duration::from_secs(state.config.analysis_timeout_secs);
    let raw = tokio::time::timeout(timeout, state.analyzer.analyze(path))
        .await
        .map_err(|_| {
            AppError::Analysis(format!(
                "timed out after {}s",
                state.config.analysis_timeout_secs
            ))
        })?
        .map_err(|e| AppError::Analysis(e.to_string()))?;

    let analysis = report::parse_report(&raw).map_err(|e| AppError::Analysis(e.to_string()))?;

    let image_url = format!(
        "{}/uploads/skin-images/{}",
        state.config.base_url.trim_end_matches('/'),
        filename
    );

    let record = {
        let mut conn = state.db_lock()?;
        db::insert_analysis_with_profile(&mut conn, &user.id, &image_url, &analysis)
            .map_err(|e| AppError::Database(e.to_string()))?
    };

    let skin_profile = SkinProfileSummary {
        skin_type: analysis.skin_type.clone(),
        concerns: analysis.concern_names(),
    };

    Ok(AnalyzeData {
        analysis: record,
        skin_profile,
    })
}

fn discard_upload(path: &Path) {
    if path.exists() {
        match fs::remove_file(path) {
            Ok(()) => info!("Removed orphaned upload {}", path.display()),
            Err(e) => warn!("Failed to remove orphaned upload {}: {}", path.display(), e),
        }
    }
}
