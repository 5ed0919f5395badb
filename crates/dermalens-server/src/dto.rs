//! Data transfer objects and the uniform response envelope.

use axum::Json;
use dermalens_core::{AnalysisMetrics, Recommendation, SkinConcern};
use serde::{Deserialize, Serialize};

/// Uniform response envelope returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

/// Creates a successful response with a message and payload.
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: message.into(),
        data: Some(data),
    })
}

/// Creates a successful response with no payload.
pub fn ok_empty(message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        success: true,
        message: message.into(),
        data: None,
    })
}

// === Analysis Types ===

/// A persisted analysis, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub id: i64,
    pub user_id: String,
    pub image_url: String,
    pub overall_health: String,
    pub skin_type: String,
    pub concerns: Vec<SkinConcern>,
    pub recommendations: Vec<Recommendation>,
    pub analysis_metrics: AnalysisMetrics,
    pub created_at: String,
}

/// Latest derived profile summary for the uploading user.
#[derive(Debug, Serialize)]
pub struct SkinProfileSummary {
    pub skin_type: String,
    pub concerns: Vec<String>,
}

/// Payload of a successful analyze call.
#[derive(Debug, Serialize)]
pub struct AnalyzeData {
    pub analysis: AnalysisRecord,
    pub skin_profile: SkinProfileSummary,
}

// === History Types ===

/// Query parameters for history pagination.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

/// Paginated history payload.
#[derive(Debug, Serialize)]
pub struct HistoryData {
    pub items: Vec<AnalysisRecord>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

// === Auth Types ===

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Payload of a successful register or login.
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub token: String,
    pub user_id: String,
    pub username: String,
}
