use axum::extract::State;
use axum::Json;
use tracing::info;

use phishershield_core::verdict::{ScanRequest, ScanVerdict};

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/scan, the backend gateway. Body `{url, content, redirectType}`,
/// response `{trustScore, alertMessage, deductions, geminiAiScore,
/// geminiAiReason, reportCount}`.
pub async fn scan(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanVerdict>, AppError> {
    if request.url.trim().is_empty() {
        return Err(AppError::BadRequest(
            "URL is required in the request body.".to_string(),
        ));
    }

    info!(url = %request.url, redirect = ?request.redirect_type, "scan requested");
    let verdict = state.scan.scan(&request).await;
    info!(url = %request.url, score = verdict.trust_score, "scan answered");

    Ok(Json(verdict))
}
