use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportBody {
    pub url: String,
}

/// POST /api/report: record one community report against a URL.
/// Session-lifetime only: the durable report store is a separate service.
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<ReportBody>,
) -> Result<Json<Value>, AppError> {
    if body.url.trim().is_empty() {
        return Err(AppError::BadRequest("URL is required.".to_string()));
    }

    let count = state.reports.record(&body.url).await;
    info!(url = %body.url, count, "community report recorded");
    Ok(Json(json!({ "url": body.url, "reportCount": count })))
}

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub url: String,
}

/// GET /api/report/count?url=... returns the current report count for a URL.
pub async fn count(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> Json<Value> {
    use phishershield_core::signals::ReportCounter;

    let count = state.reports.count_for(&query.url).await;
    Json(json!({ "url": query.url, "reportCount": count }))
}
