pub mod health;
pub mod report;
pub mod scan;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/scan", post(scan::scan))
        .route("/api/report", post(report::submit))
        .route("/api/report/count", get(report::count))
}
