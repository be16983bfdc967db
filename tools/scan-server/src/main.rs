mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use phishershield_core::gateway::ScanService;
use phishershield_core::signals::reports::MemoryReportStore;
use phishershield_core::signals::Collectors;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() {
    // Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let port = config.port;

    // Shared HTTP client for every collector
    let http_client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(20))
        .build()
        .expect("failed to build HTTP client");

    let reports = Arc::new(MemoryReportStore::new());
    let collectors =
        Collectors::from_config(&config.collectors, http_client).with_reports(reports.clone());

    let state = AppState {
        scan: Arc::new(ScanService::new(collectors)),
        reports,
    };

    let app = routes::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{port}");
    info!("scan server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
