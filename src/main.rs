use candle_signals::{
    okx::{MarketDataSource, OkxClient, OkxConfig},
    patterns,
    scanner::{CancelFlag, SignalScanner},
    types::ScanRequest,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::{env, sync::Arc};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub struct AppState {
    scanner: SignalScanner,
    source: Arc<dyn MarketDataSource>,
    scans_completed: RwLock<u64>,
    signals_found: RwLock<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("candle_signals=info")
        .init();
    dotenvy::dotenv().ok();

    info!("==================================================");
    info!("  CANDLE-SIGNALS - OKX pattern recency scanner");
    info!("==================================================");

    let port: u16 = env::var("PORT")
        .unwrap_or("3005".into())
        .parse()
        .unwrap_or(3005);
    let okx_config = OkxConfig::from_env();
    info!("OKX base URL: {}", okx_config.base_url);

    let source: Arc<dyn MarketDataSource> = Arc::new(OkxClient::new(okx_config)?);
    let scanner = SignalScanner::default();
    info!(
        "Detector registry loaded with {} pattern(s)",
        patterns::pattern_names().len()
    );

    let state = Arc::new(AppState {
        scanner,
        source,
        scans_completed: RwLock::new(0),
        signals_found: RwLock::new(0),
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/patterns", get(list_patterns))
        .route("/api/scan", post(scan))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "candle-signals",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

async fn status(State(s): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let scans = *s.scans_completed.read().await;
    let signals = *s.signals_found.read().await;

    Json(serde_json::json!({
        "patterns": {
            "total": patterns::pattern_names().len()
        },
        "scansCompleted": scans,
        "signalsFound": signals
    }))
}

async fn list_patterns() -> Json<serde_json::Value> {
    let entries: Vec<serde_json::Value> = patterns::all_detectors()
        .map(|d| {
            serde_json::json!({
                "name": d.name(),
                "minCandles": d.min_candles()
            })
        })
        .collect();
    Json(serde_json::json!({ "patterns": entries }))
}

async fn scan(
    State(s): State<Arc<AppState>>,
    Json(request): Json<ScanRequest>,
) -> impl IntoResponse {
    match s
        .scanner
        .scan_universe(s.source.as_ref(), &request, &CancelFlag::new())
        .await
    {
        Ok(report) => {
            *s.scans_completed.write().await += 1;
            *s.signals_found.write().await += report.signals.len() as u64;
            (StatusCode::OK, Json(serde_json::json!(report)))
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}
