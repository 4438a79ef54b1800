use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::Level;

use crate::config::ServerConfig;
use crate::health::{HealthSnapshot, HealthState};

/// Read-only health surface for supervisors. Shares nothing with the poll
/// loop except the health state.
pub fn create_router(health: Arc<HealthState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO)),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(health)
}

async fn health_check(
    State(health): State<Arc<HealthState>>,
) -> (StatusCode, Json<HealthSnapshot>) {
    let snapshot = health.snapshot().await;
    let status = if snapshot.last_check_success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(snapshot))
}

async fn readiness_check(State(health): State<Arc<HealthState>>) -> (StatusCode, Json<Value>) {
    let is_ready = health.is_ready().await;
    let status = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(json!({ "ready": is_ready })))
}

async fn liveness_check() -> Json<Value> {
    Json(json!({ "alive": true }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "endpoints": ["/health", "/ready", "/live"],
        })),
    )
}

pub async fn serve(config: &ServerConfig, health: Arc<HealthState>) -> anyhow::Result<()> {
    let app = create_router(health);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Health server listening on {}:{}", config.host, config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
