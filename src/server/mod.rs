//! HTTP surface for the dispatcher.
//!
//! `GET /` runs a full dispatch and always answers `200`: per-endpoint
//! failures travel inside the body as `{"error": "..."}` values.
//! `GET /health` reports liveness and the catalog size without touching
//! any upstream.

use crate::core::engine::FanoutEngine;
use crate::core::{AggregateResult, JsonSource};
use crate::utils::error::{FanoutError, Result};
use axum::{
    extract::State,
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router<S: JsonSource + 'static>(engine: Arc<FanoutEngine<S>>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(fetch_all::<S>))
        .route("/health", get(health::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

/// Any origin when `allowed_origins` is empty or exactly `["*"]`, otherwise the listed origins.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.is_empty() || (allowed_origins.len() == 1 && allowed_origins[0] == "*") {
        return Ok(cors.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            if origin == "*" {
                return Err(FanoutError::InvalidConfigValueError {
                    field: "allow_origin".to_string(),
                    value: origin.clone(),
                    reason: "'*' must be the only allowed origin".to_string(),
                });
            }
            HeaderValue::from_str(origin).map_err(|e| FanoutError::InvalidConfigValueError {
                field: "allow_origin".to_string(),
                value: origin.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

pub async fn serve<S: JsonSource + 'static>(
    engine: Arc<FanoutEngine<S>>,
    cors: CorsLayer,
    addr: &str,
) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| FanoutError::ServerError {
            message: format!("cannot bind {}: {}", addr, e),
        })?;

    tracing::info!(
        addr = addr,
        endpoints = engine.catalog().len(),
        "Fan-out server listening"
    );

    axum::serve(listener, router(engine, cors))
        .await
        .map_err(FanoutError::IoError)
}

async fn fetch_all<S: JsonSource + 'static>(
    State(engine): State<Arc<FanoutEngine<S>>>,
) -> Json<AggregateResult> {
    Json(engine.run().await)
}

async fn health<S: JsonSource + 'static>(
    State(engine): State<Arc<FanoutEngine<S>>>,
) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "endpoints": engine.catalog().len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
