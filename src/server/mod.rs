//! JSON front end for the pricing pipeline.
//!
//! Stands in for the interactive entry form: it accepts one raw record per
//! request and returns either the estimate or the pipeline error. The
//! pipeline is built before the listener binds, so every request sees
//! fully initialised models.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::info;

use routes::AppState;

/// Serve until the listener fails or `shutdown` resolves.
pub async fn serve<F>(state: AppState, port: u16, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    info!(port, "Price server listening on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Price server error")?;
    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/status", get(routes::get_status))
        .route("/api/options", get(routes::get_options))
        .route("/api/features", post(routes::post_features))
        .route("/api/predict", post(routes::post_predict))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
