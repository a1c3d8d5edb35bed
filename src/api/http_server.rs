// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Context;
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::analyze::analyze_handler;
use crate::config::ServerConfig;
use crate::vision::{ObjectDetector, PeopleCounter};

/// Shared state handed to every request
///
/// The counter is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub counter: Arc<PeopleCounter>,
}

impl AppState {
    pub fn new(counter: PeopleCounter) -> Self {
        Self {
            counter: Arc::new(counter),
        }
    }

    pub fn from_detector(detector: Arc<dyn ObjectDetector>) -> Self {
        Self::new(PeopleCounter::new(detector))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("detector", &self.counter.detector_name())
            .finish()
    }
}

pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let body_limit = match config.max_upload_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/analyze", post(analyze_handler))
        .layer(body_limit)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listener and serve until Ctrl+C
pub async fn start_server(state: AppState, config: ServerConfig) -> anyhow::Result<()> {
    let app = create_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    tracing::info!("🚀 People counter listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("🛑 Received shutdown signal"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
