// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use axum::{
    routing::{get, post},
    Router,
};
use sitesmith_core::SitesmithError;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::{build, chats, handlers, AppState};

/// Bind address of the gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// All routes with state, CORS and request tracing applied.
///
/// - GET /health
/// - POST /ask, GET /requirements
/// - POST /build, POST /build/single-shot
/// - POST /publish, POST /clear, GET /latest
/// - GET /chats, GET|DELETE /chats/{id}, GET /chats/{id}/messages,
///   GET /chats/{id}/projects
/// - GET /result/* (artifact files)
pub fn build_router(state: AppState) -> Router {
    let artifacts = ServeDir::new(state.artifacts.dir());

    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/ask", post(handlers::post_ask))
        .route("/requirements", get(handlers::get_requirements))
        .route("/build", post(build::post_build))
        .route("/build/single-shot", post(build::post_build_single_shot))
        .route("/publish", post(handlers::post_publish))
        .route("/clear", post(handlers::post_clear))
        .route("/latest", get(handlers::get_latest))
        .route("/chats", get(chats::list_chats))
        .route("/chats/{id}", get(chats::get_chat).delete(chats::delete_chat))
        .route("/chats/{id}/messages", get(chats::list_messages))
        .route("/chats/{id}/projects", get(chats::list_projects))
        .nest_service("/result", artifacts)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve until the state's shutdown token is cancelled.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), SitesmithError> {
    let shutdown = state.shutdown.clone();
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SitesmithError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| SitesmithError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
        assert!(debug.contains("8080"));
    }
}
