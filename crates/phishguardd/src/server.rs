//! HTTP server for phishguardd

use anyhow::Result;
use axum::Router;
use phishguard_common::{GenAiClient, GuardConfig, GuardStore};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes;

/// Application state shared across handlers.
///
/// The store wraps a single SQLite connection; the mutex serializes all
/// store access, so progression updates never interleave. That includes
/// attempts from different trainees: the whole store is single-writer,
/// not just each trainee row.
pub struct AppState {
    pub store: Mutex<GuardStore>,
    pub genai: GenAiClient,
    pub config: GuardConfig,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: GuardStore, genai: GenAiClient, config: GuardConfig) -> Self {
        Self {
            store: Mutex::new(store),
            genai,
            config,
            start_time: Instant::now(),
        }
    }
}

/// Run the HTTP server until the process is stopped.
pub async fn run(state: AppState) -> Result<()> {
    let addr = state.config.listen_addr.clone();
    let state = Arc::new(state);

    let app = Router::new()
        .merge(routes::generation_routes())
        .merge(routes::judging_routes())
        .merge(routes::progression_routes())
        .merge(routes::analytics_routes())
        .merge(routes::admin_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
