use std::sync::Arc;

use fractal_engine::RenderEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (job history, health checks).
    pub pool: fractal_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Render job engine (registry, worker pools, supervising tasks).
    pub engine: Arc<RenderEngine>,
}
