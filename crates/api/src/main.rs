use std::net::SocketAddr;
use std::sync::Arc;

use fractal_api::config::{LogFormat, ServerConfig};
use fractal_api::router::build_app_router;
use fractal_api::state::AppState;
use fractal_db::SqliteJobStore;
use fractal_engine::RenderEngine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "fractal_api=debug,fractal_engine=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env().expect("Invalid server configuration");

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
    tracing::info!(
        host = %config.host,
        port = %config.port,
        cpu_cores = config.cpu_cores,
        "Loaded server configuration",
    );

    // --- Database ---
    let pool = fractal_db::create_pool(&config.database_url)
        .await
        .expect("Failed to open job database");
    tracing::info!("Database connection pool created");

    fractal_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    fractal_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Engine ---
    let store = Arc::new(SqliteJobStore::new(pool.clone()));
    let engine = Arc::new(RenderEngine::new(store));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine: Arc::clone(&engine),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    let running = engine.registry().running_count().await;
    if running > 0 {
        tracing::warn!(running, "Shutting down with render jobs still running");
    }
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a shutdown signal.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
