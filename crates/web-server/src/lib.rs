use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use configuration::{Config, ServerConfig, StorageBackend};
use database::{AttemptStore, DbRepository, InMemoryStore};
use leaderboard::Leaderboard;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
// Note: Tracing is initialized by the binary, never here.

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
/// It holds no mutable data of its own; the attempt store is the only shared resource.
#[derive(Clone)]
pub struct AppState {
    pub leaderboard: Leaderboard,
}

impl AppState {
    pub fn new(leaderboard: Leaderboard) -> Self {
        Self { leaderboard }
    }
}

/// Defines the application routes and middleware. Kept separate from
/// `run_server` so the router can be exercised in-process.
pub fn build_router(state: Arc<AppState>, server: &ServerConfig) -> Router {
    let app = Router::new()
        .route("/api/healthcheck", get(handlers::healthcheck))
        .route("/api/reaction-times", post(handlers::submit_reaction_time))
        .route("/api/leaderboard", get(handlers::get_leaderboard))
        .route("/api/personal-best", get(handlers::get_personal_best))
        .with_state(state)
        // Logs every incoming request and its outcome.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(16 * 1024));

    if server.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods(Any)
            .allow_headers(AllowHeaders::any());
        app.layer(cors)
    } else {
        app
    }
}

/// Opens the configured attempt store, applying migrations for PostgreSQL.
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn AttemptStore>> {
    match config.database.backend {
        StorageBackend::Postgres => {
            let pool = database::connect(&config.database).await?;
            database::run_migrations(&pool).await?;
            Ok(Arc::new(DbRepository::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory attempt store; nothing will be persisted.");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

/// The main function to configure and run the web server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let leaderboard = Leaderboard::new(store, &config.leaderboard);
    let app = build_router(Arc::new(AppState::new(leaderboard)), &config.server);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received.");
}
