//! Fake News Detector Web Server
//!
//! Serves the single-page checker and the JSON API behind it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    FAKE NEWS DETECTOR                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  Page +   │  │  Session  │  │  Check Flow             │ │
//! │  │  JSON API │  │  Store    │  │  (newscheck-core)       │ │
//! │  │  (Axum)   │  │ (cookie)  │  │                         │ │
//! │  └─────┬─────┘  └─────┬─────┘  └────────────┬────────────┘ │
//! │        └──────────────┼──────────────────────┘              │
//! │                       ▼                                     │
//! │          ┌──────────────────────────┐                      │
//! │          │ Artifact cache (loaded   │                      │
//! │          │ once: classifier + TFIDF)│                      │
//! │          └──────────────────────────┘                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod sessions;
mod models;
mod handlers;
mod middleware;
mod error;

#[cfg(test)]
mod tests;

use axum::{
    Router,
    routing::{get, post, delete},
    middleware as axum_middleware,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::net::SocketAddr;
use std::sync::Arc;

use newscheck_core::ArtifactLoader;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "newscheck_web=debug,newscheck_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Fake News Detector starting...");
    tracing::info!("Model directory: {}", config.model_dir.display());

    // Load artifacts once; a failure leaves the server up in degraded mode
    let loader = Arc::new(ArtifactLoader::new(config.artifact_paths()));
    match loader.load() {
        Ok(artifacts) => tracing::info!(
            "Artifacts ready: {} (model sha256 {})",
            artifacts.metadata().classifier_kind,
            artifacts.metadata().model_sha256
        ),
        Err(e) => tracing::error!("Running without model, checks are disabled: {}", e),
    }

    // Build application state
    let state = AppState::new(config.clone(), loader);

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<ArtifactLoader>,
    pub sessions: Arc<sessions::SessionStore>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(config: config::Config, loader: Arc<ArtifactLoader>) -> Self {
        let sessions = sessions::SessionStore::new(
            chrono::Duration::minutes(config.session_idle_minutes),
            config.history_capacity,
        );
        Self {
            loader,
            sessions: Arc::new(sessions),
            config,
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Public routes (no session needed)
    let public_routes = Router::new()
        .route("/", get(handlers::page::index))
        .route("/health", get(handlers::health::check))
        .route("/api/v1/status", get(handlers::status::get));

    // Checking starts a session for first-time visitors
    let check_routes = Router::new()
        .route("/api/v1/check", post(handlers::check::submit))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session::attach_session
        ));

    // Session routes - read the visitor's session if there is one
    let session_routes = Router::new()
        .route("/api/v1/history", get(handlers::history::recent))
        .route("/api/v1/session", delete(handlers::session::end))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session::find_session
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(check_routes)
        .merge(session_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
