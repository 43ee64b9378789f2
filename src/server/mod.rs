//! Registry HTTP service
//!
//! Serves any [`Registry`] over the JSON binding that [`HttpRegistry`]
//! speaks, so the remote backend always has a matching peer.
//!
//! [`HttpRegistry`]: crate::app::backends::HttpRegistry

pub mod handlers;

use crate::core::Registry;
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn Registry>,
}

pub fn router(registry: Arc<dyn Registry>) -> Router {
    let state = AppState { registry };

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/clients",
            get(handlers::list_clients).post(handlers::create_client),
        )
        .route("/clients/:id", get(handlers::get_client))
        .route(
            "/programs",
            get(handlers::list_programs).post(handlers::create_program),
        )
        .route("/programs/:id/clients", get(handlers::clients_in_program))
        .route("/enrollments", post(handlers::enroll))
        .route("/dashboard/stats", get(handlers::dashboard_stats))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs until the listener fails.
pub async fn serve(listener: TcpListener, registry: Arc<dyn Registry>) -> Result<()> {
    let addr = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!("Registry service listening on {}", addr);

    axum::serve(listener, router(registry))
        .await
        .context("Server error")?;
    Ok(())
}

pub async fn bind_and_serve(bind_address: &str, registry: Arc<dyn Registry>) -> Result<()> {
    let listener = TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    serve(listener, registry).await
}
