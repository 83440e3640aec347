pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod state;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::state::AppState;

/// Build the Axum router with all routes
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(api::health))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/register", post(api::auth::register))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/logout", post(api::auth::logout))
        .route(
            "/pages",
            get(api::pages::list_pages).post(api::pages::create_page),
        )
        .route(
            "/pages/{id}",
            axum::routing::put(api::pages::update_page).delete(api::pages::delete_page),
        )
        .route(
            "/speakers",
            get(api::speakers::list_speakers).post(api::speakers::create_speaker),
        )
        .route(
            "/speakers/{id}",
            get(api::speakers::get_speaker)
                .put(api::speakers::update_speaker)
                .delete(api::speakers::delete_speaker),
        )
        .route(
            "/speakers/{id}/availability",
            patch(api::speakers::update_availability),
        );

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve the API until `shutdown` resolves.
///
/// Returns the bound address (useful with port 0) and the server task.
pub async fn spawn_server<F>(
    state: Arc<AppState>,
    addr: SocketAddr,
    shutdown: F,
) -> anyhow::Result<(SocketAddr, tokio::task::JoinHandle<()>)>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "speakercheck API listening");

    let router = build_router(state);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
        {
            tracing::error!(error = %e, "server error");
        }
    });

    Ok((local_addr, handle))
}
