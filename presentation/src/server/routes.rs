//! Router setup with all API routes and middleware.

use super::handlers;
use super::state::AppState;
use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/kb",
            post(handlers::kb).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/llm",
            post(handlers::llm).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/tts",
            post(handlers::tts).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/chat",
            post(handlers::chat).fallback(handlers::method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the proxy on `addr` until the shutdown future resolves.
pub async fn start_server(
    addr: SocketAddr,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting proxy server on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
