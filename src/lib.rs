pub mod api;
pub mod auth;
pub mod backend;
pub mod bootstrap;
pub mod cli;
pub mod client;
pub mod guard;
pub mod identity;
pub mod jwt;
pub mod session;
pub mod theme;

use api::create_api_router;
use axum::{Router, middleware};
use backend::BackendClient;
use bootstrap::{PageState, page_handler};
use guard::route_guard;
use jwt::JwtConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

pub struct ServerConfig {
    /// Base URL of the marketplace backend API
    pub backend_url: Url,
    /// Shared secret the backend signs access tokens with
    pub jwt_secret: Vec<u8>,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret));
    let backend = BackendClient::new(config.backend_url.clone());

    let page_state = PageState { jwt, backend };

    // Every non-API path renders the page shell; the guard decides first.
    Router::new()
        .nest("/api", create_api_router())
        .fallback(page_handler)
        .with_state(page_state)
        .layer(middleware::from_fn(route_guard))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr), std::io::Error> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = run_server(config, listener).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((handle, local_addr))
}
