//! HTTP Server
//!
//! JSON API over the discovery service, the forwarding proxy and static
//! file hosting.
//!
//! Routes:
//! - `GET  /api/tokens?view=&sort=&direction=&q=` ranked view
//! - `POST /api/tokens` add explicit addresses
//! - `POST /api/tokens/refresh` manual refresh
//! - `GET  /api/tokens/:address` token details with fee data
//! - `GET  /api/status` service status
//! - `/api/jupiter/*`, `/api/bags/*`, `/api/helius/rpc` proxy

pub mod error;
pub mod handlers;
pub mod proxy;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use proxy::{ProxyClient, ProxyConfig};
pub use routes::{api_router, create_router};
pub use state::AppState;

use std::future::Future;
use std::path::Path;

use tokio::net::TcpListener;

/// Bind and serve until `shutdown` resolves
pub async fn serve<F>(
    bind_address: &str,
    static_dir: &Path,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state, static_dir);
    let listener = TcpListener::bind(bind_address).await?;

    tracing::info!("Listening on http://{}", listener.local_addr()?);
    tracing::info!("Serving static files from {}", static_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped gracefully");
    Ok(())
}
