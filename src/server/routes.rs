use std::path::Path;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers::{add_tokens, list_tokens, refresh_tokens, status, token_details};
use super::proxy;
use super::state::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/tokens", get(list_tokens).post(add_tokens))
        .route("/api/tokens/refresh", post(refresh_tokens))
        .route("/api/tokens/:address", get(token_details))
        .route("/api/status", get(status))
        .route("/api/jupiter/quote", get(proxy::jupiter_quote))
        .route("/api/jupiter/swap", post(proxy::jupiter_swap))
        .route("/api/bags/:endpoint", get(proxy::bags))
        .route("/api/helius/rpc", post(proxy::helius_rpc))
        .with_state(state)
}

/// API routes plus static files, CORS and request tracing
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    api_router(state)
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
