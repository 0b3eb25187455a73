//! Forwarding Proxy
//!
//! Forwards Jupiter, Bags and Helius calls 1:1 so upstream secrets stay on
//! the server. Upstream status and body pass through unchanged with a JSON
//! content type; transport failures become a 500 with the error message.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use reqwest::{Client, RequestBuilder};

use super::error::ApiError;
use super::state::AppState;
use crate::adapters::bags::BagsEndpoint;
use crate::config::Config;

const USER_AGENT: &str = concat!("bags-index/", env!("CARGO_PKG_VERSION"));

/// Upstream locations and secrets for the proxy
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub jupiter_base_url: String,
    pub jupiter_api_key: Option<String>,
    pub bags_base_url: String,
    pub bags_api_key: Option<String>,
    pub helius_rpc_url: Option<String>,
    pub timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            jupiter_base_url: "https://lite-api.jup.ag/swap/v1".to_string(),
            jupiter_api_key: None,
            bags_base_url: "https://public-api-v2.bags.fm/api/v1".to_string(),
            bags_api_key: None,
            helius_rpc_url: None,
            timeout: Duration::from_secs(15),
        }
    }
}

impl ProxyConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            jupiter_base_url: config.jupiter.base_url.clone(),
            jupiter_api_key: config.jupiter.get_api_key(),
            bags_base_url: config.bags.base_url.clone(),
            bags_api_key: config.bags.get_api_key(),
            helius_rpc_url: config.helius.get_rpc_url(),
            timeout: config.discovery.request_timeout(),
        }
    }
}

/// HTTP client used for forwarding
#[derive(Debug, Clone)]
pub struct ProxyClient {
    config: ProxyConfig,
    http: Client,
}

impl ProxyClient {
    pub fn with_config(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn jupiter_url(&self, path: &str) -> String {
        format!("{}{}", self.config.jupiter_base_url.trim_end_matches('/'), path)
    }

    pub fn bags_url(&self, endpoint: BagsEndpoint) -> String {
        format!(
            "{}{}",
            self.config.bags_base_url.trim_end_matches('/'),
            endpoint.path()
        )
    }

    fn jupiter(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.jupiter_api_key {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }

    fn bags(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.bags_api_key {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }

    /// Send and relay the upstream status and body
    async fn forward(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let upstream = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Proxy error: {}", e);
                ApiError::from(e)
            })?;

        let status = StatusCode::from_u16(upstream.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let body = upstream.bytes().await?;
        tracing::debug!("Proxied response {} ({} bytes)", status, body.len());

        Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
    }
}

/// `GET /api/jupiter/quote?...` to `{jupiter}/quote?...`
pub async fn jupiter_quote(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let proxy = &state.proxy;
    let url = format!("{}?{}", proxy.jupiter_url("/quote"), query.unwrap_or_default());
    tracing::debug!("Proxying to Jupiter quote: {}", url);
    proxy.forward(proxy.jupiter(proxy.http.get(url))).await
}

/// `POST /api/jupiter/swap` to `{jupiter}/swap`
pub async fn jupiter_swap(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let proxy = &state.proxy;
    let request = proxy
        .http
        .post(proxy.jupiter_url("/swap"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(body);
    proxy.forward(proxy.jupiter(request)).await
}

/// `GET /api/bags/{creator|claim-stats|lifetime-fees}?tokenMint=`
pub async fn bags(
    State(state): State<AppState>,
    Path(route): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let endpoint = BagsEndpoint::from_route(&route)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown Bags endpoint: {}", route)))?;
    let mint = params
        .get("tokenMint")
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing tokenMint parameter".to_string()))?;

    let proxy = &state.proxy;
    tracing::debug!("Proxying Bags {} for {}", route, mint);
    let request = proxy
        .http
        .get(proxy.bags_url(endpoint))
        .query(&[("tokenMint", mint)]);
    proxy.forward(proxy.bags(request)).await
}

/// `POST /api/helius/rpc` to the configured RPC URL
pub async fn helius_rpc(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let proxy = &state.proxy;
    let url = proxy
        .config
        .helius_rpc_url
        .clone()
        .ok_or_else(|| ApiError::Unavailable("Helius RPC URL not configured".to_string()))?;
    let request = proxy
        .http
        .post(url)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body);
    proxy.forward(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_urls() {
        let proxy = ProxyClient::with_config(ProxyConfig {
            jupiter_base_url: "https://jup.example/swap/v1/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(proxy.jupiter_url("/quote"), "https://jup.example/swap/v1/quote");
        assert_eq!(
            proxy.bags_url(BagsEndpoint::Creator),
            "https://public-api-v2.bags.fm/api/v1/token-launch/creator/v3"
        );
    }
}
