//! Helius RPC Client
//!
//! JSON-RPC client for the Helius endpoint. Uses the DAS `searchAssets`
//! method for fungible asset ids, `getSignaturesForAddress` for program
//! activity and `getTransaction` with `jsonParsed` encoding for token
//! balances.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::types::{AssetPage, RpcResponse, SignatureInfo, TransactionResult};
use crate::ports::chain_rpc::{ChainRpcPort, RpcError};

/// Helius client configuration
#[derive(Debug, Clone)]
pub struct HeliusConfig {
    /// RPC URL including the API key; requests fail when unset
    pub rpc_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay for backoff (milliseconds)
    pub retry_base_delay_ms: u64,
}

impl Default for HeliusConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            timeout: Duration::from_secs(15),
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

impl HeliusConfig {
    /// Create config with an RPC URL
    pub fn with_rpc_url(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: Some(rpc_url.into()),
            ..Default::default()
        }
    }
}

/// Client for Helius JSON-RPC
#[derive(Debug, Clone)]
pub struct HeliusClient {
    config: HeliusConfig,
    http: Client,
}

impl HeliusClient {
    /// Create a new client with custom configuration
    pub fn with_config(config: HeliusConfig) -> Result<Self, RpcError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Whether an RPC URL is configured
    pub fn is_configured(&self) -> bool {
        self.config.rpc_url.is_some()
    }

    /// Issue one JSON-RPC call. A null result without an error is `None`.
    async fn call<T: DeserializeOwned>(
        &self,
        id: &str,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, RpcError> {
        let rpc_url = self.config.rpc_url.as_deref().ok_or(RpcError::NotConfigured)?;
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let body: RpcResponse<T> = self
            .execute_with_retry(|| async {
                self.http
                    .post(rpc_url)
                    .json(&request_body)
                    .send()
                    .await
                    .map_err(RpcError::from)
            })
            .await?;

        if let Some(error) = body.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(body.result)
    }

    /// Execute request with retry logic and exponential backoff
    async fn execute_with_retry<T, F, Fut>(&self, request_fn: F) -> Result<RpcResponse<T>, RpcError>
    where
        T: DeserializeOwned,
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, RpcError>>,
    {
        let mut last_error = None;

        let attempts = self.config.max_retries.saturating_add(1);
        for attempt in 0..attempts {
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    // Handle rate limiting with exponential backoff
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let backoff = Duration::from_millis(
                            self.config.retry_base_delay_ms * 2u64.pow(attempt + 1),
                        );
                        tracing::warn!(
                            "Helius rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff,
                            attempt + 1,
                            attempts
                        );
                        last_error = Some(RpcError::RateLimited);
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if status.is_server_error() {
                        last_error = Some(RpcError::Rpc {
                            code: status.as_u16() as i64,
                            message: format!("Server error: {}", status),
                        });
                        tokio::time::sleep(Duration::from_millis(
                            self.config.retry_base_delay_ms * (attempt as u64 + 1),
                        ))
                        .await;
                        continue;
                    }

                    return response.json::<RpcResponse<T>>().await.map_err(|e| {
                        RpcError::ParseError(format!("Failed to parse JSON: {}", e))
                    });
                }
                Err(e) => {
                    last_error = Some(e);
                    tokio::time::sleep(Duration::from_millis(
                        self.config.retry_base_delay_ms * (attempt as u64 + 1),
                    ))
                    .await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| RpcError::ParseError("Retries exhausted".into())))
    }
}

#[async_trait]
impl ChainRpcPort for HeliusClient {
    async fn search_asset_ids(&self, limit: usize) -> Result<Vec<String>, RpcError> {
        let params = json!({
            "page": 1,
            "limit": limit,
            "tokenType": "fungible",
            "displayOptions": { "showFungible": true }
        });
        let page: Option<AssetPage> = self.call("discover-tokens", "searchAssets", params).await?;
        Ok(page.map(|p| asset_ids(&p)).unwrap_or_default())
    }

    async fn signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<String>, RpcError> {
        let params = json!([address, { "limit": limit }]);
        let signatures: Option<Vec<SignatureInfo>> = self
            .call("program-sigs", "getSignaturesForAddress", params)
            .await?;
        Ok(signatures
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.signature)
            .collect())
    }

    async fn transaction_mints(&self, signature: &str) -> Result<Vec<String>, RpcError> {
        let params = json!([
            signature,
            { "encoding": "jsonParsed", "maxSupportedTransactionVersion": 0 }
        ]);
        let id: String = format!("tx-{}", signature.chars().take(8).collect::<String>());
        let tx: Option<TransactionResult> = self.call(&id, "getTransaction", params).await?;
        Ok(tx.map(|t| t.post_balance_mints()).unwrap_or_default())
    }
}

pub(crate) fn asset_ids(page: &AssetPage) -> Vec<String> {
    page.items.iter().filter_map(|item| item.id.clone()).collect()
}
