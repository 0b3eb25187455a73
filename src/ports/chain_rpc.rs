use async_trait::async_trait;
use thiserror::Error;

/// Chain RPC error type
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Rate limited, try again later")]
    RateLimited,

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("RPC endpoint not configured")]
    NotConfigured,
}

/// Read-only chain RPC used by on-chain discovery
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainRpcPort: Send + Sync {
    /// Ids of fungible assets from the asset index
    async fn search_asset_ids(&self, limit: usize) -> Result<Vec<String>, RpcError>;

    /// Most recent transaction signatures touching an address
    async fn signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<String>, RpcError>;

    /// Mints appearing in a transaction's post-token balances
    async fn transaction_mints(&self, signature: &str) -> Result<Vec<String>, RpcError>;
}
