use async_trait::async_trait;
use thiserror::Error;

use super::models::PairRecord;

/// Pair data provider error type
#[derive(Error, Debug)]
pub enum PairDataError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Rate limited, try again later")]
    RateLimited,

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Too many addresses in one request: {got} (max {max})")]
    BatchTooLarge { got: usize, max: usize },
}

/// Market data aggregator keyed by trading pair
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PairDataPort: Send + Sync {
    /// Free-text pair search; an empty `pairs` field is an empty result
    async fn search_pairs(&self, query: &str) -> Result<Vec<PairRecord>, PairDataError>;

    /// Resolve pairs for a batch of token addresses on one chain
    async fn pairs_by_addresses(
        &self,
        chain_id: &str,
        addresses: &[String],
    ) -> Result<Vec<PairRecord>, PairDataError>;

    /// Maximum addresses accepted by one `pairs_by_addresses` call
    fn max_batch_size(&self) -> usize;
}
