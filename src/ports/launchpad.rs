use async_trait::async_trait;
use thiserror::Error;

use crate::domain::fees::{ClaimStat, CreatorRecord, LifetimeFees};

/// Launchpad API error type
#[derive(Error, Debug)]
pub enum LaunchpadError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Launchpad reported failure: {0}")]
    Unsuccessful(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("API key not configured")]
    MissingApiKey,
}

/// Token launch platform holding creator and fee data
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LaunchpadPort: Send + Sync {
    /// Fees generated since launch; `None` when the platform has no figure
    async fn lifetime_fees(&self, mint: &str) -> Result<Option<LifetimeFees>, LaunchpadError>;

    /// Creator and fee-share records
    async fn creators(&self, mint: &str) -> Result<Vec<CreatorRecord>, LaunchpadError>;

    /// Claimed fee totals per wallet
    async fn claim_stats(&self, mint: &str) -> Result<Vec<ClaimStat>, LaunchpadError>;
}
