//! Bags API Client
//!
//! Reads creator, claim and lifetime fee data for launched tokens. Every
//! request carries the `x-api-key` header and every response is wrapped in
//! a `{ success, response }` envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{BagsEndpoint, BagsEnvelope};
use crate::domain::fees::{ClaimStat, CreatorRecord, LifetimeFees};
use crate::ports::launchpad::{LaunchpadError, LaunchpadPort};
use crate::ports::models::value_to_u64;

/// Bags client configuration
#[derive(Debug, Clone)]
pub struct BagsConfig {
    /// Base URL for the Bags public API
    pub base_url: String,
    /// API key sent as `x-api-key`
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for BagsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://public-api-v2.bags.fm/api/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(15),
        }
    }
}

/// Bags launchpad client
#[derive(Debug, Clone)]
pub struct BagsClient {
    config: BagsConfig,
    http: Client,
}

impl BagsClient {
    /// Create a new client with custom configuration
    pub fn with_config(config: BagsConfig) -> Result<Self, LaunchpadError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Build the upstream URL for an endpoint
    pub fn endpoint_url(&self, endpoint: BagsEndpoint) -> String {
        format!("{}{}", self.config.base_url, endpoint.path())
    }

    async fn fetch(&self, endpoint: BagsEndpoint, mint: &str) -> Result<Option<Value>, LaunchpadError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LaunchpadError::MissingApiKey)?;

        let response = self
            .http
            .get(self.endpoint_url(endpoint))
            .query(&[("tokenMint", mint)])
            .header("x-api-key", api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LaunchpadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: BagsEnvelope = response
            .json()
            .await
            .map_err(|e| LaunchpadError::ParseError(format!("Failed to parse JSON: {}", e)))?;

        if !envelope.success {
            let reason = envelope
                .error
                .clone()
                .unwrap_or_else(|| "success=false".to_string());
            tracing::debug!("Bags {} for {} unsuccessful: {}", endpoint.path(), mint, reason);
        }
        Ok(envelope.into_payload())
    }
}

#[async_trait]
impl LaunchpadPort for BagsClient {
    async fn lifetime_fees(&self, mint: &str) -> Result<Option<LifetimeFees>, LaunchpadError> {
        let payload = self.fetch(BagsEndpoint::LifetimeFees, mint).await?;
        Ok(parse_lifetime_fees(payload))
    }

    async fn creators(&self, mint: &str) -> Result<Vec<CreatorRecord>, LaunchpadError> {
        let payload = self.fetch(BagsEndpoint::Creator, mint).await?;
        Ok(parse_records(payload))
    }

    async fn claim_stats(&self, mint: &str) -> Result<Vec<ClaimStat>, LaunchpadError> {
        let payload = self.fetch(BagsEndpoint::ClaimStats, mint).await?;
        Ok(parse_records(payload))
    }
}

/// Lamport amount sent as a string or number
pub(crate) fn parse_lifetime_fees(payload: Option<Value>) -> Option<LifetimeFees> {
    payload
        .as_ref()
        .and_then(value_to_u64)
        .map(LifetimeFees::from_lamports)
}

/// Array payload, dropping elements that fail to parse
pub(crate) fn parse_records<T: DeserializeOwned>(payload: Option<Value>) -> Vec<T> {
    match payload {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}
