//! DexScreener API Client
//!
//! HTTP client for the public DexScreener API. Handles free-text pair search
//! and batched pair lookup by token address.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::ports::models::PairRecord;
use crate::ports::pair_data::{PairDataError, PairDataPort};

/// DexScreener accepts at most this many addresses per token lookup
pub const MAX_ADDRESSES_PER_REQUEST: usize = 30;

/// DexScreener client configuration
#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    /// Base URL for the DexScreener API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay for backoff (milliseconds)
    pub retry_base_delay_ms: u64,
    /// Addresses per token lookup, capped at the API limit
    pub batch_size: usize,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.dexscreener.com".to_string(),
            timeout: Duration::from_secs(15),
            max_retries: 3,
            retry_base_delay_ms: 500,
            batch_size: MAX_ADDRESSES_PER_REQUEST,
        }
    }
}

/// DexScreener pair data client
#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    config: DexScreenerConfig,
    http: Client,
}

impl DexScreenerClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self, PairDataError> {
        Self::with_config(DexScreenerConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: DexScreenerConfig) -> Result<Self, PairDataError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Get the configured base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, PairDataError> {
        let response = self
            .execute_with_retry(|| async {
                self.http
                    .get(url)
                    .query(query)
                    .send()
                    .await
                    .map_err(PairDataError::from)
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PairDataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PairDataError::ParseError(format!("Failed to parse JSON: {}", e)))
    }

    /// Execute request with retry logic and rate limit handling
    async fn execute_with_retry<F, Fut>(&self, request_fn: F) -> Result<reqwest::Response, PairDataError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, PairDataError>>,
    {
        let mut last_error = None;

        let attempts = self.config.max_retries.saturating_add(1);
        for attempt in 0..attempts {
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let backoff = Duration::from_millis(
                            self.config.retry_base_delay_ms * 2u64.pow(attempt + 1),
                        );
                        tracing::warn!(
                            "DexScreener rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff,
                            attempt + 1,
                            attempts
                        );
                        last_error = Some(PairDataError::RateLimited);
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if status.is_server_error() {
                        last_error = Some(PairDataError::Status {
                            status: status.as_u16(),
                            body: String::new(),
                        });
                        tokio::time::sleep(Duration::from_millis(
                            self.config.retry_base_delay_ms * (attempt as u64 + 1),
                        ))
                        .await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    // timeouts are not retried
                    if matches!(&e, PairDataError::HttpError(err) if err.is_timeout()) {
                        return Err(e);
                    }
                    last_error = Some(e);
                    tokio::time::sleep(Duration::from_millis(
                        self.config.retry_base_delay_ms * (attempt as u64 + 1),
                    ))
                    .await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| PairDataError::ParseError("Retries exhausted".into())))
    }
}

#[async_trait]
impl PairDataPort for DexScreenerClient {
    async fn search_pairs(&self, query: &str) -> Result<Vec<PairRecord>, PairDataError> {
        let url = format!("{}/latest/dex/search", self.config.base_url);
        let body = self.get_json(&url, &[("q", query)]).await?;
        let pairs = parse_pair_list(body);
        tracing::debug!("DexScreener search '{}' returned {} pairs", query, pairs.len());
        Ok(pairs)
    }

    async fn pairs_by_addresses(
        &self,
        chain_id: &str,
        addresses: &[String],
    ) -> Result<Vec<PairRecord>, PairDataError> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        let max = self.max_batch_size();
        if addresses.len() > max {
            return Err(PairDataError::BatchTooLarge {
                got: addresses.len(),
                max,
            });
        }

        let url = format!(
            "{}/tokens/v1/{}/{}",
            self.config.base_url,
            chain_id,
            addresses.join(",")
        );
        let body = self.get_json(&url, &[]).await?;
        let pairs = parse_pair_list(body);
        tracing::debug!(
            "DexScreener resolved {} addresses into {} pairs",
            addresses.len(),
            pairs.len()
        );
        Ok(pairs)
    }

    fn max_batch_size(&self) -> usize {
        self.config.batch_size.clamp(1, MAX_ADDRESSES_PER_REQUEST)
    }
}

/// Extract pair records from either a bare array or a `{ "pairs": [...] }`
/// envelope. Elements that fail to parse are dropped individually.
pub(crate) fn parse_pair_list(body: Value) -> Vec<PairRecord> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("pairs") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<PairRecord>(item) {
            Ok(pair) => Some(pair),
            Err(e) => {
                tracing::debug!("Dropping malformed pair record: {}", e);
                None
            }
        })
        .collect()
}
