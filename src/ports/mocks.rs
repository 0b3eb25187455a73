//! Recording mocks for the port traits
//!
//! Each mock records the calls it receives and answers from responses
//! configured through builder methods. Used by the aggregator tests and the
//! integration suite.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::chain_rpc::{ChainRpcPort, RpcError};
use super::launchpad::{LaunchpadError, LaunchpadPort};
use super::models::PairRecord;
use super::pair_data::{PairDataError, PairDataPort};
use super::source::{CandidateSource, SourceError};
use crate::domain::fees::{ClaimStat, CreatorRecord, LifetimeFees};

/// Mock pair data provider
#[derive(Debug, Clone)]
pub struct MockPairData {
    search_responses: Arc<Mutex<HashMap<String, Vec<PairRecord>>>>,
    failing_queries: Arc<Mutex<HashSet<String>>>,
    pairs_by_address: Arc<Mutex<HashMap<String, Vec<PairRecord>>>>,
    fail_batches: Arc<Mutex<bool>>,
    max_batch: usize,
    search_calls: Arc<Mutex<Vec<String>>>,
    batch_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl Default for MockPairData {
    fn default() -> Self {
        Self {
            search_responses: Arc::default(),
            failing_queries: Arc::default(),
            pairs_by_address: Arc::default(),
            fail_batches: Arc::default(),
            max_batch: 30,
            search_calls: Arc::default(),
            batch_calls: Arc::default(),
        }
    }
}

impl MockPairData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the pairs returned for a search query
    pub fn with_search(self, query: &str, pairs: Vec<PairRecord>) -> Self {
        self.search_responses
            .lock()
            .unwrap()
            .insert(query.to_string(), pairs);
        self
    }

    /// Builder method to make a search query fail
    pub fn with_failing_search(self, query: &str) -> Self {
        self.failing_queries.lock().unwrap().insert(query.to_string());
        self
    }

    /// Builder method to index pairs by their base token address
    pub fn with_pairs(self, pairs: Vec<PairRecord>) -> Self {
        {
            let mut index = self.pairs_by_address.lock().unwrap();
            for pair in pairs {
                if let Some(key) = pair.base_key() {
                    index.entry(key).or_default().push(pair);
                }
            }
        }
        self
    }

    /// Builder method to make every address batch fail
    pub fn with_failing_batches(self) -> Self {
        *self.fail_batches.lock().unwrap() = true;
        self
    }

    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    /// Get recorded search queries
    pub fn get_search_calls(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }

    /// Get recorded address batches
    pub fn get_batch_calls(&self) -> Vec<Vec<String>> {
        self.batch_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PairDataPort for MockPairData {
    async fn search_pairs(&self, query: &str) -> Result<Vec<PairRecord>, PairDataError> {
        self.search_calls.lock().unwrap().push(query.to_string());
        if self.failing_queries.lock().unwrap().contains(query) {
            return Err(PairDataError::Status {
                status: 500,
                body: format!("search failed for {}", query),
            });
        }
        Ok(self
            .search_responses
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn pairs_by_addresses(
        &self,
        _chain_id: &str,
        addresses: &[String],
    ) -> Result<Vec<PairRecord>, PairDataError> {
        self.batch_calls.lock().unwrap().push(addresses.to_vec());
        if addresses.len() > self.max_batch {
            return Err(PairDataError::BatchTooLarge {
                got: addresses.len(),
                max: self.max_batch,
            });
        }
        if *self.fail_batches.lock().unwrap() {
            return Err(PairDataError::RateLimited);
        }
        let index = self.pairs_by_address.lock().unwrap();
        Ok(addresses
            .iter()
            .filter_map(|a| index.get(&a.to_lowercase()))
            .flatten()
            .cloned()
            .collect())
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch
    }
}

/// Mock chain RPC
#[derive(Debug, Clone, Default)]
pub struct MockChainRpc {
    asset_ids: Arc<Mutex<Vec<String>>>,
    signatures: Arc<Mutex<HashMap<String, Vec<String>>>>,
    tx_mints: Arc<Mutex<HashMap<String, Vec<String>>>>,
    signature_delays: Arc<Mutex<HashMap<String, Duration>>>,
    failing: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockChainRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset_ids(self, ids: &[&str]) -> Self {
        *self.asset_ids.lock().unwrap() = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Builder method to set the signatures returned for a program
    pub fn with_signatures(self, address: &str, signatures: Vec<String>) -> Self {
        self.signatures
            .lock()
            .unwrap()
            .insert(address.to_string(), signatures);
        self
    }

    /// Builder method to stall signature lookups for a program
    pub fn with_signature_delay(self, address: &str, delay: Duration) -> Self {
        self.signature_delays
            .lock()
            .unwrap()
            .insert(address.to_string(), delay);
        self
    }

    /// Builder method to set the mints found in a transaction
    pub fn with_transaction(self, signature: &str, mints: &[&str]) -> Self {
        self.tx_mints.lock().unwrap().insert(
            signature.to_string(),
            mints.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Builder method to make every call fail
    pub fn failing(self) -> Self {
        *self.failing.lock().unwrap() = true;
        self
    }

    /// Get recorded calls as `method:argument`
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), RpcError> {
        self.calls.lock().unwrap().push(call);
        if *self.failing.lock().unwrap() {
            return Err(RpcError::Rpc {
                code: -32000,
                message: "mock failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChainRpcPort for MockChainRpc {
    async fn search_asset_ids(&self, limit: usize) -> Result<Vec<String>, RpcError> {
        self.record(format!("searchAssets:{}", limit))?;
        Ok(self.asset_ids.lock().unwrap().iter().take(limit).cloned().collect())
    }

    async fn signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<String>, RpcError> {
        self.record(format!("getSignaturesForAddress:{}", address))?;
        let delay = self.signature_delays.lock().unwrap().get(address).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .signatures
            .lock()
            .unwrap()
            .get(address)
            .map(|s| s.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn transaction_mints(&self, signature: &str) -> Result<Vec<String>, RpcError> {
        self.record(format!("getTransaction:{}", signature))?;
        Ok(self
            .tx_mints
            .lock()
            .unwrap()
            .get(signature)
            .cloned()
            .unwrap_or_default())
    }
}

/// Mock launchpad API
#[derive(Debug, Clone, Default)]
pub struct MockLaunchpad {
    fees: Arc<Mutex<HashMap<String, u64>>>,
    creators: Arc<Mutex<HashMap<String, Vec<CreatorRecord>>>>,
    claims: Arc<Mutex<HashMap<String, Vec<ClaimStat>>>>,
    failing: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockLaunchpad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fees(self, mint: &str, lamports: u64) -> Self {
        self.fees.lock().unwrap().insert(mint.to_string(), lamports);
        self
    }

    pub fn with_creators(self, mint: &str, creators: Vec<CreatorRecord>) -> Self {
        self.creators
            .lock()
            .unwrap()
            .insert(mint.to_string(), creators);
        self
    }

    pub fn with_claims(self, mint: &str, claims: Vec<ClaimStat>) -> Self {
        self.claims.lock().unwrap().insert(mint.to_string(), claims);
        self
    }

    /// Builder method to make every call fail
    pub fn failing(self) -> Self {
        *self.failing.lock().unwrap() = true;
        self
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), LaunchpadError> {
        self.calls.lock().unwrap().push(call);
        if *self.failing.lock().unwrap() {
            return Err(LaunchpadError::Unsuccessful("mock failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl LaunchpadPort for MockLaunchpad {
    async fn lifetime_fees(&self, mint: &str) -> Result<Option<LifetimeFees>, LaunchpadError> {
        self.record(format!("lifetime-fees:{}", mint))?;
        Ok(self
            .fees
            .lock()
            .unwrap()
            .get(mint)
            .copied()
            .map(LifetimeFees::from_lamports))
    }

    async fn creators(&self, mint: &str) -> Result<Vec<CreatorRecord>, LaunchpadError> {
        self.record(format!("creator:{}", mint))?;
        Ok(self
            .creators
            .lock()
            .unwrap()
            .get(mint)
            .cloned()
            .unwrap_or_default())
    }

    async fn claim_stats(&self, mint: &str) -> Result<Vec<ClaimStat>, LaunchpadError> {
        self.record(format!("claim-stats:{}", mint))?;
        Ok(self
            .claims
            .lock()
            .unwrap()
            .get(mint)
            .cloned()
            .unwrap_or_default())
    }
}

/// Candidate source returning a fixed result
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    candidates: Vec<PairRecord>,
    error: Option<String>,
    panics: bool,
    delay: Option<Duration>,
    calls: Arc<Mutex<usize>>,
}

impl StaticSource {
    /// A source that yields the given candidates
    pub fn new(name: &str, candidates: Vec<PairRecord>) -> Self {
        Self {
            name: name.to_string(),
            candidates,
            error: None,
            panics: false,
            delay: None,
            calls: Arc::default(),
        }
    }

    /// A source that always fails with the given message
    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::new(name, Vec::new())
        }
    }

    /// A source whose fetch panics with the given message
    pub fn panicking(name: &str, message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            panics: true,
            ..Self::new(name, Vec::new())
        }
    }

    /// Builder method to sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `fetch_candidates` was called
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl CandidateSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_candidates(&self) -> Result<Vec<PairRecord>, SourceError> {
        *self.calls.lock().unwrap() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.error {
            Some(message) if self.panics => panic!("{}", message),
            Some(message) => Err(SourceError::Other(message.clone())),
            None => Ok(self.candidates.clone()),
        }
    }
}

/// Build a minimal pair record for tests
pub fn pair(base_address: &str, pair_address: &str, market_cap: f64) -> PairRecord {
    PairRecord {
        chain_id: Some("solana".to_string()),
        dex_id: Some("meteora".to_string()),
        pair_address: Some(pair_address.to_string()),
        base_token: Some(super::models::PairToken {
            address: Some(base_address.to_string()),
            name: Some(format!("Token {}", pair_address)),
            symbol: Some(pair_address.to_uppercase()),
        }),
        market_cap: Some(market_cap),
        ..Default::default()
    }
}
