//! Discovery Service
//!
//! Owns the aggregator and the latest token snapshot. Callers ask for a
//! ranked view, add explicit addresses, request token details or force a
//! refresh; the polling loop refreshes on a fixed interval.
//!
//! At most one aggregation is in flight. Concurrent callers join the running
//! pass and all receive its report. The pass itself writes the snapshot, so
//! the result is kept even if every caller goes away.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Notify, RwLock};

use super::aggregator::{
    AggregateReport, Aggregator, COMMON_NAME_PRIORITY, KEYWORD_PRIORITY, KNOWN_ADDRESS_PRIORITY,
    ONCHAIN_PRIORITY,
};
use super::resilient::{panic_message, SourceOutcome};
use crate::adapters::bags::{BagsClient, BagsConfig};
use crate::adapters::dexscreener::{DexScreenerClient, DexScreenerConfig};
use crate::adapters::helius::{HeliusClient, HeliusConfig};
use crate::adapters::sources::{
    resolve_addresses, CommonNameSource, KeywordSearchSource, KnownAddressSource,
    OnChainSettings, OnChainSource, SourceScope,
};
use crate::config::Config;
use crate::domain::address_book::KnownAddressBook;
use crate::domain::fees::TokenDetails;
use crate::domain::normalizer::normalize;
use crate::domain::ranking::{filter_tokens, rank_tokens, SortDirection, SortField, View};
use crate::domain::suffix::{is_valid_address, SuffixFilter};
use crate::domain::token::Token;
use crate::ports::launchpad::LaunchpadPort;
use crate::ports::pair_data::PairDataPort;

type SharedReport = Shared<BoxFuture<'static, Arc<AggregateReport>>>;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("All discovery sources failed: {}", .sources.join(", "))]
    AllSourcesFailed { sources: Vec<String> },
    #[error("Token not found: {0}")]
    TokenNotFound(String),
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("Setup error: {0}")]
    Setup(String),
}

/// Latest discovery result
#[derive(Debug, Clone, Default)]
struct Snapshot {
    tokens: Vec<Token>,
    /// Time of the last pass with at least one working source
    last_updated: Option<DateTime<Utc>>,
    /// Time of the last pass, successful or not
    last_attempt: Option<DateTime<Utc>>,
    outcomes: Vec<SourceOutcome>,
    refresh_count: u64,
}

/// Request for a ranked view
#[derive(Debug, Clone, Default)]
pub struct ViewQuery {
    pub view: View,
    /// Overrides the view's default sort field
    pub sort: Option<SortField>,
    pub direction: Option<SortDirection>,
    pub search: Option<String>,
}

impl ViewQuery {
    pub fn new(view: View) -> Self {
        Self {
            view,
            ..Default::default()
        }
    }

    pub fn sort_field(&self) -> SortField {
        self.sort.unwrap_or_else(|| self.view.default_sort())
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.direction.unwrap_or_default()
    }
}

/// Address rejected by validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedAddress {
    pub address: String,
    pub reason: String,
}

/// Result of adding explicit addresses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOutcome {
    /// Addresses that passed validation
    pub accepted: Vec<String>,
    /// Accepted addresses that were new to the address book
    pub added: Vec<String>,
    pub rejected: Vec<RejectedAddress>,
    /// Tokens for accepted addresses present after the re-run
    pub found: Vec<Token>,
    /// Accepted addresses with no tradable pair yet
    pub not_found: Vec<String>,
}

/// Service status for monitoring
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub is_running: bool,
    pub token_count: usize,
    pub known_addresses: usize,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub refresh_count: u64,
    pub sources: Vec<String>,
    pub outcomes: Vec<SourceOutcome>,
}

/// Token discovery service
pub struct DiscoveryService {
    aggregator: Arc<Aggregator>,
    pair_data: Arc<dyn PairDataPort>,
    launchpad: Arc<dyn LaunchpadPort>,
    book: KnownAddressBook,
    scope: SourceScope,
    state: Arc<RwLock<Snapshot>>,
    inflight: Mutex<Option<(u64, SharedReport)>>,
    generation: AtomicU64,
    is_running: Arc<RwLock<bool>>,
    stop_signal: Notify,
    poll_interval: Duration,
    cache_ttl: Duration,
    address_batch_size: usize,
}

impl DiscoveryService {
    /// Create a service around an assembled aggregator
    pub fn new(
        aggregator: Aggregator,
        pair_data: Arc<dyn PairDataPort>,
        launchpad: Arc<dyn LaunchpadPort>,
        book: KnownAddressBook,
        scope: SourceScope,
    ) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            pair_data,
            launchpad,
            book,
            scope,
            state: Arc::new(RwLock::new(Snapshot::default())),
            inflight: Mutex::new(None),
            generation: AtomicU64::new(0),
            is_running: Arc::new(RwLock::new(false)),
            stop_signal: Notify::new(),
            poll_interval: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(10),
            address_batch_size: 30,
        }
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set how long a snapshot satisfies view requests without a re-run
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_address_batch_size(mut self, batch_size: usize) -> Self {
        self.address_batch_size = batch_size;
        self
    }

    /// Build the full service from configuration: the three upstream
    /// clients and the four sources in priority order
    pub fn from_config(config: &Config) -> Result<Self, DiscoveryError> {
        let discovery = &config.discovery;
        let scope = SourceScope::new(
            discovery.chain_id.clone(),
            SuffixFilter::new(discovery.suffix.trim()),
        );

        let dexscreener = DexScreenerClient::with_config(DexScreenerConfig {
            base_url: config.dexscreener.base_url.clone(),
            timeout: discovery.request_timeout(),
            max_retries: config.dexscreener.max_retries,
            batch_size: discovery.address_batch_size,
            ..Default::default()
        })
        .map_err(|e| DiscoveryError::Setup(e.to_string()))?;
        let pair_data: Arc<dyn PairDataPort> = Arc::new(dexscreener);

        let launchpad = BagsClient::with_config(BagsConfig {
            base_url: config.bags.base_url.clone(),
            api_key: config.bags.get_api_key(),
            timeout: discovery.request_timeout(),
        })
        .map_err(|e| DiscoveryError::Setup(e.to_string()))?;

        let book = KnownAddressBook::seeded(&discovery.known_addresses);

        let mut aggregator = Aggregator::new(scope.filter.clone())
            .with_source_timeout(discovery.source_timeout())
            .with_source(
                KEYWORD_PRIORITY,
                Arc::new(KeywordSearchSource::new(
                    pair_data.clone(),
                    discovery.search_terms.clone(),
                    scope.clone(),
                )),
            )
            .with_source(
                KNOWN_ADDRESS_PRIORITY,
                Arc::new(KnownAddressSource::new(
                    pair_data.clone(),
                    book.clone(),
                    scope.clone(),
                    discovery.address_batch_size,
                )),
            );

        match config.helius.get_rpc_url() {
            Some(rpc_url) if config.onchain.enabled => {
                let rpc = HeliusClient::with_config(HeliusConfig {
                    timeout: discovery.request_timeout(),
                    ..HeliusConfig::with_rpc_url(rpc_url)
                })
                .map_err(|e| DiscoveryError::Setup(e.to_string()))?;
                let onchain = &config.onchain;
                let settings = OnChainSettings {
                    creator_program: onchain.creator_program.clone(),
                    migration_program: onchain.migration_program.clone(),
                    signature_limit: onchain.signature_limit,
                    creator_signature_cap: onchain.creator_signature_cap,
                    migration_signature_cap: onchain.migration_signature_cap,
                    tx_batch_size: onchain.tx_batch_size,
                    asset_search_limit: onchain.asset_search_limit,
                    address_batch_size: discovery.address_batch_size,
                };
                aggregator = aggregator.with_source(
                    ONCHAIN_PRIORITY,
                    Arc::new(OnChainSource::new(
                        Arc::new(rpc),
                        pair_data.clone(),
                        book.clone(),
                        scope.clone(),
                        settings,
                    )),
                );
            }
            Some(_) => tracing::info!("On-chain discovery disabled by config"),
            None => tracing::warn!("No Helius RPC URL configured, on-chain discovery disabled"),
        }

        aggregator = aggregator.with_source(
            COMMON_NAME_PRIORITY,
            Arc::new(CommonNameSource::new(
                pair_data.clone(),
                discovery.common_names.clone(),
                discovery.common_name_limit,
                Duration::from_millis(discovery.common_name_delay_ms),
                scope.clone(),
            )),
        );

        Ok(Self::new(aggregator, pair_data, Arc::new(launchpad), book, scope)
            .with_poll_interval(discovery.poll_interval())
            .with_cache_ttl(discovery.cache_ttl())
            .with_address_batch_size(discovery.address_batch_size))
    }

    /// Shared known-address book
    pub fn book(&self) -> &KnownAddressBook {
        &self.book
    }

    /// Run (or join) a discovery pass and return its report
    pub async fn refresh(&self) -> Arc<AggregateReport> {
        let (generation, flight) = self.start_or_join();
        self.finish_flight(generation, flight).await
    }

    /// Explicit load: like `refresh`, but reports total failure when there
    /// is nothing to show
    pub async fn load(&self) -> Result<Vec<Token>, DiscoveryError> {
        let report = self.refresh().await;
        let tokens = self.tokens().await;
        if report.all_failed() && tokens.is_empty() {
            return Err(DiscoveryError::AllSourcesFailed {
                sources: report.failed_sources(),
            });
        }
        Ok(tokens)
    }

    /// Current snapshot, unranked
    pub async fn tokens(&self) -> Vec<Token> {
        self.state.read().await.tokens.clone()
    }

    /// Ranked token list for a view. Runs discovery first when there is no
    /// data yet or the snapshot is older than the cache TTL; a failed
    /// re-run keeps serving the previous snapshot.
    pub async fn ranked_view(&self, query: &ViewQuery) -> Result<Vec<Token>, DiscoveryError> {
        let (has_data, fresh) = {
            let state = self.state.read().await;
            let fresh = state
                .last_attempt
                .map(|at| age_of(at) < self.cache_ttl)
                .unwrap_or(false);
            (!state.tokens.is_empty(), fresh)
        };

        if !has_data {
            self.load().await?;
        } else if !fresh {
            self.refresh().await;
        }

        let tokens = self.tokens().await;
        let filtered = match query.search.as_deref() {
            Some(search) => filter_tokens(&tokens, search),
            None => tokens,
        };
        Ok(rank_tokens(
            &filtered,
            query.sort_field(),
            query.sort_direction(),
        ))
    }

    /// Validate addresses, record the valid ones in the known-address book
    /// and re-run discovery so they appear in the next snapshot
    pub async fn add_addresses<S: AsRef<str>>(
        &self,
        addresses: &[S],
    ) -> Result<AddOutcome, DiscoveryError> {
        let mut accepted: Vec<String> = Vec::new();
        let mut rejected = Vec::new();
        for raw in addresses {
            let address = raw.as_ref().trim();
            if address.is_empty() {
                continue;
            }
            match self.validate_address(address) {
                Ok(()) => {
                    if !accepted.iter().any(|a| a.eq_ignore_ascii_case(address)) {
                        accepted.push(address.to_string());
                    }
                }
                Err(DiscoveryError::InvalidAddress { address, reason }) => {
                    rejected.push(RejectedAddress { address, reason })
                }
                Err(e) => return Err(e),
            }
        }

        if accepted.is_empty() {
            return Ok(AddOutcome {
                accepted,
                added: Vec::new(),
                rejected,
                found: Vec::new(),
                not_found: Vec::new(),
            });
        }

        let added = self.book.extend(&accepted).await;
        tracing::info!(
            "Adding {} addresses ({} new), {} rejected",
            accepted.len(),
            added.len(),
            rejected.len()
        );

        // Join only a pass that starts after the book changed
        let current = self.generation.load(Ordering::SeqCst);
        self.refresh_after(current).await;

        let tokens = self.tokens().await;
        let mut found = Vec::new();
        let mut not_found = Vec::new();
        for address in &accepted {
            match tokens.iter().find(|t| t.address.eq_ignore_ascii_case(address)) {
                Some(token) => found.push(token.clone()),
                None => not_found.push(address.clone()),
            }
        }

        Ok(AddOutcome {
            accepted,
            added,
            rejected,
            found,
            not_found,
        })
    }

    /// Token plus launchpad fee data. The token comes from the snapshot or a
    /// direct lookup; each launchpad call degrades to null on its own.
    pub async fn token_details(&self, address: &str) -> Result<TokenDetails, DiscoveryError> {
        let address = address.trim();
        let token = match self.find_token(address).await {
            Some(token) => token,
            None => self.lookup_token(address).await?,
        };

        let mint = token.address.clone();
        let (fees, creators, claims) = tokio::join!(
            self.launchpad.lifetime_fees(&mint),
            self.launchpad.creators(&mint),
            self.launchpad.claim_stats(&mint),
        );

        let fees = fees
            .map_err(|e| tracing::debug!("Lifetime fees for {} unavailable: {}", mint, e))
            .ok()
            .flatten();
        let creators = creators
            .map_err(|e| tracing::debug!("Creators for {} unavailable: {}", mint, e))
            .ok();
        let claims = claims
            .map_err(|e| tracing::debug!("Claim stats for {} unavailable: {}", mint, e))
            .ok();

        Ok(TokenDetails::new(token, fees, creators, claims))
    }

    /// Run the polling loop until `stop` is called
    pub async fn run(&self) {
        *self.is_running.write().await = true;
        tracing::info!(
            "Starting discovery loop - Poll interval: {:?}, sources: {:?}",
            self.poll_interval,
            self.aggregator.source_names()
        );

        while *self.is_running.read().await {
            let report = self.refresh().await;
            if report.all_failed() {
                tracing::warn!(
                    "Discovery pass failed for every source, keeping previous snapshot"
                );
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.stop_signal.notified() => {}
            }
        }

        tracing::info!("Discovery loop stopped");
    }

    /// Stop the polling loop after the current pass
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
        self.stop_signal.notify_one();
        tracing::info!("Stop signal sent to discovery loop");
    }

    /// Get current status snapshot
    pub async fn status(&self) -> ServiceStatus {
        let is_running = *self.is_running.read().await;
        let known_addresses = self.book.len().await;
        let state = self.state.read().await;

        ServiceStatus {
            is_running,
            token_count: state.tokens.len(),
            known_addresses,
            last_updated: state.last_updated,
            last_attempt: state.last_attempt,
            refresh_count: state.refresh_count,
            sources: self.aggregator.source_names(),
            outcomes: state.outcomes.clone(),
        }
    }

    fn validate_address(&self, address: &str) -> Result<(), DiscoveryError> {
        let reason = if !self.scope.filter.matches(address) {
            format!("address must end with \"{}\"", self.scope.filter.marker())
        } else if !is_valid_address(address) {
            "not a valid base58 address".to_string()
        } else {
            return Ok(());
        };
        Err(DiscoveryError::InvalidAddress {
            address: address.to_string(),
            reason,
        })
    }

    async fn find_token(&self, address: &str) -> Option<Token> {
        self.state
            .read()
            .await
            .tokens
            .iter()
            .find(|t| t.address.eq_ignore_ascii_case(address))
            .cloned()
    }

    async fn lookup_token(&self, address: &str) -> Result<Token, DiscoveryError> {
        self.validate_address(address)?;
        let pairs = resolve_addresses(
            self.pair_data.as_ref(),
            &self.scope.chain_id,
            &[address.to_string()],
            self.address_batch_size,
        )
        .await;

        self.scope
            .retain(pairs)
            .into_iter()
            .find(|p| {
                p.base_address()
                    .map(|a| a.eq_ignore_ascii_case(address))
                    .unwrap_or(false)
            })
            .map(|pair| normalize(&pair, Utc::now()))
            .ok_or_else(|| DiscoveryError::TokenNotFound(address.to_string()))
    }

    /// Keep refreshing until a pass newer than `generation` has completed
    async fn refresh_after(&self, generation: u64) -> Arc<AggregateReport> {
        loop {
            let (flight_generation, flight) = self.start_or_join();
            let report = self.finish_flight(flight_generation, flight).await;
            if flight_generation > generation {
                return report;
            }
        }
    }

    fn start_or_join(&self) -> (u64, SharedReport) {
        let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((generation, flight)) = slot.as_ref() {
            if flight.peek().is_none() {
                tracing::debug!("Joining discovery pass #{}", generation);
                return (*generation, flight.clone());
            }
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let aggregator = self.aggregator.clone();
        let state = self.state.clone();
        let flight = async move {
            let report = match AssertUnwindSafe(aggregator.aggregate()).catch_unwind().await {
                Ok(report) => report,
                Err(panic) => {
                    let reason =
                        format!("discovery pass panicked: {}", panic_message(panic.as_ref()));
                    tracing::error!("{}", reason);
                    aggregator.failed_report(&reason)
                }
            };
            apply_report(&state, &report).await;
            Arc::new(report)
        }
        .boxed()
        .shared();

        // Drive the pass to completion even if every caller is dropped
        tokio::spawn(flight.clone());

        tracing::debug!("Started discovery pass #{}", generation);
        *slot = Some((generation, flight.clone()));
        (generation, flight)
    }

    async fn finish_flight(&self, generation: u64, flight: SharedReport) -> Arc<AggregateReport> {
        let report = flight.await;
        let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(slot.as_ref(), Some((current, _)) if *current == generation) {
            *slot = None;
        }
        report
    }
}

async fn apply_report(state: &RwLock<Snapshot>, report: &AggregateReport) {
    let mut state = state.write().await;
    state.last_attempt = Some(report.generated_at);
    state.outcomes = report.outcomes.clone();
    state.refresh_count += 1;

    if report.all_failed() {
        tracing::warn!(
            "All sources failed ({}), keeping {} cached tokens",
            report.failed_sources().join(", "),
            state.tokens.len()
        );
        return;
    }

    state.tokens = report.tokens.clone();
    state.last_updated = Some(report.generated_at);
}

fn age_of(at: DateTime<Utc>) -> Duration {
    (Utc::now() - at).to_std().unwrap_or_default()
}
