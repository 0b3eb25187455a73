//! On-chain discovery source
//!
//! Mines the chain for new mints carrying the marker:
//! 1. fungible asset ids from the asset index
//! 2. recent signatures of the launch-creation and migration programs,
//!    each capped, whose transactions are fetched in concurrent batches and
//!    scanned for post-token-balance mints
//!
//! Found mints are recorded into the known-address book as each step
//! finishes, so a pass cut short by a timeout still keeps them, and are
//! then resolved to pairs through batched token lookups.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use super::{resolve_addresses, SourceScope};
use crate::domain::address_book::KnownAddressBook;
use crate::domain::known_programs::{BAGS_CREATOR_PROGRAM, METEORA_DBC_PROGRAM};
use crate::ports::chain_rpc::{ChainRpcPort, RpcError};
use crate::ports::models::PairRecord;
use crate::ports::pair_data::PairDataPort;
use crate::ports::source::{CandidateSource, SourceError};

/// Tuning for on-chain discovery
#[derive(Debug, Clone)]
pub struct OnChainSettings {
    pub creator_program: String,
    pub migration_program: String,
    /// Signatures requested per program
    pub signature_limit: usize,
    /// Signatures of the creation program actually inspected
    pub creator_signature_cap: usize,
    /// Signatures of the migration program actually inspected
    pub migration_signature_cap: usize,
    /// Concurrent transaction lookups per batch
    pub tx_batch_size: usize,
    pub asset_search_limit: usize,
    /// Addresses per token lookup
    pub address_batch_size: usize,
}

impl Default for OnChainSettings {
    fn default() -> Self {
        Self {
            creator_program: BAGS_CREATOR_PROGRAM.to_string(),
            migration_program: METEORA_DBC_PROGRAM.to_string(),
            signature_limit: 1000,
            creator_signature_cap: 200,
            migration_signature_cap: 300,
            tx_batch_size: 50,
            asset_search_limit: 1000,
            address_batch_size: 30,
        }
    }
}

pub struct OnChainSource {
    rpc: Arc<dyn ChainRpcPort>,
    pair_data: Arc<dyn PairDataPort>,
    book: KnownAddressBook,
    scope: SourceScope,
    settings: OnChainSettings,
}

impl OnChainSource {
    pub fn new(
        rpc: Arc<dyn ChainRpcPort>,
        pair_data: Arc<dyn PairDataPort>,
        book: KnownAddressBook,
        scope: SourceScope,
        settings: OnChainSettings,
    ) -> Self {
        Self {
            rpc,
            pair_data,
            book,
            scope,
            settings,
        }
    }

    /// Collect marked mints from program activity, recording them into the
    /// address book step by step. Fails only when every RPC entry point
    /// failed.
    pub async fn discover_mints(&self) -> Result<Vec<String>, RpcError> {
        let mut found = MintSet::default();
        let mut last_error = None;
        let mut succeeded = 0;

        match self.rpc.search_asset_ids(self.settings.asset_search_limit).await {
            Ok(ids) => {
                succeeded += 1;
                let before = found.len();
                found.extend(ids.iter().filter(|id| self.scope.filter.matches(id)));
                tracing::debug!("Asset search found {} marked mints", found.len() - before);
                self.record(found.since(before)).await;
            }
            Err(e) => {
                tracing::warn!("Asset search failed: {}", e);
                last_error = Some(e);
            }
        }

        let programs = [
            (
                self.settings.creator_program.as_str(),
                self.settings.creator_signature_cap,
            ),
            (
                self.settings.migration_program.as_str(),
                self.settings.migration_signature_cap,
            ),
        ];

        for (program, cap) in programs {
            match self
                .rpc
                .signatures_for_address(program, self.settings.signature_limit)
                .await
            {
                Ok(signatures) => {
                    succeeded += 1;
                    let capped = &signatures[..signatures.len().min(cap)];
                    let mints = self.scan_transactions(capped).await;
                    tracing::debug!(
                        "Program {} yielded {} marked mints from {} transactions",
                        program,
                        mints.len(),
                        capped.len()
                    );
                    let before = found.len();
                    found.extend(mints.iter());
                    self.record(found.since(before)).await;
                }
                Err(e) => {
                    tracing::warn!("Signature lookup for {} failed: {}", program, e);
                    last_error = Some(e);
                }
            }
        }

        match (succeeded, last_error) {
            (0, Some(e)) => Err(e),
            _ => Ok(found.into_vec()),
        }
    }

    async fn record(&self, mints: &[String]) {
        if mints.is_empty() {
            return;
        }
        let added = self.book.extend(mints).await;
        if !added.is_empty() {
            tracing::info!("Recorded {} new on-chain mints", added.len());
        }
    }

    /// Fetch transactions in concurrent batches; a failed lookup yields nothing
    async fn scan_transactions(&self, signatures: &[String]) -> Vec<String> {
        let mut mints = Vec::new();
        for batch in signatures.chunks(self.settings.tx_batch_size.max(1)) {
            let lookups = batch.iter().map(|sig| self.rpc.transaction_mints(sig));
            for result in join_all(lookups).await {
                match result {
                    Ok(found) => mints.extend(
                        found
                            .into_iter()
                            .filter(|mint| self.scope.filter.matches(mint)),
                    ),
                    Err(e) => tracing::debug!("Transaction lookup failed: {}", e),
                }
            }
        }
        mints
    }
}

#[async_trait]
impl CandidateSource for OnChainSource {
    fn name(&self) -> &str {
        "onchain"
    }

    async fn fetch_candidates(&self) -> Result<Vec<PairRecord>, SourceError> {
        let mints = self.discover_mints().await?;
        if mints.is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!("On-chain discovery found {} mints", mints.len());

        let pairs = resolve_addresses(
            self.pair_data.as_ref(),
            &self.scope.chain_id,
            &mints,
            self.settings.address_batch_size,
        )
        .await;
        Ok(self.scope.retain(pairs))
    }
}

/// Insertion-ordered, case-insensitively unique mint list
#[derive(Default)]
struct MintSet {
    ordered: Vec<String>,
    seen: HashSet<String>,
}

impl MintSet {
    fn extend<'a>(&mut self, mints: impl Iterator<Item = &'a String>) {
        for mint in mints {
            if self.seen.insert(mint.to_lowercase()) {
                self.ordered.push(mint.clone());
            }
        }
    }

    fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Mints added after the first `start`
    fn since(&self, start: usize) -> &[String] {
        &self.ordered[start..]
    }

    fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}
