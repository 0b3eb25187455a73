//! Candidate Sources
//!
//! The four discovery strategies feeding the aggregator:
//! - `keyword_search`: free-text search over a fixed list of terms
//! - `known_address`: direct lookup of the known-address book
//! - `onchain`: mints found in launchpad and migration program activity
//! - `common_names`: sequential search over common meme name fragments
//!
//! Every source filters its output to the configured chain and the
//! naming-suffix predicate before returning.

pub mod common_names;
pub mod keyword_search;
pub mod known_address;
pub mod onchain;

pub use common_names::CommonNameSource;
pub use keyword_search::KeywordSearchSource;
pub use known_address::KnownAddressSource;
pub use onchain::{OnChainSettings, OnChainSource};

use futures::future::join_all;

use crate::domain::suffix::SuffixFilter;
use crate::ports::models::PairRecord;
use crate::ports::pair_data::PairDataPort;

/// Chain and suffix scope shared by all sources
#[derive(Debug, Clone)]
pub struct SourceScope {
    pub chain_id: String,
    pub filter: SuffixFilter,
}

impl SourceScope {
    pub fn new(chain_id: impl Into<String>, filter: SuffixFilter) -> Self {
        Self {
            chain_id: chain_id.into(),
            filter,
        }
    }

    /// Pair is on the scoped chain and its base token carries the marker
    pub fn admits(&self, pair: &PairRecord) -> bool {
        pair.is_on_chain(&self.chain_id) && self.filter.matches_opt(pair.base_address())
    }

    /// Keep only admitted pairs
    pub fn retain(&self, pairs: Vec<PairRecord>) -> Vec<PairRecord> {
        pairs.into_iter().filter(|p| self.admits(p)).collect()
    }
}

impl Default for SourceScope {
    fn default() -> Self {
        Self::new("solana", SuffixFilter::default())
    }
}

/// Split addresses into consecutive chunks of at most `batch_size`
pub fn chunk_addresses(addresses: &[String], batch_size: usize) -> Vec<Vec<String>> {
    addresses
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Resolve addresses to pairs in batches. A failed batch contributes
/// nothing; results keep batch order.
pub async fn resolve_addresses(
    pair_data: &dyn PairDataPort,
    chain_id: &str,
    addresses: &[String],
    batch_size: usize,
) -> Vec<PairRecord> {
    if addresses.is_empty() {
        return Vec::new();
    }
    let batch_size = batch_size.min(pair_data.max_batch_size()).max(1);
    let batches = chunk_addresses(addresses, batch_size);

    let lookups = batches
        .iter()
        .map(|batch| pair_data.pairs_by_addresses(chain_id, batch));
    let results = join_all(lookups).await;

    let mut pairs = Vec::new();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(found) => pairs.extend(found),
            Err(e) => tracing::warn!(
                "Address batch {}/{} ({} addresses) failed: {}",
                index + 1,
                batches.len(),
                batches[index].len(),
                e
            ),
        }
    }
    pairs
}
