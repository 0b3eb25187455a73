//! Known-address source
//!
//! Resolves every address in the shared book through batched token lookups.
//! The book starts from the seed list and grows as on-chain discovery and
//! users add mints.

use std::sync::Arc;

use async_trait::async_trait;

use super::{resolve_addresses, SourceScope};
use crate::domain::address_book::KnownAddressBook;
use crate::ports::models::PairRecord;
use crate::ports::pair_data::PairDataPort;
use crate::ports::source::{CandidateSource, SourceError};

pub struct KnownAddressSource {
    pair_data: Arc<dyn PairDataPort>,
    book: KnownAddressBook,
    scope: SourceScope,
    batch_size: usize,
}

impl KnownAddressSource {
    pub fn new(
        pair_data: Arc<dyn PairDataPort>,
        book: KnownAddressBook,
        scope: SourceScope,
        batch_size: usize,
    ) -> Self {
        Self {
            pair_data,
            book,
            scope,
            batch_size,
        }
    }
}

#[async_trait]
impl CandidateSource for KnownAddressSource {
    fn name(&self) -> &str {
        "known_address"
    }

    async fn fetch_candidates(&self) -> Result<Vec<PairRecord>, SourceError> {
        let addresses = self.book.snapshot().await;
        tracing::debug!("Resolving {} known addresses", addresses.len());

        let pairs = resolve_addresses(
            self.pair_data.as_ref(),
            &self.scope.chain_id,
            &addresses,
            self.batch_size,
        )
        .await;
        Ok(self.scope.retain(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::{pair, MockPairData};

    #[tokio::test]
    async fn test_resolves_book_and_refilters() {
        let book = KnownAddressBook::seeded(["AbcBAGS", "DefBAGS"]);
        let mock = Arc::new(MockPairData::new().with_pairs(vec![
            pair("AbcBAGS", "p1", 1.0),
            pair("DefBAGS", "p2", 2.0),
        ]));

        let source = KnownAddressSource::new(mock.clone(), book.clone(), SourceScope::default(), 30);
        let candidates = source.fetch_candidates().await.unwrap();
        assert_eq!(candidates.len(), 2);

        book.extend(["GhiBAGS"]).await;
        source.fetch_candidates().await.unwrap();
        let calls = mock.get_batch_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], vec!["AbcBAGS", "DefBAGS", "GhiBAGS"]);
    }

    #[tokio::test]
    async fn test_batches_of_thirty() {
        let addresses: Vec<String> = (0..65).map(|i| format!("Known{:02}BAGS", i)).collect();
        let book = KnownAddressBook::seeded(&addresses);
        let mock = Arc::new(MockPairData::new());

        let source = KnownAddressSource::new(mock.clone(), book, SourceScope::default(), 30);
        source.fetch_candidates().await.unwrap();

        let sizes: Vec<usize> = mock.get_batch_calls().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![30, 30, 5]);
    }

    #[tokio::test]
    async fn test_empty_book_makes_no_calls() {
        let mock = Arc::new(MockPairData::new());
        let source = KnownAddressSource::new(
            mock.clone(),
            KnownAddressBook::new(),
            SourceScope::default(),
            30,
        );
        assert!(source.fetch_candidates().await.unwrap().is_empty());
        assert!(mock.get_batch_calls().is_empty());
    }
}
