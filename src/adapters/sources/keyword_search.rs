//! Keyword search source
//!
//! Queries the pair data provider for a fixed list of terms concurrently.
//! A failing term contributes nothing; the source only fails when every
//! term failed.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use super::SourceScope;
use crate::ports::models::PairRecord;
use crate::ports::pair_data::PairDataPort;
use crate::ports::source::{CandidateSource, SourceError};

pub struct KeywordSearchSource {
    pair_data: Arc<dyn PairDataPort>,
    terms: Vec<String>,
    scope: SourceScope,
}

impl KeywordSearchSource {
    pub fn new(pair_data: Arc<dyn PairDataPort>, terms: Vec<String>, scope: SourceScope) -> Self {
        Self {
            pair_data,
            terms,
            scope,
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

#[async_trait]
impl CandidateSource for KeywordSearchSource {
    fn name(&self) -> &str {
        "keyword_search"
    }

    async fn fetch_candidates(&self) -> Result<Vec<PairRecord>, SourceError> {
        let searches = self.terms.iter().map(|term| self.pair_data.search_pairs(term));
        let results = join_all(searches).await;

        let mut candidates = Vec::new();
        let mut failures = 0;
        for (term, result) in self.terms.iter().zip(results) {
            match result {
                Ok(pairs) => candidates.extend(self.scope.retain(pairs)),
                Err(e) => {
                    failures += 1;
                    tracing::warn!("Search for \"{}\" failed: {}", term, e);
                }
            }
        }

        if !self.terms.is_empty() && failures == self.terms.len() {
            return Err(SourceError::Other(format!(
                "all {} search terms failed",
                failures
            )));
        }

        tracing::debug!(
            "Keyword search found {} candidates over {} terms",
            candidates.len(),
            self.terms.len()
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::pair;
    use crate::ports::pair_data::{MockPairDataPort, PairDataError};

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_filters_by_chain_and_suffix() {
        let mut mock = MockPairDataPort::new();
        mock.expect_search_pairs().returning(|_| {
            let mut eth = pair("EthBAGS", "p3", 5.0);
            eth.chain_id = Some("ethereum".into());
            Ok(vec![
                pair("AbcBAGS", "p1", 10.0),
                pair("So11111111111111111111111111111111111111112", "p2", 20.0),
                eth,
            ])
        });

        let source = KeywordSearchSource::new(Arc::new(mock), terms(&["bags"]), SourceScope::default());
        let candidates = source.fetch_candidates().await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].base_address(), Some("AbcBAGS"));
    }

    #[tokio::test]
    async fn test_term_failure_is_isolated() {
        let mut mock = MockPairDataPort::new();
        mock.expect_search_pairs()
            .times(3)
            .returning(|query| match query {
                "broken" => Err(PairDataError::RateLimited),
                "bags" => Ok(vec![pair("AbcBAGS", "p1", 10.0)]),
                _ => Ok(vec![pair("DefBAGS", "p2", 10.0)]),
            });

        let source = KeywordSearchSource::new(
            Arc::new(mock),
            terms(&["bags", "broken", "meme bags"]),
            SourceScope::default(),
        );
        let candidates = source.fetch_candidates().await.unwrap();

        let pairs: Vec<_> = candidates.iter().filter_map(|p| p.pair_address.as_deref()).collect();
        assert_eq!(pairs, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_all_terms_failing_is_an_error() {
        let mut mock = MockPairDataPort::new();
        mock.expect_search_pairs()
            .returning(|_| Err(PairDataError::RateLimited));

        let source = KeywordSearchSource::new(Arc::new(mock), terms(&["a", "b"]), SourceScope::default());
        assert!(source.fetch_candidates().await.is_err());
    }

    #[tokio::test]
    async fn test_no_terms_is_empty() {
        let mock = MockPairDataPort::new();
        let source = KeywordSearchSource::new(Arc::new(mock), vec![], SourceScope::default());
        assert!(source.fetch_candidates().await.unwrap().is_empty());
        assert_eq!(source.name(), "keyword_search");
    }
}
