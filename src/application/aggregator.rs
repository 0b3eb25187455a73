//! Aggregator
//!
//! Fans out to all registered sources concurrently, then merges:
//! 1. candidates are ordered by (source priority, discovery order)
//! 2. the first candidate per lowercase base address wins; candidates
//!    without an address or outside the suffix filter are dropped
//! 3. survivors are normalized and deduplicated again on token address
//!
//! The output is unsorted with provisional ranks; ordering is the ranker's
//! job. Total failure yields an empty token list, never an error.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

use super::resilient::{call_source, SourceOutcome, SourceStatus};
use crate::domain::normalizer::normalize;
use crate::domain::suffix::SuffixFilter;
use crate::domain::token::Token;
use crate::ports::models::PairRecord;
use crate::ports::source::CandidateSource;

/// Priorities of the built-in sources, lower wins on duplicates
pub const KEYWORD_PRIORITY: u32 = 0;
pub const KNOWN_ADDRESS_PRIORITY: u32 = 1;
pub const ONCHAIN_PRIORITY: u32 = 2;
pub const COMMON_NAME_PRIORITY: u32 = 3;

/// Default per-source timeout
const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(60);

/// One full aggregation pass
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub tokens: Vec<Token>,
    pub outcomes: Vec<SourceOutcome>,
    /// Raw candidates received before dedup
    pub candidates: usize,
    pub generated_at: DateTime<Utc>,
}

impl AggregateReport {
    /// Every registered source failed
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| !o.is_ok())
    }

    pub fn failed_sources(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_ok())
            .map(|o| o.source.clone())
            .collect()
    }
}

struct RegisteredSource {
    priority: u32,
    source: Arc<dyn CandidateSource>,
}

/// Candidate fan-out and merge
pub struct Aggregator {
    sources: Vec<RegisteredSource>,
    filter: SuffixFilter,
    source_timeout: Duration,
}

impl Aggregator {
    pub fn new(filter: SuffixFilter) -> Self {
        Self {
            sources: Vec::new(),
            filter,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    /// Register a source with an explicit priority
    pub fn with_source(mut self, priority: u32, source: Arc<dyn CandidateSource>) -> Self {
        self.sources.push(RegisteredSource { priority, source });
        self
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|s| s.source.name().to_string())
            .collect()
    }

    pub fn filter(&self) -> &SuffixFilter {
        &self.filter
    }

    /// Run every source and merge their candidates into canonical tokens
    pub async fn aggregate(&self) -> AggregateReport {
        let calls = self
            .sources
            .iter()
            .map(|s| call_source(s.source.as_ref(), s.priority, self.source_timeout));
        let results = join_all(calls).await;

        let mut batches = Vec::with_capacity(results.len());
        let mut outcomes = Vec::with_capacity(results.len());
        for (registration, (candidates, outcome)) in results.into_iter().enumerate() {
            batches.push((outcome.priority, registration, candidates));
            outcomes.push(outcome);
        }
        let candidates: usize = batches.iter().map(|(_, _, c)| c.len()).sum();

        let now = Utc::now();
        let merged = merge_candidates(batches, &self.filter);
        let tokens = build_tokens(&merged, now);

        tracing::info!(
            "Aggregated {} tokens from {} candidates ({} of {} sources ok)",
            tokens.len(),
            candidates,
            outcomes.iter().filter(|o| o.is_ok()).count(),
            outcomes.len()
        );

        AggregateReport {
            tokens,
            outcomes,
            candidates,
            generated_at: now,
        }
    }
}

impl Aggregator {
    /// Report for a pass that broke down before producing candidates; every
    /// source is marked failed with the same reason
    pub fn failed_report(&self, reason: &str) -> AggregateReport {
        let outcomes = self
            .sources
            .iter()
            .map(|s| SourceOutcome {
                source: s.source.name().to_string(),
                priority: s.priority,
                status: SourceStatus::Failed {
                    reason: reason.to_string(),
                },
                elapsed_ms: 0,
            })
            .collect();
        AggregateReport {
            tokens: Vec::new(),
            outcomes,
            candidates: 0,
            generated_at: Utc::now(),
        }
    }
}

/// Order candidate batches by (priority, registration) and keep the first
/// in-scope candidate per lowercase base address
pub fn merge_candidates(
    mut batches: Vec<(u32, usize, Vec<PairRecord>)>,
    filter: &SuffixFilter,
) -> Vec<PairRecord> {
    batches.sort_by_key(|(priority, registration, _)| (*priority, *registration));

    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for (_, _, candidates) in batches {
        for candidate in candidates {
            let Some(address) = candidate.base_address() else {
                continue;
            };
            if !filter.matches(address) {
                continue;
            }
            if seen.insert(address.to_lowercase()) {
                merged.push(candidate);
            }
        }
    }
    merged
}

/// Normalize merged candidates, dedup on token address and assign
/// provisional ranks
pub fn build_tokens(merged: &[PairRecord], now: DateTime<Utc>) -> Vec<Token> {
    let mut seen = HashSet::new();
    let mut tokens: Vec<Token> = merged
        .iter()
        .map(|pair| normalize(pair, now))
        .filter(|token| seen.insert(token.key()))
        .collect();
    for (index, token) in tokens.iter_mut().enumerate() {
        token.rank = index + 1;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::{pair, StaticSource};

    fn addresses(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.address.as_str()).collect()
    }

    #[test]
    fn test_build_tokens_dedups_normalized_addresses() {
        let now = Utc::now();
        let merged = vec![
            pair("AbcBAGS", "first", 1.0),
            pair("abcbags", "second", 2.0),
            pair("DefBAGS", "third", 3.0),
        ];
        let tokens = build_tokens(&merged, now);

        assert_eq!(addresses(&tokens), vec!["AbcBAGS", "DefBAGS"]);
        assert_eq!(tokens[0].pair_address, "first");
        let ranks: Vec<usize> = tokens.iter().map(|t| t.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
    }

    #[test]
    fn test_failed_report_marks_every_source() {
        let aggregator = Aggregator::new(SuffixFilter::default())
            .with_source(0, Arc::new(StaticSource::new("a", vec![])))
            .with_source(2, Arc::new(StaticSource::new("b", vec![])));
        let report = aggregator.failed_report("pass panicked");

        assert!(report.all_failed());
        assert!(report.tokens.is_empty());
        assert_eq!(report.failed_sources(), vec!["a", "b"]);
        assert_eq!(report.outcomes[1].priority, 2);
    }

    #[tokio::test]
    async fn test_earlier_priority_wins_duplicates() {
        let keyword = StaticSource::new("keyword", vec![pair("AbcBAGS", "from-keyword", 1.0)]);
        let known = StaticSource::new(
            "known",
            vec![pair("abcbags", "from-known", 2.0), pair("DefBAGS", "p2", 3.0)],
        );

        // Registered out of priority order on purpose
        let aggregator = Aggregator::new(SuffixFilter::default())
            .with_source(KNOWN_ADDRESS_PRIORITY, Arc::new(known))
            .with_source(KEYWORD_PRIORITY, Arc::new(keyword));
        let report = aggregator.aggregate().await;

        assert_eq!(report.tokens.len(), 2);
        assert_eq!(report.tokens[0].pair_address, "from-keyword");
        assert_eq!(report.tokens[1].address, "DefBAGS");
        assert_eq!(report.candidates, 3);
    }

    #[tokio::test]
    async fn test_merge_drops_missing_and_out_of_scope() {
        let mut no_address = pair("", "p0", 1.0);
        no_address.base_token = None;
        let source = StaticSource::new(
            "mixed",
            vec![
                no_address,
                pair("So11111111111111111111111111111111111111112", "p1", 1.0),
                pair("GoodBAGS", "p2", 1.0),
            ],
        );
        let report = Aggregator::new(SuffixFilter::default())
            .with_source(0, Arc::new(source))
            .aggregate()
            .await;

        assert_eq!(addresses(&report.tokens), vec!["GoodBAGS"]);
    }

    #[tokio::test]
    async fn test_partial_failure_degrades_gracefully() {
        let aggregator = Aggregator::new(SuffixFilter::default())
            .with_source(0, Arc::new(StaticSource::failing("a", "down")))
            .with_source(1, Arc::new(StaticSource::failing("b", "down")))
            .with_source(2, Arc::new(StaticSource::new("c", vec![pair("OkBAGS", "p", 1.0)])));
        let report = aggregator.aggregate().await;

        assert_eq!(addresses(&report.tokens), vec!["OkBAGS"]);
        assert!(!report.all_failed());
        assert_eq!(report.failed_sources(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_total_failure_is_empty_not_error() {
        let report = Aggregator::new(SuffixFilter::default())
            .with_source(0, Arc::new(StaticSource::failing("a", "down")))
            .aggregate()
            .await;
        assert!(report.tokens.is_empty());
        assert!(report.all_failed());
    }

    #[tokio::test]
    async fn test_no_sources_is_empty() {
        let report = Aggregator::new(SuffixFilter::default()).aggregate().await;
        assert!(report.tokens.is_empty());
        assert!(!report.all_failed());
    }

    #[test]
    fn test_provisional_ranks_follow_merge_order() {
        let merged = vec![pair("ABAGS", "p1", 5.0), pair("BBAGS", "p2", 10.0)];
        let tokens = build_tokens(&merged, Utc::now());
        let ranks: Vec<usize> = tokens.iter().map(|t| t.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
    }
}
