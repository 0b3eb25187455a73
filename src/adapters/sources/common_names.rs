//! Common-name fallback source
//!
//! Searches a prefix of a list of common meme name fragments one at a time,
//! pausing between calls to stay under the provider's rate limit. Results
//! are deduplicated by pair address.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::SourceScope;
use crate::ports::models::PairRecord;
use crate::ports::pair_data::PairDataPort;
use crate::ports::source::{CandidateSource, SourceError};

pub struct CommonNameSource {
    pair_data: Arc<dyn PairDataPort>,
    names: Vec<String>,
    limit: usize,
    delay: Duration,
    scope: SourceScope,
}

impl CommonNameSource {
    pub fn new(
        pair_data: Arc<dyn PairDataPort>,
        names: Vec<String>,
        limit: usize,
        delay: Duration,
        scope: SourceScope,
    ) -> Self {
        Self {
            pair_data,
            names,
            limit,
            delay,
            scope,
        }
    }
}

#[async_trait]
impl CandidateSource for CommonNameSource {
    fn name(&self) -> &str {
        "common_names"
    }

    async fn fetch_candidates(&self) -> Result<Vec<PairRecord>, SourceError> {
        let mut candidates = Vec::new();
        let mut seen_pairs = HashSet::new();

        for (index, name) in self.names.iter().take(self.limit).enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.pair_data.search_pairs(name).await {
                Ok(pairs) => {
                    for pair in self.scope.retain(pairs) {
                        let pair_key = pair.pair_address.clone().unwrap_or_default();
                        if seen_pairs.insert(pair_key) {
                            candidates.push(pair);
                        }
                    }
                }
                Err(e) => tracing::debug!("Common-name search \"{}\" failed: {}", name, e),
            }
        }

        Ok(candidates)
    }
}
