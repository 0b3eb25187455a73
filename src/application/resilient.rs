//! Resilient source calls
//!
//! Every candidate source is invoked through `call_source`, which bounds the
//! call with a timeout and turns any failure into an empty contribution plus
//! a tagged outcome for the report.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde::Serialize;

use crate::ports::models::PairRecord;
use crate::ports::source::{CandidateSource, SourceError};

/// Result of one source call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Ok { candidates: usize },
    Failed { reason: String },
}

/// Per-source line of an aggregation report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOutcome {
    pub source: String,
    pub priority: u32,
    #[serde(flatten)]
    pub status: SourceStatus,
    pub elapsed_ms: u64,
}

impl SourceOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, SourceStatus::Ok { .. })
    }
}

/// Call a source with a timeout. Never fails: errors, panics and timeouts
/// yield no candidates and a `Failed` outcome.
pub async fn call_source(
    source: &dyn CandidateSource,
    priority: u32,
    timeout: Duration,
) -> (Vec<PairRecord>, SourceOutcome) {
    let started = Instant::now();
    let fetch = AssertUnwindSafe(source.fetch_candidates()).catch_unwind();
    let result = match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(result)) => result,
        Ok(Err(panic)) => Err(SourceError::Other(format!(
            "source panicked: {}",
            panic_message(panic.as_ref())
        ))),
        Err(_) => Err(SourceError::Timeout(timeout.as_secs())),
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let (candidates, status) = match result {
        Ok(candidates) => {
            tracing::debug!(
                "Source {} returned {} candidates in {}ms",
                source.name(),
                candidates.len(),
                elapsed_ms
            );
            let count = candidates.len();
            (candidates, SourceStatus::Ok { candidates: count })
        }
        Err(e) => {
            tracing::warn!("Source {} failed after {}ms: {}", source.name(), elapsed_ms, e);
            (
                Vec::new(),
                SourceStatus::Failed {
                    reason: e.to_string(),
                },
            )
        }
    };

    let outcome = SourceOutcome {
        source: source.name().to_string(),
        priority,
        status,
        elapsed_ms,
    };
    (candidates, outcome)
}

/// Best-effort text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::{pair, StaticSource};

    #[tokio::test]
    async fn test_success_passes_candidates_through() {
        let source = StaticSource::new("good", vec![pair("AbcBAGS", "p1", 1.0)]);
        let (candidates, outcome) = call_source(&source, 0, Duration::from_secs(5)).await;

        assert_eq!(candidates.len(), 1);
        assert_eq!(outcome.status, SourceStatus::Ok { candidates: 1 });
        assert_eq!(outcome.source, "good");
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_failure_becomes_empty() {
        let source = StaticSource::failing("bad", "upstream down");
        let (candidates, outcome) = call_source(&source, 2, Duration::from_secs(5)).await;

        assert!(candidates.is_empty());
        assert_eq!(outcome.priority, 2);
        match outcome.status {
            SourceStatus::Failed { reason } => assert!(reason.contains("upstream down")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_panic_becomes_failure() {
        let source = StaticSource::panicking("broken", "bad record");
        let (candidates, outcome) = call_source(&source, 1, Duration::from_secs(5)).await;

        assert!(candidates.is_empty());
        match outcome.status {
            SourceStatus::Failed { reason } => {
                assert_eq!(reason, "source panicked: bad record")
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_empty() {
        let source = StaticSource::new("slow", vec![pair("AbcBAGS", "p1", 1.0)])
            .with_delay(Duration::from_secs(60));
        let (candidates, outcome) = call_source(&source, 0, Duration::from_secs(2)).await;

        assert!(candidates.is_empty());
        assert!(!outcome.is_ok());
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let outcome = SourceOutcome {
            source: "onchain".into(),
            priority: 2,
            status: SourceStatus::Failed {
                reason: "boom".into(),
            },
            elapsed_ms: 12,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "boom");
        assert_eq!(json["elapsedMs"], 12);
    }
}
