//! Candidate source port
//!
//! Every discovery strategy implements `CandidateSource`. Sources are free to
//! fail; the aggregator wraps each call and turns failures into an empty
//! contribution.

use async_trait::async_trait;
use thiserror::Error;

use super::chain_rpc::RpcError;
use super::models::PairRecord;
use super::pair_data::PairDataError;

/// Source failure
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Pair data error: {0}")]
    PairData(#[from] PairDataError),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Other(String),
}

/// Independent strategy producing raw candidate pairs
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Short stable name used in logs and status reports
    fn name(&self) -> &str;

    /// Produce candidates; may be empty, may fail
    async fn fetch_candidates(&self) -> Result<Vec<PairRecord>, SourceError>;
}
