//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Pair data (DEX market data by search or token address)
//! - Chain RPC (asset index, program signatures, transaction balances)
//! - Launchpad (creator and fee data)
//! - Candidate sources (discovery strategies)

pub mod chain_rpc;
pub mod launchpad;
pub mod mocks;
pub mod models;
pub mod pair_data;
pub mod source;

// Re-export main traits and types
pub use chain_rpc::{ChainRpcPort, RpcError};
pub use launchpad::{LaunchpadError, LaunchpadPort};
pub use models::{PairRecord, PairToken};
pub use pair_data::{PairDataError, PairDataPort};
pub use source::{CandidateSource, SourceError};
