//! Application Layer - Discovery orchestration
//!
//! - `resilient`: timeout-bounded source calls with tagged outcomes
//! - `aggregator`: concurrent fan-out, priority merge and dedup
//! - `discovery`: snapshot owner, single-flight refresh and polling loop

pub mod aggregator;
pub mod discovery;
pub mod resilient;

pub use aggregator::{
    AggregateReport, Aggregator, COMMON_NAME_PRIORITY, KEYWORD_PRIORITY, KNOWN_ADDRESS_PRIORITY,
    ONCHAIN_PRIORITY,
};
pub use discovery::{
    AddOutcome, DiscoveryError, DiscoveryService, RejectedAddress, ServiceStatus, ViewQuery,
};
pub use resilient::{call_source, SourceOutcome, SourceStatus};
