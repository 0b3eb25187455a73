//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - DexScreener: pair search and batched token lookups
//! - Helius: JSON-RPC for asset search, signatures and transactions
//! - Bags: launchpad fee, creator and claim data
//! - Sources: the discovery strategies built on the clients above
//! - CLI: Command-line interface handlers

pub mod bags;
pub mod cli;
pub mod dexscreener;
pub mod helius;
pub mod sources;

pub use bags::BagsClient;
pub use cli::CliApp;
pub use dexscreener::DexScreenerClient;
pub use helius::HeliusClient;
