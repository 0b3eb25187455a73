//! Bags Index - token discovery and ranking library
//!
//! Discovers Bags launchpad tokens from several independent sources, merges
//! and deduplicates them into canonical records and serves ranked views.
//!
//! # Modules
//!
//! - `domain`: Core types and pure logic (Token, normalizer, ranker, suffix filter)
//! - `ports`: Trait abstractions (PairDataPort, ChainRpcPort, LaunchpadPort, CandidateSource)
//! - `adapters`: External implementations (DexScreener, Helius, Bags, sources, CLI)
//! - `application`: Aggregator and discovery service
//! - `server`: HTTP API, forwarding proxy and static files
//! - `config`: Configuration loading and validation

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;
