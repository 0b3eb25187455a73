//! DexScreener Adapter
//!
//! Pair data provider backed by the public DexScreener API:
//! - `GET /latest/dex/search?q=` for free-text pair search
//! - `GET /tokens/v1/{chain}/{a,b,...}` for up to 30 token addresses at once
//!
//! Responses are parsed leniently: a malformed pair is dropped on its own
//! without failing the rest of the response.

mod client;

pub use client::{DexScreenerClient, DexScreenerConfig, MAX_ADDRESSES_PER_REQUEST};

#[cfg(test)]
mod contract_tests;
