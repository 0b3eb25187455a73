//! Helius Adapter
//!
//! Chain RPC backed by a Helius endpoint. The endpoint URL embeds the API
//! key, so it is read from `HELIUS_RPC_URL` rather than the config file.

mod client;
mod types;

pub use client::{HeliusClient, HeliusConfig};
