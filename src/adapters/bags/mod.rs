//! Bags Adapter
//!
//! Launchpad port backed by the Bags public API (`token-launch/*`
//! endpoints). Requires `BAGS_API_KEY`.

mod client;
mod types;

pub use client::{BagsClient, BagsConfig};
pub use types::{BagsEndpoint, BagsEnvelope};
