//! Naming-Suffix Predicate
//!
//! A token address is in scope if and only if it ends, case-insensitively,
//! with a fixed marker string (`bags` for the Bags launchpad). The predicate
//! is applied at every source, again at the merge step, and when validating
//! user-supplied addresses.

use serde::{Deserialize, Serialize};

/// Default marker carried by Bags token mints
pub const DEFAULT_MARKER: &str = "bags";

/// Length of a decoded Solana public key
const PUBKEY_LEN: usize = 32;

/// Case-insensitive address suffix filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixFilter {
    /// Marker stored lowercase
    marker: String,
}

impl SuffixFilter {
    /// Create a filter for the given marker
    pub fn new(marker: impl AsRef<str>) -> Self {
        Self {
            marker: marker.as_ref().to_lowercase(),
        }
    }

    /// The lowercase marker
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Check whether an address carries the marker
    pub fn matches(&self, address: &str) -> bool {
        !address.is_empty() && address.to_lowercase().ends_with(&self.marker)
    }

    /// Check an optional address, treating a missing one as out of scope
    pub fn matches_opt(&self, address: Option<&str>) -> bool {
        address.map(|a| self.matches(a)).unwrap_or(false)
    }
}

impl Default for SuffixFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

/// Check that an address decodes as a base58 32-byte Solana public key
pub fn is_valid_address(address: &str) -> bool {
    match bs58::decode(address).into_vec() {
        Ok(bytes) => bytes.len() == PUBKEY_LEN,
        Err(_) => false,
    }
}
