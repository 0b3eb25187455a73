//! Known-address book
//!
//! Ordered, case-insensitively unique set of token mints that the
//! known-address source resolves on every cycle. Seeded from configuration,
//! then grown by on-chain discovery and by user additions. Shared between
//! sources and the discovery service behind an async lock.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    ordered: Vec<String>,
    seen: HashSet<String>,
}

/// Shared known-address list
#[derive(Debug, Clone, Default)]
pub struct KnownAddressBook {
    inner: Arc<RwLock<Inner>>,
}

impl KnownAddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book pre-populated with the given addresses
    pub fn seeded<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inner = Inner::default();
        for address in addresses {
            insert(&mut inner, address.as_ref());
        }
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Record addresses, returning the ones that were not already known
    pub async fn extend<I, S>(&self, addresses: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inner = self.inner.write().await;
        addresses
            .into_iter()
            .filter_map(|a| insert(&mut inner, a.as_ref()))
            .collect()
    }

    /// Snapshot in insertion order
    pub async fn snapshot(&self) -> Vec<String> {
        self.inner.read().await.ordered.clone()
    }

    pub async fn contains(&self, address: &str) -> bool {
        self.inner
            .read()
            .await
            .seen
            .contains(&address.trim().to_lowercase())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.ordered.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn insert(inner: &mut Inner, address: &str) -> Option<String> {
    let address = address.trim();
    if address.is_empty() {
        return None;
    }
    if inner.seen.insert(address.to_lowercase()) {
        inner.ordered.push(address.to_string());
        Some(address.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_dedups_case_insensitively() {
        let book = KnownAddressBook::seeded(["AbcBAGS", "abcbags", "DefBAGS", ""]);
        assert_eq!(book.snapshot().await, vec!["AbcBAGS", "DefBAGS"]);
        assert_eq!(book.len().await, 2);
    }

    #[tokio::test]
    async fn test_extend_returns_only_new_addresses() {
        let book = KnownAddressBook::seeded(["AbcBAGS"]);
        let added = book.extend(vec![" ABCBAGS ", "XyzBAGS", "XyzBAGS"]).await;

        assert_eq!(added, vec!["XyzBAGS".to_string()]);
        assert_eq!(book.snapshot().await, vec!["AbcBAGS", "XyzBAGS"]);
        assert!(book.contains("xyzbags").await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let book = KnownAddressBook::new();
        assert!(book.is_empty().await);

        let other = book.clone();
        other.extend(["NewBAGS"]).await;
        assert!(book.contains("NEWBAGS").await);
    }
}
