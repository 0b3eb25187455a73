//! Canonical Token
//!
//! The deduplicated, normalized record representing one discoverable token,
//! keyed by its chain address. Rebuilt from scratch on every discovery cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder name for tokens without metadata
pub const UNKNOWN_NAME: &str = "Unknown";
/// Placeholder symbol for tokens without metadata
pub const UNKNOWN_SYMBOL: &str = "???";
/// Age string for tokens without a creation timestamp
pub const UNKNOWN_AGE: &str = "Unknown";

const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_DAY: i64 = 86_400_000;

/// Website link attached to a pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Website {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Social link attached to a pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Social {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Buy/sell counts over a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnCount {
    #[serde(default)]
    pub buys: u64,
    #[serde(default)]
    pub sells: u64,
}

/// Canonical token record served to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Pair address used as the row identifier
    pub id: String,
    /// 1-based position in the current sort order (not an identity)
    pub rank: usize,
    pub name: String,
    pub symbol: String,
    /// Token mint address, the dedup key
    pub address: String,
    pub pair_address: String,
    /// Price in USD
    pub price: f64,
    /// Price in the quote token
    pub price_native: f64,
    pub price_change_1h: f64,
    pub price_change_24h: f64,
    pub market_cap: f64,
    pub fdv: f64,
    pub volume_1h: f64,
    pub volume_24h: f64,
    /// Liquidity in USD
    pub liquidity: f64,
    #[serde(rename = "txns24h")]
    pub txns_24h: TxnCount,
    /// Pair creation time, unix milliseconds
    pub created_at: Option<i64>,
    /// Display age bucket ("42m", "3h", "12d", "2mo")
    pub age: String,
    pub dex: String,
    pub chain_id: Option<String>,
    pub url: String,
    pub image: Option<String>,
    pub websites: Vec<Website>,
    pub socials: Vec<Social>,
    pub labels: Vec<String>,
}

impl Token {
    /// Lowercase dedup key
    pub fn key(&self) -> String {
        self.address.to_lowercase()
    }

    /// Case-insensitive substring match over name, symbol and address
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.symbol.to_lowercase().contains(&query)
            || self.address.to_lowercase().contains(&query)
    }
}

/// Bucket the elapsed time since `created_at_ms` into a display string.
///
/// Floor division throughout: under an hour renders minutes, under a day
/// hours, under 30 days days, otherwise whole 30-day months.
pub fn format_age(created_at_ms: i64, now: DateTime<Utc>) -> String {
    let diff_ms = now.timestamp_millis().saturating_sub(created_at_ms);
    let minutes = diff_ms.div_euclid(MS_PER_MINUTE);
    let hours = diff_ms.div_euclid(MS_PER_HOUR);
    let days = diff_ms.div_euclid(MS_PER_DAY);

    if minutes < 60 {
        format!("{}m", minutes)
    } else if hours < 24 {
        format!("{}h", hours)
    } else if days < 30 {
        format!("{}d", days)
    } else {
        format!("{}mo", days.div_euclid(30))
    }
}
