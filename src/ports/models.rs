//! Common data structures shared by all ports
//!
//! `PairRecord` is the raw candidate shape produced by every discovery source:
//! a DEX trading pair with a nested base token and assorted market metrics.
//! Every field is optional and numeric fields are coerced on receipt, so the
//! rest of the pipeline never touches untyped JSON.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::token::{Social, TxnCount, Website};

/// Token side of a trading pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairToken {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub symbol: Option<String>,
}

/// Metric sampled over the standard DEX windows
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Windowed {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub m5: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub h1: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub h6: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub h24: Option<f64>,
}

/// Transaction counts over the standard DEX windows
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TxnWindows {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub m5: Option<TxnCount>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub h1: Option<TxnCount>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub h6: Option<TxnCount>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub h24: Option<TxnCount>,
}

/// Pool liquidity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Liquidity {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub usd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub base: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quote: Option<f64>,
}

/// Descriptive pair metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairInfo {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub websites: Vec<Website>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub socials: Vec<Social>,
}

/// Raw candidate record as returned by the pair data provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRecord {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub chain_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub dex_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub pair_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub base_token: Option<PairToken>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub quote_token: Option<PairToken>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_native: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_usd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub txns: Option<TxnWindows>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub volume: Option<Windowed>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub price_change: Option<Windowed>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub liquidity: Option<Liquidity>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fdv: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pair_created_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub info: Option<PairInfo>,
}

impl PairRecord {
    /// Base token mint address, if present and non-empty
    pub fn base_address(&self) -> Option<&str> {
        self.base_token
            .as_ref()
            .and_then(|t| t.address.as_deref())
            .filter(|a| !a.is_empty())
    }

    /// Lowercase dedup key of the base token
    pub fn base_key(&self) -> Option<String> {
        self.base_address().map(str::to_lowercase)
    }

    /// Check whether this pair trades on the given chain
    pub fn is_on_chain(&self, chain_id: &str) -> bool {
        self.chain_id.as_deref() == Some(chain_id)
    }
}

/// Accept a JSON number, a numeric string, or null; anything else is absent
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| value_to_f64(&v)))
}

/// Integer variant of [`lenient_f64`], truncating fractional values
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }))
}

/// Unsigned integer variant, used for lamport amounts sent as strings
pub fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| value_to_u64(&v)))
}

/// An optional value that becomes absent instead of failing the parent record
pub fn lenient_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// A list that tolerates null and drops elements that fail to parse
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

pub(crate) fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_strings_are_coerced() {
        let pair: PairRecord = serde_json::from_value(json!({
            "priceUsd": "0.00123",
            "priceNative": "0.0000081",
            "marketCap": 52000,
            "fdv": "61000.5",
            "pairCreatedAt": 1760000000000i64
        }))
        .unwrap();

        assert_eq!(pair.price_usd, Some(0.00123));
        assert_eq!(pair.price_native, Some(0.0000081));
        assert_eq!(pair.market_cap, Some(52000.0));
        assert_eq!(pair.fdv, Some(61000.5));
        assert_eq!(pair.pair_created_at, Some(1_760_000_000_000));
    }

    #[test]
    fn test_garbage_becomes_absent() {
        let pair: PairRecord = serde_json::from_value(json!({
            "priceUsd": "not a number",
            "marketCap": null,
            "fdv": {"nested": true},
            "labels": null,
            "volume": {"h24": "NaN", "h1": 10}
        }))
        .unwrap();

        assert_eq!(pair.price_usd, None);
        assert_eq!(pair.market_cap, None);
        assert_eq!(pair.fdv, None);
        assert!(pair.labels.is_empty());
        let volume = pair.volume.unwrap();
        assert_eq!(volume.h24, None);
        assert_eq!(volume.h1, Some(10.0));
    }

    #[test]
    fn test_base_address_and_key() {
        let pair: PairRecord = serde_json::from_value(json!({
            "baseToken": {"address": "AbcBAGS", "name": "A", "symbol": "A"}
        }))
        .unwrap();
        assert_eq!(pair.base_address(), Some("AbcBAGS"));
        assert_eq!(pair.base_key().as_deref(), Some("abcbags"));

        let empty: PairRecord = serde_json::from_value(json!({
            "baseToken": {"address": ""}
        }))
        .unwrap();
        assert_eq!(empty.base_address(), None);
        assert_eq!(PairRecord::default().base_address(), None);
    }

    #[test]
    fn test_malformed_nested_fields_do_not_fail_record() {
        let pair: PairRecord = serde_json::from_value(json!({
            "chainId": 7,
            "baseToken": "oops",
            "txns": {"h24": {"buys": "many"}},
            "pairAddress": "PairX"
        }))
        .unwrap();
        assert_eq!(pair.chain_id, None);
        assert_eq!(pair.base_token, None);
        assert_eq!(pair.txns.unwrap().h24, None);
        assert_eq!(pair.pair_address.as_deref(), Some("PairX"));
    }

    #[test]
    fn test_malformed_socials_are_dropped() {
        let pair: PairRecord = serde_json::from_value(json!({
            "info": {
                "imageUrl": "https://img",
                "socials": [{"type": "twitter", "url": "https://x.com/a"}, 42],
                "websites": "oops"
            }
        }))
        .unwrap();
        let info = pair.info.unwrap();
        assert_eq!(info.socials.len(), 1);
        assert_eq!(info.socials[0].kind.as_deref(), Some("twitter"));
        assert!(info.websites.is_empty());
    }
}
