//! Normalizer
//!
//! Maps raw pair records into the canonical `Token` schema. Total: missing
//! or malformed numbers become 0, missing strings become placeholders, and a
//! missing timestamp yields a null `created_at` with an "Unknown" age.

use chrono::{DateTime, Utc};

use super::token::{format_age, Token, UNKNOWN_AGE, UNKNOWN_NAME, UNKNOWN_SYMBOL};
use crate::ports::models::PairRecord;

/// Fallback DEX label
const UNKNOWN_DEX: &str = "Unknown";

/// Map one raw pair to a canonical token, ranked 1
pub fn normalize(pair: &PairRecord, now: DateTime<Utc>) -> Token {
    let base = pair.base_token.clone().unwrap_or_default();
    let pair_address = pair.pair_address.clone().unwrap_or_default();
    let chain_id = pair.chain_id.clone();

    let volume = pair.volume.unwrap_or_default();
    let price_change = pair.price_change.unwrap_or_default();
    let info = pair.info.clone().unwrap_or_default();

    let fdv = finite(pair.fdv);
    // zero market cap falls back to fdv as well as a missing one
    let market_cap = match finite(pair.market_cap) {
        mc if mc != 0.0 => mc,
        _ => fdv,
    };

    let created_at = pair.pair_created_at;
    let age = created_at
        .map(|ts| format_age(ts, now))
        .unwrap_or_else(|| UNKNOWN_AGE.to_string());

    let url = pair.url.clone().filter(|u| !u.is_empty()).unwrap_or_else(|| {
        format!(
            "https://dexscreener.com/{}/{}",
            chain_id.as_deref().unwrap_or_default(),
            pair_address
        )
    });

    Token {
        id: pair_address.clone(),
        rank: 1,
        name: non_empty(base.name).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        symbol: non_empty(base.symbol).unwrap_or_else(|| UNKNOWN_SYMBOL.to_string()),
        address: base.address.unwrap_or_default(),
        pair_address,
        price: finite(pair.price_usd),
        price_native: finite(pair.price_native),
        price_change_1h: finite(price_change.h1),
        price_change_24h: finite(price_change.h24),
        market_cap,
        fdv,
        volume_1h: finite(volume.h1),
        volume_24h: finite(volume.h24),
        liquidity: finite(pair.liquidity.and_then(|l| l.usd)),
        txns_24h: pair.txns.and_then(|t| t.h24).unwrap_or_default(),
        created_at,
        age,
        dex: non_empty(pair.dex_id.clone()).unwrap_or_else(|| UNKNOWN_DEX.to_string()),
        chain_id,
        url,
        image: non_empty(info.image_url),
        websites: info.websites,
        socials: info.socials,
        labels: pair.labels.clone(),
    }
}

fn finite(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_760_000_000_000).unwrap()
    }

    fn full_pair() -> PairRecord {
        serde_json::from_value(json!({
            "chainId": "solana",
            "dexId": "meteora",
            "url": "https://dexscreener.com/solana/pair1",
            "pairAddress": "pair1",
            "labels": ["DYN2"],
            "baseToken": {"address": "CxWPdDBqxVo3fnTMRTvNuSrd4gkp78udSrFvkVDBAGS", "name": "Money Bags", "symbol": "MBAG"},
            "quoteToken": {"address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL"},
            "priceNative": "0.00000412",
            "priceUsd": "0.000812",
            "txns": {"h24": {"buys": 120, "sells": 80}},
            "volume": {"h1": 1500.5, "h24": 42000},
            "priceChange": {"h1": -2.5, "h24": 13.75},
            "liquidity": {"usd": 18000.25},
            "fdv": 812000,
            "marketCap": 790000,
            "pairCreatedAt": 1_760_000_000_000i64 - 3 * 3_600_000,
            "info": {
                "imageUrl": "https://cdn/img.png",
                "websites": [{"label": "Website", "url": "https://moneybags.xyz"}],
                "socials": [{"type": "twitter", "url": "https://x.com/moneybags"}]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_full_record() {
        let token = normalize(&full_pair(), now());

        assert_eq!(token.id, "pair1");
        assert_eq!(token.name, "Money Bags");
        assert_eq!(token.symbol, "MBAG");
        assert_eq!(token.address, "CxWPdDBqxVo3fnTMRTvNuSrd4gkp78udSrFvkVDBAGS");
        assert_relative_eq!(token.price, 0.000812);
        assert_relative_eq!(token.price_native, 0.00000412);
        assert_relative_eq!(token.price_change_1h, -2.5);
        assert_relative_eq!(token.price_change_24h, 13.75);
        assert_relative_eq!(token.market_cap, 790000.0);
        assert_relative_eq!(token.fdv, 812000.0);
        assert_relative_eq!(token.volume_1h, 1500.5);
        assert_relative_eq!(token.volume_24h, 42000.0);
        assert_relative_eq!(token.liquidity, 18000.25);
        assert_eq!(token.txns_24h.buys, 120);
        assert_eq!(token.txns_24h.sells, 80);
        assert_eq!(token.age, "3h");
        assert_eq!(token.dex, "meteora");
        assert_eq!(token.chain_id.as_deref(), Some("solana"));
        assert_eq!(token.image.as_deref(), Some("https://cdn/img.png"));
        assert_eq!(token.websites.len(), 1);
        assert_eq!(token.socials.len(), 1);
        assert_eq!(token.labels, vec!["DYN2".to_string()]);
    }

    #[test]
    fn test_normalize_empty_record_uses_defaults() {
        let token = normalize(&PairRecord::default(), now());

        assert_eq!(token.name, "Unknown");
        assert_eq!(token.symbol, "???");
        assert_eq!(token.address, "");
        assert_eq!(token.price, 0.0);
        assert_eq!(token.market_cap, 0.0);
        assert_eq!(token.created_at, None);
        assert_eq!(token.age, "Unknown");
        assert_eq!(token.dex, "Unknown");
        assert_eq!(token.url, "https://dexscreener.com//");
        assert!(token.image.is_none());
    }

    #[test]
    fn test_market_cap_falls_back_to_fdv() {
        let mut pair = full_pair();
        pair.market_cap = None;
        assert_relative_eq!(normalize(&pair, now()).market_cap, 812000.0);

        pair.market_cap = Some(0.0);
        assert_relative_eq!(normalize(&pair, now()).market_cap, 812000.0);

        pair.fdv = None;
        assert_eq!(normalize(&pair, now()).market_cap, 0.0);
    }

    #[test]
    fn test_missing_url_is_derived() {
        let mut pair = full_pair();
        pair.url = None;
        assert_eq!(
            normalize(&pair, now()).url,
            "https://dexscreener.com/solana/pair1"
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let pair = full_pair();
        assert_eq!(normalize(&pair, now()), normalize(&pair.clone(), now()));
    }

    #[test]
    fn test_extreme_timestamps_do_not_panic() {
        let mut pair = full_pair();
        pair.pair_created_at = Some(i64::MIN);
        let token = normalize(&pair, now());
        assert_eq!(token.created_at, Some(i64::MIN));
        assert!(token.age.ends_with("mo"));

        pair.pair_created_at = Some(i64::MAX);
        let token = normalize(&pair, now());
        assert!(token.age.ends_with('m'));
    }
}
