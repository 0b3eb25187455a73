//! DexScreener API Contract Tests
//!
//! Golden response fixture tests for the search and token lookup endpoints.
//! These tests verify that recorded API responses match the fields the
//! discovery pipeline relies on.
//!
//! Fixtures are immutable once committed - any changes require explicit justification.

#[cfg(test)]
mod search_contract_tests {
    use regex::Regex;
    use serde_json::Value;

    use crate::adapters::dexscreener::client::parse_pair_list;
    use crate::domain::normalizer::normalize;
    use crate::domain::suffix::SuffixFilter;

    fn load_fixture(name: &str) -> Value {
        let fixture_path = format!(
            "{}/fixtures/dexscreener/{}.json",
            env!("CARGO_MANIFEST_DIR"),
            name
        );
        let content = std::fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
            panic!(
                "CONTRACT VIOLATION: Failed to load fixture '{}': {}",
                fixture_path, e
            )
        });
        serde_json::from_str(&content).unwrap_or_else(|e| {
            panic!(
                "CONTRACT VIOLATION: Failed to parse fixture '{}' as JSON: {}",
                fixture_path, e
            )
        })
    }

    fn base58_pattern() -> Regex {
        Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").unwrap()
    }

    #[test]
    fn test_search_response_has_pairs_array() {
        let fixture = load_fixture("search_bags");
        assert!(
            fixture.get("pairs").map(Value::is_array).unwrap_or(false),
            "CONTRACT VIOLATION: Field 'pairs' must be an array in search response"
        );
    }

    #[test]
    fn test_search_pair_required_fields_present() {
        let fixture = load_fixture("search_bags");
        let required_fields = [
            "chainId",
            "dexId",
            "url",
            "pairAddress",
            "baseToken",
            "quoteToken",
            "priceUsd",
            "pairCreatedAt",
        ];

        for pair in fixture["pairs"].as_array().unwrap() {
            for field in required_fields {
                assert!(
                    pair.get(field).is_some(),
                    "CONTRACT VIOLATION: Field '{}' is missing from search pair {}",
                    field,
                    pair["pairAddress"]
                );
            }
            assert!(
                pair["priceUsd"].is_string(),
                "CONTRACT VIOLATION: 'priceUsd' is expected as a numeric string"
            );
        }
    }

    #[test]
    fn test_solana_addresses_are_base58() {
        let pattern = base58_pattern();
        let fixture = load_fixture("search_bags");

        for pair in fixture["pairs"].as_array().unwrap() {
            if pair["chainId"] != "solana" {
                continue;
            }
            let address = pair["baseToken"]["address"].as_str().unwrap();
            assert!(
                pattern.is_match(address),
                "CONTRACT VIOLATION: Solana base token address '{}' is not base58",
                address
            );
        }
    }

    #[test]
    fn test_search_fixture_parses_and_filters() {
        let pairs = parse_pair_list(load_fixture("search_bags"));
        assert_eq!(pairs.len(), 3);

        let filter = SuffixFilter::default();
        let in_scope: Vec<_> = pairs
            .iter()
            .filter(|p| p.is_on_chain("solana") && filter.matches_opt(p.base_address()))
            .collect();

        // the ethereum pair carries the marker but is on the wrong chain
        assert_eq!(in_scope.len(), 1);
        assert_eq!(
            in_scope[0].base_address(),
            Some("CxWPdDBqxVo3fnTMRTvNuSrd4gkp78udSrFvkVDBAGS")
        );
    }

    #[test]
    fn test_tokens_v1_is_bare_array() {
        let fixture = load_fixture("tokens_v1");
        assert!(
            fixture.is_array(),
            "CONTRACT VIOLATION: token lookup response must be a bare array"
        );
        let pairs = parse_pair_list(fixture);
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_tokens_v1_normalizes_with_fdv_fallback() {
        let pairs = parse_pair_list(load_fixture("tokens_v1"));
        let now = chrono::DateTime::from_timestamp_millis(1_760_000_000_000).unwrap();

        // first pair has no marketCap, second reports 0
        let first = normalize(&pairs[0], now);
        assert_eq!(first.market_cap, 55210.0);
        assert_eq!(first.socials.len(), 1);

        let second = normalize(&pairs[1], now);
        assert_eq!(second.market_cap, 1792.0);
        assert_eq!(second.image, None);
    }
}
