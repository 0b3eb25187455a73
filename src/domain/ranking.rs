//! Ranker
//!
//! Orders canonical tokens by a caller-chosen field and direction. The sort
//! is stable and never mutates its input; ranks are reassigned 1..n to match
//! the output order on every call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::token::Token;

/// Error parsing a sort field, direction or view name
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankingParseError {
    #[error("Unknown sort field: {0}")]
    UnknownField(String),

    #[error("Unknown sort direction: {0}")]
    UnknownDirection(String),

    #[error("Unknown view: {0}")]
    UnknownView(String),
}

/// Field tokens can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    MarketCap,
    /// 24h volume
    Volume,
    Price,
    /// 24h price change
    PriceChange,
    /// Creation time; descending puts the newest first
    Age,
    Liquidity,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::MarketCap => "marketCap",
            SortField::Volume => "volume",
            SortField::Price => "price",
            SortField::PriceChange => "priceChange",
            SortField::Age => "age",
            SortField::Liquidity => "liquidity",
        }
    }

    /// Sort key for a token; missing values compare as 0
    /// Sort key; non-finite values count as 0 and -0.0 equals 0.0
    fn key(&self, token: &Token) -> f64 {
        let value = match self {
            SortField::MarketCap => token.market_cap,
            SortField::Volume => token.volume_24h,
            SortField::Price => token.price,
            SortField::PriceChange => token.price_change_24h,
            SortField::Age => token.created_at.unwrap_or(0) as f64,
            SortField::Liquidity => token.liquidity,
        };
        if value.is_finite() {
            value + 0.0
        } else {
            0.0
        }
    }
}

impl FromStr for SortField {
    type Err = RankingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "marketcap" | "market_cap" | "mcap" => Ok(SortField::MarketCap),
            "volume" | "volume24h" => Ok(SortField::Volume),
            "price" => Ok(SortField::Price),
            "pricechange" | "price_change" | "change" => Ok(SortField::PriceChange),
            "age" | "created" => Ok(SortField::Age),
            "liquidity" | "liq" => Ok(SortField::Liquidity),
            _ => Err(RankingParseError::UnknownField(s.to_string())),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = RankingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(RankingParseError::UnknownDirection(s.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named presentation view, each with a default sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Largest market cap first
    #[default]
    Bonded,
    /// Highest 24h volume first
    Trending,
    /// Newest first
    New,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Bonded => "bonded",
            View::Trending => "trending",
            View::New => "new",
        }
    }

    /// Default sort field for the view
    pub fn default_sort(&self) -> SortField {
        match self {
            View::Bonded => SortField::MarketCap,
            View::Trending => SortField::Volume,
            View::New => SortField::Age,
        }
    }
}

impl FromStr for View {
    type Err = RankingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bonded" => Ok(View::Bonded),
            "trending" => Ok(View::Trending),
            "new" => Ok(View::New),
            _ => Err(RankingParseError::UnknownView(s.to_string())),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return a sorted copy with ranks reassigned 1..n.
///
/// Ties keep their relative input order in both directions.
pub fn rank_tokens(tokens: &[Token], field: SortField, direction: SortDirection) -> Vec<Token> {
    let mut ranked = tokens.to_vec();
    ranked.sort_by(|a, b| {
        let ordering = field.key(a).total_cmp(&field.key(b));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    reassign_ranks(&mut ranked);
    ranked
}

/// Keep tokens matching a free-text query; an empty query keeps everything
pub fn filter_tokens(tokens: &[Token], query: &str) -> Vec<Token> {
    let query = query.trim();
    if query.is_empty() {
        return tokens.to_vec();
    }
    tokens
        .iter()
        .filter(|t| t.matches_query(query))
        .cloned()
        .collect()
}

fn reassign_ranks(tokens: &mut [Token]) {
    for (index, token) in tokens.iter_mut().enumerate() {
        token.rank = index + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::TxnCount;

    fn token(address: &str, market_cap: f64, created_at: Option<i64>) -> Token {
        Token {
            id: format!("pair-{}", address),
            rank: 0,
            name: address.to_uppercase(),
            symbol: address.to_uppercase(),
            address: address.to_string(),
            pair_address: format!("pair-{}", address),
            price: market_cap / 1_000_000.0,
            price_native: 0.0,
            price_change_1h: 0.0,
            price_change_24h: 0.0,
            market_cap,
            fdv: market_cap,
            volume_1h: 0.0,
            volume_24h: market_cap / 10.0,
            liquidity: 0.0,
            txns_24h: TxnCount::default(),
            created_at,
            age: String::new(),
            dex: "meteora".into(),
            chain_id: Some("solana".into()),
            url: String::new(),
            image: None,
            websites: vec![],
            socials: vec![],
            labels: vec![],
        }
    }

    fn addresses(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.address.as_str()).collect()
    }

    #[test]
    fn test_rank_market_cap_desc() {
        let tokens = vec![
            token("abags", 100.0, None),
            token("bbags", 300.0, None),
            token("cbags", 200.0, None),
        ];
        let ranked = rank_tokens(&tokens, SortField::MarketCap, SortDirection::Desc);
        assert_eq!(addresses(&ranked), vec!["bbags", "cbags", "abags"]);
        assert_eq!(ranked.iter().map(|t| t.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
        // input untouched
        assert_eq!(tokens[0].rank, 0);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let tokens = vec![
            token("abags", 100.0, None),
            token("bbags", 100.0, None),
            token("cbags", 50.0, None),
            token("dbags", 100.0, None),
        ];
        let desc = rank_tokens(&tokens, SortField::MarketCap, SortDirection::Desc);
        assert_eq!(addresses(&desc), vec!["abags", "bbags", "dbags", "cbags"]);

        let asc = rank_tokens(&tokens, SortField::MarketCap, SortDirection::Asc);
        assert_eq!(addresses(&asc), vec!["cbags", "abags", "bbags", "dbags"]);
    }

    #[test]
    fn test_signed_zero_ties_keep_input_order() {
        let mut a = token("abags", 1.0, None);
        a.price_change_24h = 0.0;
        let mut b = token("bbags", 1.0, None);
        b.price_change_24h = -0.0;
        let mut c = token("cbags", 1.0, None);
        c.price_change_24h = f64::NAN;
        let tokens = vec![a, b, c];

        let asc = rank_tokens(&tokens, SortField::PriceChange, SortDirection::Asc);
        assert_eq!(addresses(&asc), vec!["abags", "bbags", "cbags"]);

        let desc = rank_tokens(&tokens, SortField::PriceChange, SortDirection::Desc);
        assert_eq!(addresses(&desc), vec!["abags", "bbags", "cbags"]);
    }

    #[test]
    fn test_rank_age_desc_is_newest_first() {
        let tokens = vec![
            token("oldbags", 1.0, Some(1_000)),
            token("nonebags", 1.0, None),
            token("newbags", 1.0, Some(5_000)),
        ];
        let ranked = rank_tokens(&tokens, View::New.default_sort(), SortDirection::Desc);
        assert_eq!(addresses(&ranked), vec!["newbags", "oldbags", "nonebags"]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank_tokens(&[], SortField::Price, SortDirection::Asc).is_empty());
    }

    #[test]
    fn test_view_defaults() {
        assert_eq!(View::Bonded.default_sort(), SortField::MarketCap);
        assert_eq!(View::Trending.default_sort(), SortField::Volume);
        assert_eq!(View::New.default_sort(), SortField::Age);
        assert_eq!(View::default(), View::Bonded);
        assert_eq!(SortDirection::default(), SortDirection::Desc);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("marketCap".parse::<SortField>(), Ok(SortField::MarketCap));
        assert_eq!("priceChange".parse::<SortField>(), Ok(SortField::PriceChange));
        assert_eq!("ASC".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!("trending".parse::<View>(), Ok(View::Trending));
        assert!("holders".parse::<SortField>().is_err());
        assert!("sideways".parse::<SortDirection>().is_err());
        assert!("graduated".parse::<View>().is_err());
    }

    #[test]
    fn test_filter_tokens() {
        let tokens = vec![token("abags", 1.0, None), token("bbags", 2.0, None)];
        assert_eq!(filter_tokens(&tokens, "").len(), 2);
        assert_eq!(filter_tokens(&tokens, "  ").len(), 2);
        assert_eq!(addresses(&filter_tokens(&tokens, "ABAG")), vec!["abags"]);
        assert!(filter_tokens(&tokens, "zzz").is_empty());
    }
}
