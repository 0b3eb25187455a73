//! Launchpad fee data
//!
//! Creator, claim and lifetime-fee records reported by the Bags launchpad,
//! and the shaping that joins them into a per-wallet fee recipient list.

use serde::{Deserialize, Serialize};

use super::format::truncate_address;
use super::known_programs::LAMPORTS_PER_SOL;
use super::token::Token;
use crate::ports::models::{lenient_opt, lenient_u64};

/// Display name used when a creator has neither a username nor a wallet
pub const UNKNOWN_CREATOR: &str = "Unknown";

/// Provider label for recipients without a social login
const WALLET_PROVIDER: &str = "wallet";

/// Total fees a token has generated since launch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifetimeFees {
    pub lamports: u64,
    pub sol: f64,
}

impl LifetimeFees {
    pub fn from_lamports(lamports: u64) -> Self {
        Self {
            lamports,
            sol: lamports as f64 / LAMPORTS_PER_SOL,
        }
    }
}

/// Creator or fee-share recipient of a launched token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorRecord {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub wallet: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub pfp: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub provider_username: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub twitter_username: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub royalty_bps: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub is_creator: Option<bool>,
}

impl CreatorRecord {
    /// Provider username, falling back to the twitter handle
    pub fn social_username(&self) -> Option<&str> {
        self.provider_username
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.twitter_username.as_deref().filter(|u| !u.is_empty()))
    }

    pub fn is_creator(&self) -> bool {
        self.is_creator.unwrap_or(false)
    }
}

/// Claimed fee total for one wallet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStat {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub wallet: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_claimed: Option<u64>,
}

/// Fee recipient row joining a creator record with its claim stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecipient {
    pub wallet: Option<String>,
    pub display_name: String,
    pub pfp: Option<String>,
    pub provider: String,
    pub royalty_bps: u64,
    /// Share of fees in percent (royalty bps / 100)
    pub percentage: f64,
    pub is_creator: bool,
    pub total_claimed: u64,
    pub total_claimed_sol: f64,
}

/// A token plus its launchpad fee data; each lookup is null when it failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetails {
    #[serde(flatten)]
    pub token: Token,
    pub lifetime_fees: Option<LifetimeFees>,
    pub creators: Option<Vec<CreatorRecord>>,
    pub claim_stats: Option<Vec<ClaimStat>>,
    /// The record flagged as creator, or the first one
    pub creator: Option<CreatorRecord>,
    pub creator_name: String,
    pub fee_recipients: Vec<FeeRecipient>,
}

impl TokenDetails {
    pub fn new(
        token: Token,
        lifetime_fees: Option<LifetimeFees>,
        creators: Option<Vec<CreatorRecord>>,
        claim_stats: Option<Vec<ClaimStat>>,
    ) -> Self {
        let creators_slice = creators.as_deref().unwrap_or_default();
        let creator = find_creator(creators_slice).cloned();
        let creator_name = creator_display_name(creator.as_ref());
        let fee_recipients =
            format_fee_recipients(creators_slice, claim_stats.as_deref().unwrap_or_default());

        Self {
            token,
            lifetime_fees,
            creators,
            claim_stats,
            creator,
            creator_name,
            fee_recipients,
        }
    }
}

/// The record flagged `isCreator`, otherwise the first record
pub fn find_creator(creators: &[CreatorRecord]) -> Option<&CreatorRecord> {
    creators
        .iter()
        .find(|c| c.is_creator())
        .or_else(|| creators.first())
}

/// `@username` when a social login exists, else the truncated wallet
pub fn creator_display_name(creator: Option<&CreatorRecord>) -> String {
    let Some(creator) = creator else {
        return UNKNOWN_CREATOR.to_string();
    };
    if let Some(username) = creator.social_username() {
        return format!("@{}", username);
    }
    match creator.wallet.as_deref().filter(|w| !w.is_empty()) {
        Some(wallet) => truncate_address(wallet, 4, 4),
        None => UNKNOWN_CREATOR.to_string(),
    }
}

/// Join creator records with claim stats by wallet
pub fn format_fee_recipients(creators: &[CreatorRecord], claims: &[ClaimStat]) -> Vec<FeeRecipient> {
    creators
        .iter()
        .map(|recipient| {
            let total_claimed = recipient
                .wallet
                .as_deref()
                .and_then(|wallet| {
                    // later entries for the same wallet win
                    claims
                        .iter()
                        .rev()
                        .find(|c| c.wallet.as_deref() == Some(wallet))
                })
                .and_then(|c| c.total_claimed)
                .unwrap_or(0);
            let royalty_bps = recipient.royalty_bps.unwrap_or(0);
            let display_name = match recipient.social_username() {
                Some(username) => format!("@{}", username),
                None => truncate_address(recipient.wallet.as_deref().unwrap_or_default(), 4, 4),
            };

            FeeRecipient {
                wallet: recipient.wallet.clone(),
                display_name,
                pfp: recipient.pfp.clone(),
                provider: recipient
                    .provider
                    .clone()
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| WALLET_PROVIDER.to_string()),
                royalty_bps,
                percentage: royalty_bps as f64 / 100.0,
                is_creator: recipient.is_creator(),
                total_claimed,
                total_claimed_sol: total_claimed as f64 / LAMPORTS_PER_SOL,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn creators() -> Vec<CreatorRecord> {
        serde_json::from_value(json!([
            {
                "wallet": "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin",
                "provider": "twitter",
                "twitterUsername": "feeshare",
                "royaltyBps": 2500,
                "isCreator": false
            },
            {
                "wallet": "7YttLkHDoNj9wyDur5pM1ejNaAvT9X4eqaYcHQqtj2G5",
                "providerUsername": "launcher",
                "royaltyBps": "7500",
                "isCreator": true
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_lifetime_fees_conversion() {
        let fees = LifetimeFees::from_lamports(2_500_000_000);
        assert_eq!(fees.lamports, 2_500_000_000);
        assert_relative_eq!(fees.sol, 2.5);
    }

    #[test]
    fn test_find_creator_prefers_flag() {
        let creators = creators();
        let creator = find_creator(&creators).unwrap();
        assert_eq!(creator.provider_username.as_deref(), Some("launcher"));
    }

    #[test]
    fn test_find_creator_falls_back_to_first() {
        let mut creators = creators();
        creators[1].is_creator = Some(false);
        let creator = find_creator(&creators).unwrap();
        assert_eq!(creator.twitter_username.as_deref(), Some("feeshare"));
        assert!(find_creator(&[]).is_none());
    }

    #[test]
    fn test_creator_display_name() {
        let creators = creators();
        assert_eq!(creator_display_name(Some(&creators[1])), "@launcher");

        let wallet_only = CreatorRecord {
            wallet: Some("7YttLkHDoNj9wyDur5pM1ejNaAvT9X4eqaYcHQqtj2G5".into()),
            ..Default::default()
        };
        assert_eq!(creator_display_name(Some(&wallet_only)), "7Ytt...j2G5");
        assert_eq!(creator_display_name(Some(&CreatorRecord::default())), "Unknown");
        assert_eq!(creator_display_name(None), "Unknown");
    }

    #[test]
    fn test_format_fee_recipients_joins_claims() {
        let claims: Vec<ClaimStat> = serde_json::from_value(json!([
            {"wallet": "7YttLkHDoNj9wyDur5pM1ejNaAvT9X4eqaYcHQqtj2G5", "totalClaimed": "1500000000"}
        ]))
        .unwrap();

        let recipients = format_fee_recipients(&creators(), &claims);
        assert_eq!(recipients.len(), 2);

        let share = &recipients[0];
        assert_eq!(share.display_name, "@feeshare");
        assert_eq!(share.provider, "twitter");
        assert_relative_eq!(share.percentage, 25.0);
        assert_eq!(share.total_claimed, 0);
        assert!(!share.is_creator);

        let launcher = &recipients[1];
        assert_eq!(launcher.display_name, "@launcher");
        assert_eq!(launcher.provider, "wallet");
        assert_eq!(launcher.royalty_bps, 7500);
        assert_relative_eq!(launcher.percentage, 75.0);
        assert_eq!(launcher.total_claimed, 1_500_000_000);
        assert_relative_eq!(launcher.total_claimed_sol, 1.5);
        assert!(launcher.is_creator);
    }
}
