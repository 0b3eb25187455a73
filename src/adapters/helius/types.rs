//! Helius RPC Types
//!
//! JSON-RPC envelopes and the slices of `searchAssets`,
//! `getSignaturesForAddress` and `getTransaction` results used by discovery.

use serde::Deserialize;

/// JSON-RPC response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorBody>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}

/// `searchAssets` result page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetPage {
    #[serde(default)]
    pub items: Vec<AssetItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetItem {
    pub id: Option<String>,
}

/// One entry of `getSignaturesForAddress`
#[derive(Debug, Clone, Deserialize)]
pub struct SignatureInfo {
    pub signature: String,
}

/// `getTransaction` result, reduced to token balances
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionResult {
    pub meta: Option<TransactionMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default)]
    pub post_token_balances: Option<Vec<TokenBalance>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenBalance {
    pub mint: Option<String>,
}

impl TransactionResult {
    /// Mints in the post-token balances, in order
    pub fn post_balance_mints(&self) -> Vec<String> {
        self.meta
            .as_ref()
            .and_then(|m| m.post_token_balances.as_ref())
            .map(|balances| balances.iter().filter_map(|b| b.mint.clone()).collect())
            .unwrap_or_default()
    }
}
