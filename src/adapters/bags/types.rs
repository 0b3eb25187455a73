//! Bags API Types

use serde::Deserialize;
use serde_json::Value;

/// Response envelope used by every Bags endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BagsEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BagsEnvelope {
    /// The payload when the call succeeded and carried one
    pub fn into_payload(self) -> Option<Value> {
        if !self.success {
            return None;
        }
        self.response.filter(|v| !v.is_null())
    }
}

/// Bags token-launch endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BagsEndpoint {
    LifetimeFees,
    Creator,
    ClaimStats,
}

impl BagsEndpoint {
    /// Path below the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            BagsEndpoint::LifetimeFees => "/token-launch/lifetime-fees",
            BagsEndpoint::Creator => "/token-launch/creator/v3",
            BagsEndpoint::ClaimStats => "/token-launch/claim-stats",
        }
    }

    /// Parse the proxy route segment
    pub fn from_route(route: &str) -> Option<Self> {
        match route {
            "lifetime-fees" => Some(BagsEndpoint::LifetimeFees),
            "creator" => Some(BagsEndpoint::Creator),
            "claim-stats" => Some(BagsEndpoint::ClaimStats),
            _ => None,
        }
    }
}
