//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching
//! config/default.toml. Every section has defaults so a partial file is
//! enough; secrets are read from the environment first.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::domain::known_programs::{
    BAGS_CREATOR_PROGRAM, DEFAULT_COMMON_NAMES, DEFAULT_SEARCH_TERMS, METEORA_DBC_PROGRAM,
    SEED_TOKEN_ADDRESSES,
};
use crate::domain::suffix::DEFAULT_MARKER;

/// Environment variable holding the launchpad API key
pub const BAGS_API_KEY_ENV: &str = "BAGS_API_KEY";
/// Environment variable holding the full Helius RPC URL (with its key)
pub const HELIUS_RPC_URL_ENV: &str = "HELIUS_RPC_URL";
/// Environment variable holding the Jupiter API key
pub const JUPITER_API_KEY_ENV: &str = "JUPITER_API_KEY";

/// Main configuration structure matching config/default.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub discovery: DiscoverySection,
    pub onchain: OnChainSection,
    pub dexscreener: DexScreenerSection,
    pub helius: HeliusSection,
    pub bags: BagsSection,
    pub jupiter: JupiterSection,
    pub logging: LoggingSection,
}

/// HTTP server section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Directory served for non-API paths; `~` is expanded
    pub static_dir: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: "./public".to_string(),
        }
    }
}

impl ServerSection {
    /// Static directory with `~` and env vars expanded
    pub fn static_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.static_dir).into_owned())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Discovery pipeline section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// Address suffix marking in-scope tokens
    pub suffix: String,
    pub chain_id: String,
    pub poll_interval_secs: u64,
    /// Age under which a view is served from the last result
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub source_timeout_secs: u64,
    pub search_terms: Vec<String>,
    pub common_names: Vec<String>,
    pub common_name_limit: usize,
    pub common_name_delay_ms: u64,
    /// Seed list for the known-address book
    pub known_addresses: Vec<String>,
    pub address_batch_size: usize,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_MARKER.to_string(),
            chain_id: "solana".to_string(),
            poll_interval_secs: 30,
            cache_ttl_secs: 10,
            request_timeout_secs: 15,
            source_timeout_secs: 60,
            search_terms: to_strings(DEFAULT_SEARCH_TERMS),
            common_names: to_strings(DEFAULT_COMMON_NAMES),
            common_name_limit: 10,
            common_name_delay_ms: 100,
            known_addresses: to_strings(SEED_TOKEN_ADDRESSES),
            address_batch_size: 30,
        }
    }
}

impl DiscoverySection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

/// On-chain discovery section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OnChainSection {
    /// Disable to skip RPC discovery even when a URL is configured
    pub enabled: bool,
    pub creator_program: String,
    pub migration_program: String,
    pub signature_limit: usize,
    pub creator_signature_cap: usize,
    pub migration_signature_cap: usize,
    pub tx_batch_size: usize,
    pub asset_search_limit: usize,
}

impl Default for OnChainSection {
    fn default() -> Self {
        Self {
            enabled: true,
            creator_program: BAGS_CREATOR_PROGRAM.to_string(),
            migration_program: METEORA_DBC_PROGRAM.to_string(),
            signature_limit: 1000,
            creator_signature_cap: 200,
            migration_signature_cap: 300,
            tx_batch_size: 50,
            asset_search_limit: 1000,
        }
    }
}

/// Upper bound on retries; backoff doubles per attempt
const MAX_RETRIES: u32 = 10;

/// DexScreener API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DexScreenerSection {
    pub base_url: String,
    pub max_retries: u32,
}

impl Default for DexScreenerSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.dexscreener.com".to_string(),
            max_retries: 3,
        }
    }
}

/// Helius RPC section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HeliusSection {
    /// Full RPC URL including the API key; prefer the environment
    pub rpc_url: Option<String>,
}

impl HeliusSection {
    /// Get RPC URL with environment variable override
    /// Checks HELIUS_RPC_URL env var first, falls back to config value
    pub fn get_rpc_url(&self) -> Option<String> {
        env_or(HELIUS_RPC_URL_ENV, self.rpc_url.as_ref())
    }
}

/// Bags launchpad API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BagsSection {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for BagsSection {
    fn default() -> Self {
        Self {
            base_url: "https://public-api-v2.bags.fm/api/v1".to_string(),
            api_key: None,
        }
    }
}

impl BagsSection {
    /// Get API key with environment variable override
    /// Checks BAGS_API_KEY env var first, falls back to config value
    pub fn get_api_key(&self) -> Option<String> {
        env_or(BAGS_API_KEY_ENV, self.api_key.as_ref())
    }
}

/// Jupiter swap API section (proxied only)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JupiterSection {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for JupiterSection {
    fn default() -> Self {
        Self {
            base_url: "https://lite-api.jup.ag/swap/v1".to_string(),
            api_key: None,
        }
    }
}

impl JupiterSection {
    /// Get API key with environment variable override
    /// Checks JUPITER_API_KEY env var first, falls back to config value
    pub fn get_api_key(&self) -> Option<String> {
        env_or(JUPITER_API_KEY_ENV, self.api_key.as_ref())
    }
}

/// Logging section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load the file when it exists, otherwise fall back to defaults
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::warn!("Config file {} not found, using defaults", path.display());
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let suffix = self.discovery.suffix.trim();
        if suffix.is_empty() {
            return Err(ConfigError::ValidationError(
                "discovery.suffix must not be empty".to_string(),
            ));
        }

        if self.discovery.chain_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "discovery.chain_id must not be empty".to_string(),
            ));
        }

        if self.discovery.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "poll_interval_secs must be > 0, got {}",
                self.discovery.poll_interval_secs
            )));
        }

        if self.discovery.request_timeout_secs == 0 || self.discovery.source_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request and source timeouts must be > 0".to_string(),
            ));
        }

        if self.discovery.address_batch_size == 0 || self.discovery.address_batch_size > 30 {
            return Err(ConfigError::ValidationError(format!(
                "address_batch_size must be 1-30, got {}",
                self.discovery.address_batch_size
            )));
        }

        if self.onchain.tx_batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "onchain.tx_batch_size must be > 0".to_string(),
            ));
        }

        if self.onchain.creator_signature_cap > self.onchain.signature_limit
            || self.onchain.migration_signature_cap > self.onchain.signature_limit
        {
            return Err(ConfigError::ValidationError(format!(
                "signature caps must not exceed signature_limit ({})",
                self.onchain.signature_limit
            )));
        }

        if self.dexscreener.max_retries > MAX_RETRIES {
            return Err(ConfigError::ValidationError(format!(
                "dexscreener.max_retries must be at most {}",
                MAX_RETRIES
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}, got {}",
                valid_levels, self.logging.level
            )));
        }

        for (name, url) in [
            ("dexscreener.base_url", &self.dexscreener.base_url),
            ("bags.base_url", &self.bags.base_url),
            ("jupiter.base_url", &self.jupiter.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be an http(s) URL, got {}",
                    name, url
                )));
            }
        }

        Ok(())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn env_or(var: &str, fallback: Option<&String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| fallback.cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let config = load_config(path).expect("default config should load");
        assert_eq!(config.discovery.suffix, "bags");
        assert_eq!(config.discovery.chain_id, "solana");
        assert_eq!(config.onchain.creator_signature_cap, 200);
        assert_eq!(config.onchain.migration_signature_cap, 300);
        assert_eq!(config.discovery.address_batch_size, 30);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let file = write_config("[server]\nport = 8080\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.discovery.search_terms.len(), DEFAULT_SEARCH_TERMS.len());
        assert_eq!(config.discovery.common_name_limit, 10);
    }

    #[test]
    fn test_rejects_oversized_batches() {
        let file = write_config("[discovery]\naddress_batch_size = 31\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_retry_bounds() {
        let file = write_config("[dexscreener]\nmax_retries = 0\n");
        assert_eq!(load_config(file.path()).unwrap().dexscreener.max_retries, 0);

        let file = write_config("[dexscreener]\nmax_retries = 11\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_bad_log_level() {
        let file = write_config("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_empty_suffix() {
        let file = write_config("[discovery]\nsuffix = \"  \"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_parse_error() {
        let file = write_config("[server\nport = 1");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = load_config_or_default("/nonexistent/bags-index.toml").unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(load_config("/nonexistent/bags-index.toml").is_err());
    }

    #[test]
    fn test_static_path_expands_tilde() {
        let server = ServerSection {
            static_dir: "~/site".to_string(),
            ..Default::default()
        };
        assert!(!server.static_path().to_string_lossy().starts_with('~'));
        assert_eq!(server.bind_address(), "127.0.0.1:3000");
    }
}
