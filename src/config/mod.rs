//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    load_config, load_config_or_default, BagsSection, Config, ConfigError, DexScreenerSection,
    DiscoverySection, HeliusSection, JupiterSection, LoggingSection, OnChainSection,
    ServerSection,
};
