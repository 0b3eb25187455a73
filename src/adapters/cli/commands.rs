//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the Bags Index service.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::{DiscoveryService, ViewQuery};
use crate::config::{load_config_or_default, Config};
use crate::domain::fees::TokenDetails;
use crate::domain::format::{format_number, format_percentage, format_price, truncate_address};
use crate::domain::ranking::{SortDirection, SortField, View};
use crate::domain::token::Token;
use crate::server::{self, AppState, ProxyClient, ProxyConfig};

const DEFAULT_CONFIG: &str = "config/default.toml";

/// Bags Index - token discovery and ranking for the Bags launchpad
#[derive(Parser, Debug)]
#[command(
    name = "bags-index",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Token discovery, dedup and ranking for Bags launchpad tokens",
    long_about = "Bags Index discovers Bags tokens from several independent sources, \
                  merges and deduplicates them, and serves ranked views over HTTP."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the polling loop and the HTTP server
    Serve(ServeCmd),

    /// Run one discovery pass and print the ranked list
    Scan(ScanCmd),

    /// Show a token with its launchpad fee data
    Details(DetailsCmd),
}

impl Command {
    fn config_path(&self) -> &Path {
        match self {
            Command::Serve(cmd) => &cmd.config,
            Command::Scan(cmd) => &cmd.config,
            Command::Details(cmd) => &cmd.config,
        }
    }
}

/// Start the server
#[derive(Parser, Debug)]
pub struct ServeCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override the listen port
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,
}

/// One-shot discovery
#[derive(Parser, Debug)]
pub struct ScanCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// View: bonded, trending or new
    #[arg(long, value_name = "VIEW", default_value = "bonded")]
    pub view: View,

    /// Sort field overriding the view default
    #[arg(long, value_name = "FIELD")]
    pub sort: Option<SortField>,

    /// Sort direction: asc or desc
    #[arg(long, value_name = "DIR")]
    pub direction: Option<SortDirection>,

    /// Filter by name, symbol or address
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Maximum rows to print
    #[arg(short, long, value_name = "N", default_value = "25")]
    pub limit: usize,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Token details
#[derive(Parser, Debug)]
pub struct DetailsCmd {
    /// Token mint address
    #[arg(value_name = "ADDRESS")]
    pub address: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = load_config_or_default(app.command.config_path())
        .with_context(|| format!("Failed to load {}", app.command.config_path().display()))?;

    // Initialize logging based on flags, falling back to the config level
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Serve(cmd) => serve_command(cmd, config).await,
        Command::Scan(cmd) => scan_command(cmd, config).await,
        Command::Details(cmd) => details_command(cmd, config).await,
    }
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Handle serve command
async fn serve_command(cmd: ServeCmd, mut config: Config) -> Result<()> {
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    tracing::info!("Starting Bags Index...");
    tracing::info!("Config: {}", cmd.config.display());

    let discovery = Arc::new(
        DiscoveryService::from_config(&config).context("Failed to build discovery service")?,
    );
    let proxy = ProxyClient::with_config(ProxyConfig::from_config(&config))
        .context("Failed to create proxy client")?;
    let state = AppState::new(discovery.clone(), proxy);

    // Polling loop
    let poller = discovery.clone();
    let poll_handle = tokio::spawn(async move { poller.run().await });

    // Setup Ctrl+C handler
    let on_shutdown = discovery.clone();
    let shutdown = async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        on_shutdown.stop().await;
    };

    server::serve(
        &config.server.bind_address(),
        &config.server.static_path(),
        state,
        shutdown,
    )
    .await
    .context("Server error")?;

    discovery.stop().await;
    poll_handle.await.ok();
    tracing::info!("Bags Index stopped");
    Ok(())
}

/// Handle scan command
async fn scan_command(cmd: ScanCmd, config: Config) -> Result<()> {
    let service =
        DiscoveryService::from_config(&config).context("Failed to build discovery service")?;

    service.load().await.context("Discovery failed")?;
    let query = ViewQuery {
        view: cmd.view,
        sort: cmd.sort,
        direction: cmd.direction,
        search: cmd.search.clone(),
    };
    let tokens = service.ranked_view(&query).await?;
    let shown: Vec<Token> = tokens.iter().take(cmd.limit).cloned().collect();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    println!(
        "Bags Index - {} by {} {} ({} tokens)",
        query.view,
        query.sort_field(),
        query.sort_direction(),
        tokens.len()
    );
    println!();
    for line in render_table(&shown) {
        println!("{}", line);
    }

    let status = service.status().await;
    for outcome in status.outcomes.iter().filter(|o| !o.is_ok()) {
        println!("  ! source {} failed", outcome.source);
    }
    Ok(())
}

/// Handle details command
async fn details_command(cmd: DetailsCmd, config: Config) -> Result<()> {
    let service =
        DiscoveryService::from_config(&config).context("Failed to build discovery service")?;
    let details = service
        .token_details(&cmd.address)
        .await
        .with_context(|| format!("Failed to load details for {}", cmd.address))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        for line in render_details(&details) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Fixed-width table of ranked tokens
pub fn render_table(tokens: &[Token]) -> Vec<String> {
    let mut lines = vec![format!(
        "{:>4}  {:<10} {:<20} {:>14} {:>10} {:>10} {:>9} {:>10} {:>5}  {}",
        "#", "SYMBOL", "NAME", "PRICE", "MCAP", "VOL 24H", "24H", "LIQUIDITY", "AGE", "ADDRESS"
    )];
    for token in tokens {
        lines.push(format!(
            "{:>4}  {:<10} {:<20} {:>14} {:>10} {:>10} {:>9} {:>10} {:>5}  {}",
            token.rank,
            clip(&token.symbol, 10),
            clip(&token.name, 20),
            format_price(token.price),
            format_number(token.market_cap),
            format_number(token.volume_24h),
            format_percentage(token.price_change_24h),
            format_number(token.liquidity),
            token.age,
            truncate_address(&token.address, 4, 4),
        ));
    }
    lines
}

/// Text block for a token's details
pub fn render_details(details: &TokenDetails) -> Vec<String> {
    let token = &details.token;
    let mut lines = vec![
        format!("{} ({})", token.name, token.symbol),
        format!("  Address:      {}", token.address),
        format!("  Pair:         {} on {}", token.pair_address, token.dex),
        format!("  Price:        {}", format_price(token.price)),
        format!("  Market cap:   {}", format_number(token.market_cap)),
        format!("  Volume 24h:   {}", format_number(token.volume_24h)),
        format!("  Change 24h:   {}", format_percentage(token.price_change_24h)),
        format!("  Liquidity:    {}", format_number(token.liquidity)),
        format!("  Age:          {}", token.age),
        format!("  Creator:      {}", details.creator_name),
    ];

    match &details.lifetime_fees {
        Some(fees) => lines.push(format!("  Lifetime fees: {:.4} SOL", fees.sol)),
        None => lines.push("  Lifetime fees: unavailable".to_string()),
    }

    if !details.fee_recipients.is_empty() {
        lines.push("  Fee recipients:".to_string());
        for recipient in &details.fee_recipients {
            lines.push(format!(
                "    {:<20} {:>6.2}%  claimed {:.4} SOL{}",
                recipient.display_name,
                recipient.percentage,
                recipient.total_claimed_sol,
                if recipient.is_creator { "  (creator)" } else { "" }
            ));
        }
    }
    lines.push(format!("  {}", token.url));
    lines
}

fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let kept: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
