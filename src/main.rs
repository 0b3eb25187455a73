//! Bags Index - Bags launchpad token discovery service

use anyhow::Result;
use clap::Parser;

use bags_index::adapters::cli::{execute, CliApp};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    execute(app).await
}
