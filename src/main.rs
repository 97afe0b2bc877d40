// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Youth activity MCP server.
//!
//! Serves the youth activity tools over stdin/stdout. Requires a public-data
//! portal service key (`YOUTH_API_SERVICE_KEY` or `service_key` in the config
//! file).

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use youth_activity_mcp::config::{ApiSettings, Config};
use youth_activity_mcp::handler::YouthHandler;
use youth_activity_mcp::mcp::McpServer;
use youth_activity_mcp::youth::YouthApiClient;

#[derive(Parser, Debug)]
#[command(name = "youth-activity-mcp")]
#[command(about = "MCP server for the Korean youth activity information API")]
#[command(version = env!("YOUTH_MCP_VERSION"))]
struct Args {
    /// Path to a configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-call timeout for upstream requests in seconds (default: 10)
    #[arg(long)]
    timeout: Option<u64>,
}

/// Runs the youth activity MCP server.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the server fails.
fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("youth_activity_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(args.config)?;

    // Override timeout if provided on CLI
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }

    let settings = config.api_settings().inspect_err(|e| error!("{e}"))?;
    info!(
        "Using {} (timeout {}s)",
        settings.base_url,
        settings.timeout.as_secs()
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(run_server(settings));
    // A blocked stdin read cannot be cancelled; exit without joining it.
    runtime.shutdown_background();
    outcome
}

async fn run_server(settings: ApiSettings) -> Result<()> {
    let client = YouthApiClient::new(settings)?;
    let handler = YouthHandler::new(client, tokio::runtime::Handle::current());
    let mut mcp_server = McpServer::new(handler);

    // Run in a blocking task since MCP server uses synchronous I/O
    let mcp_task = tokio::task::spawn_blocking(move || mcp_server.run());

    tokio::select! {
        res = mcp_task => {
            res?
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            Ok(())
        }
    }
}
