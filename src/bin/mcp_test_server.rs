// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! MCP test server with echo, calculate and `get_time` tools.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use youth_activity_mcp::handler::TestServerHandler;
use youth_activity_mcp::mcp::McpServer;

#[derive(Parser, Debug)]
#[command(name = "mcp-test-server")]
#[command(about = "MCP test server exposing echo, calculate and get_time")]
#[command(version = env!("YOUTH_MCP_VERSION"))]
struct Args {}

fn main() -> Result<()> {
    Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("youth_activity_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(run_server());
    // A blocked stdin read cannot be cancelled; exit without joining it.
    runtime.shutdown_background();
    outcome
}

async fn run_server() -> Result<()> {
    let mut mcp_server = McpServer::new(TestServerHandler::new());
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
