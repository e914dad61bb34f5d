//! Filesystem Tools MCP Server - Rust Implementation
//!
//! A Model Context Protocol (MCP) server exposing `create_directory` and
//! `move_file` to a tool-invocation host over stdio.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use fs_tools_mcp_server::config::Config;
use fs_tools_mcp_server::fs::FileSystemTools;
use fs_tools_mcp_server::mcp::server::McpServer;
use fs_tools_mcp_server::mcp::tools::ToolRegistry;

/// Filesystem Tools MCP Server
#[derive(Parser)]
#[command(name = "fs-tools-mcp-server")]
#[command(author, version, about = "Filesystem Tools MCP Server - directory creation and file moves over MCP")]
struct Cli {
    /// Default log level, overridden per target by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tool definitions as JSON and exit
    Tools,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries protocol traffic
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(cli.log_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command).await {
        error!("Failed to start MCP server: {:#}", e);
        return Err(e);
    }

    Ok(())
}

async fn run(command: Option<Commands>) -> anyhow::Result<()> {
    let config = Config::new().context("loading configuration")?;
    let registry = ToolRegistry::new(FileSystemTools::with_tracing(&config));

    match command {
        Some(Commands::Tools) => {
            let tools = serde_json::to_string_pretty(&registry.list_tools())?;
            println!("{}", tools);
        }
        None => {
            let mut server = McpServer::new(&config, registry);
            info!(home = %config.home_dir().display(), "MCP server initialized");

            info!("Starting MCP server...");
            server.run_stdio().await.context("serving MCP over stdio")?;
        }
    }

    Ok(())
}
