//! Backend server for the LiveCode+ online editor
//!
//! Reads its configuration from the environment (and an optional `.env`
//! file), lets command-line flags override it, and serves the editor API
//! until Ctrl+C or SIGTERM.

use anyhow::Result;
use clap::Parser;
use livecode_core::{create_assistant, create_executor, ProxyConfig};
use livecode_server::{shutdown_signal, AppState, LiveCodeServer, ServerConfig};
use log::LevelFilter;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about = "LiveCode+ backend - code execution and AI assistant proxy")]
struct Cli {
    #[clap(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[clap(long, default_value = "0.0.0.0")]
    host: IpAddr,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(long, help = "Poll deadline for code execution in milliseconds (overrides EXECUTION_TIMEOUT_MS)")]
    execution_timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let mut config = ProxyConfig::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(timeout_ms) = cli.execution_timeout_ms {
        config.execution_timeout = Duration::from_millis(timeout_ms);
    }
    log::info!(
        "Configuration loaded (execution timeout {:?})",
        config.execution_timeout
    );

    let state = AppState::new(create_executor(&config)?, create_assistant(&config));
    let server_config = ServerConfig::default()
        .with_bind_addr(SocketAddr::new(cli.host, config.port))
        .with_logging(true);

    log::info!("Starting LiveCode+ backend (pid {})", std::process::id());
    let server = LiveCodeServer::with_config(state, server_config);

    if let Err(e) = server.serve_with_shutdown(shutdown_signal()).await {
        log::error!("Server failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}
